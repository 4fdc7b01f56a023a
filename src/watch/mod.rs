// src/watch/mod.rs

//! File watching and change classification.
//!
//! This module is responsible for:
//! - Compiling the per-class `(root, glob)` source patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`) over the
//!   watched source roots.
//! - Classifying each change into the builds it invalidates.
//!
//! It does **not** run builds; the engine dispatches whatever the
//! classifier returns.

pub mod classifier;
pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use classifier::Classifier;
pub use patterns::{build_source_patterns, collect_matching_files, SourceListing, SourcePattern};
pub use watcher::{spawn_watcher, WatcherHandle};
