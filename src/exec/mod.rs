// src/exec/mod.rs

//! Build execution layer.
//!
//! - [`boundary`] isolates per-file failures inside one compiler run.
//! - [`executor_loop`] receives dispatched builds and spawns one Tokio task
//!   per build.
//! - [`task_runner`] runs a single compiler on the blocking pool and reports
//!   back via `RuntimeEvent::BuildFinished`.
//! - [`backend`] provides the `BuildBackend` trait and the production
//!   `RealBuildBackend`; tests replace it with a fake.

pub mod backend;
pub mod boundary;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{BuildBackend, RealBuildBackend};
pub use boundary::{BuildReport, ErrorBoundary, FileError};
