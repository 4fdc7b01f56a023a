// src/server/mod.rs

//! Static dev server with live reload.
//!
//! - [`notifier`] turns build completions into broadcast notifications.
//! - [`dev_server`] serves the output tree over HTTP and streams those
//!   notifications to browsers via Server-Sent Events.

pub mod dev_server;
pub mod notifier;

pub use dev_server::{inject_reload_script, DevServer, RELOAD_ENDPOINT};
pub use notifier::{ReloadNotifier, ServerNotification};
