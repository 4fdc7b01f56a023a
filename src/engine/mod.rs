// src/engine/mod.rs

//! Build dispatcher for sitepipe.
//!
//! This module ties together:
//! - the change classifier (which builds a filesystem change invalidates)
//! - bookkeeping of in-flight builds
//! - the main runtime event loop that reacts to:
//!   - startup / manual build requests
//!   - file-watch changes
//!   - build completions
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::exec::boundary::BuildReport;
use crate::types::{AssetClass, BuildTask, ChangeEvent};

/// Identifier assigned to each dispatched build.
pub type BuildId = u64;

/// Why a build was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Unconditional full build before watching starts.
    Startup,
    /// A single-class CLI command (`sitepipe styles`, ...).
    Manual,
    /// Produced by the classifier from a filesystem change.
    FileWatch,
}

/// A build task with its id, as handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledBuild {
    pub id: BuildId,
    pub task: BuildTask,
    pub reason: TriggerReason,
}

/// Whether a finished build recorded errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Ok,
    Errored(usize),
}

/// Sent to the reload notifier once per finished build, ok or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal {
    pub id: BuildId,
    pub class: AssetClass,
    pub outcome: BuildOutcome,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no build is in flight (used for the
    /// one-shot build commands).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the CLI, watcher and backend.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Build the given task regardless of filesystem state.
    BuildRequested {
        task: BuildTask,
        reason: TriggerReason,
    },
    /// The watcher saw a change under one of the watched roots.
    FileChanged(ChangeEvent),
    /// A compiler adapter finished (possibly with per-file errors).
    BuildFinished { id: BuildId, report: BuildReport },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::{NoReload, ReloadSink, Runtime};
