// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::BuildBackend;
use crate::logging::console_finished;

use super::core::CoreRuntime;
use super::{BuildOutcome, CompletionSignal, CoreCommand, RuntimeEvent, ScheduledBuild};

/// Receives one signal per finished build.
///
/// The dev server's notifier implements this; one-shot commands use
/// [`NoReload`].
pub trait ReloadSink: Send {
    fn notify(&self, signal: CompletionSignal);
}

/// Reload sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReload;

impl ReloadSink for NoReload {
    fn notify(&self, _signal: CompletionSignal) {}
}

/// Drives the dispatcher in response to `RuntimeEvent`s, delegating
/// compilation to a `BuildBackend` and browser refreshes to a `ReloadSink`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<B: BuildBackend, R: ReloadSink> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    reload: R,
}

impl<B: BuildBackend, R: ReloadSink> fmt::Debug for Runtime<B, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend, R: ReloadSink> Runtime<B, R> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        backend: B,
        reload: R,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            reload,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (dispatch, reload, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("sitepipe runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchBuilds(builds) => {
                self.dispatch(builds).await?;
            }
            CoreCommand::Reload(signal) => {
                let errors = match signal.outcome {
                    BuildOutcome::Ok => 0,
                    BuildOutcome::Errored(n) => n,
                };
                console_finished(signal.class, errors);
                self.reload.notify(signal);
            }
            CoreCommand::RequestExit => {
                info!("all builds finished");
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, builds: Vec<ScheduledBuild>) -> Result<()> {
        if builds.is_empty() {
            return Ok(());
        }

        let ids: Vec<_> = builds.iter().map(|b| b.id).collect();
        debug!(?ids, "dispatching builds");

        self.backend.dispatch(builds).await
    }
}
