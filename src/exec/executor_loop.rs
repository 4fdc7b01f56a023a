// src/exec/executor_loop.rs

//! Main executor loop that starts compiler runs.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::compile::CompilerSet;
use crate::engine::{RuntimeEvent, ScheduledBuild};
use crate::exec::task_runner::run_build;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledBuild>` is what `RealBuildBackend`
/// forwards dispatched builds to. Every build runs in its own Tokio task:
/// builds of the same class may overlap, and nothing is cancelled.
pub fn spawn_executor(
    compilers: CompilerSet,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledBuild> {
    let (tx, mut rx) = mpsc::channel::<ScheduledBuild>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        while let Some(build) = rx.recv().await {
            debug!(id = build.id, class = %build.task.class, "starting build");
            tokio::spawn(run_build(compilers.clone(), build, runtime_tx.clone()));
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
