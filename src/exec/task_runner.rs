// src/exec/task_runner.rs

//! Runs a single scheduled build on the blocking pool.

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::compile::CompilerSet;
use crate::engine::{RuntimeEvent, ScheduledBuild};
use crate::exec::boundary::BuildReport;
use crate::logging::console_compiling;
use crate::types::BuildScope;

/// Run one build and emit exactly one `BuildFinished` for it.
///
/// Compilers are synchronous, so the work goes through `spawn_blocking`.
/// A panicking compiler still produces a (failed) report so the dispatcher
/// never waits on a build that will not finish.
pub async fn run_build(
    compilers: CompilerSet,
    build: ScheduledBuild,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let class = build.task.class;
    let what = match &build.task.scope {
        BuildScope::FullPattern => "all files".to_string(),
        BuildScope::SingleFile(path) => path.display().to_string(),
    };
    console_compiling(class, &what);

    let compiler = compilers.get(class);
    let scope = build.task.scope.clone();
    let report = match tokio::task::spawn_blocking(move || compiler.run(&scope)).await {
        Ok(report) => report,
        Err(err) => {
            error!(id = build.id, class = %class, error = %err, "compiler job aborted");
            let path = match &build.task.scope {
                BuildScope::SingleFile(path) => path.clone(),
                BuildScope::FullPattern => class.name().into(),
            };
            BuildReport::failed(class, path, format!("compiler job aborted: {err}"))
        }
    };

    debug!(
        id = build.id,
        class = %class,
        compiled = report.compiled,
        errors = report.errors.len(),
        "build finished"
    );

    if runtime_tx
        .send(RuntimeEvent::BuildFinished {
            id: build.id,
            report,
        })
        .await
        .is_err()
    {
        debug!(id = build.id, "runtime channel closed before completion was delivered");
    }
}
