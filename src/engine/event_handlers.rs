// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::engine::{
    BuildId, BuildOutcome, CompletionSignal, RuntimeOptions, ScheduledBuild, TriggerReason,
};
use crate::exec::boundary::BuildReport;
use crate::types::{BuildTask, ChangeEvent};
use crate::watch::classifier::Classifier;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Hand these builds to the backend.
    DispatchBuilds(Vec<ScheduledBuild>),
    /// A build finished; browsers should refresh.
    Reload(CompletionSignal),
    /// Request that the process exits (one-shot commands, once idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Mutable bookkeeping shared by the handlers.
#[derive(Debug, Default)]
pub struct InFlight {
    next_id: BuildId,
    builds: BTreeMap<BuildId, ScheduledBuild>,
}

impl InFlight {
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    fn schedule(&mut self, task: BuildTask, reason: TriggerReason) -> ScheduledBuild {
        self.next_id += 1;
        let build = ScheduledBuild {
            id: self.next_id,
            task,
            reason,
        };
        self.builds.insert(build.id, build.clone());
        build
    }

    fn complete(&mut self, id: BuildId) -> Option<ScheduledBuild> {
        self.builds.remove(&id)
    }
}

/// Handle an explicit build request (startup or CLI).
pub fn handle_build_request(
    in_flight: &mut InFlight,
    task: BuildTask,
    reason: TriggerReason,
) -> CoreStep {
    let build = in_flight.schedule(task, reason);
    debug!(id = build.id, class = %build.task.class, ?reason, "build requested");
    CoreStep::running(vec![CoreCommand::DispatchBuilds(vec![build])])
}

/// Handle a filesystem change: classify it and dispatch whatever it
/// invalidates. Builds already in flight are not awaited; overlapping
/// builds of the same class are allowed.
pub fn handle_file_change(
    classifier: &Classifier,
    in_flight: &mut InFlight,
    event: ChangeEvent,
) -> CoreStep {
    let tasks = classifier.classify(&event);
    if tasks.is_empty() {
        return CoreStep::running(Vec::new());
    }

    let builds: Vec<ScheduledBuild> = tasks
        .into_iter()
        .map(|task| in_flight.schedule(task, TriggerReason::FileWatch))
        .collect();

    debug!(
        path = ?event.path,
        kind = ?event.kind,
        in_flight = in_flight.len(),
        "change classified into {} build(s)",
        builds.len()
    );

    CoreStep::running(vec![CoreCommand::DispatchBuilds(builds)])
}

/// Handle a build completion. The reload fires whether or not the build
/// recorded errors, so the browser shows the best-effort output.
pub fn handle_build_finished(
    in_flight: &mut InFlight,
    options: &RuntimeOptions,
    id: BuildId,
    report: BuildReport,
) -> CoreStep {
    let mut commands = Vec::new();

    match in_flight.complete(id) {
        Some(_build) => {
            let outcome = if report.is_ok() {
                BuildOutcome::Ok
            } else {
                BuildOutcome::Errored(report.errors.len())
            };
            commands.push(CoreCommand::Reload(CompletionSignal {
                id,
                class: report.class,
                outcome,
            }));
        }
        None => {
            warn!(id, class = %report.class, "completion for unknown build id; ignoring");
        }
    }

    let mut keep_running = true;
    if options.exit_when_idle && in_flight.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
