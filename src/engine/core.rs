// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state (builds in flight)
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing `ScheduledBuild`s to the build backend
//! - notifying browsers and handling Ctrl+C / shutdown
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! compilers.

use crate::engine::event_handlers::{
    handle_build_finished, handle_build_request, handle_file_change, CoreStep, InFlight,
};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::watch::classifier::Classifier;

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    classifier: Classifier,
    in_flight: InFlight,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(classifier: Classifier, options: RuntimeOptions) -> Self {
        Self {
            classifier,
            in_flight: InFlight::default(),
            options,
        }
    }

    /// True when no dispatched build is awaiting completion.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BuildRequested { task, reason } => {
                handle_build_request(&mut self.in_flight, task, reason)
            }
            RuntimeEvent::FileChanged(change) => {
                handle_file_change(&self.classifier, &mut self.in_flight, change)
            }
            RuntimeEvent::BuildFinished { id, report } => {
                handle_build_finished(&mut self.in_flight, &self.options, id, report)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, RawConfigFile};
    use crate::engine::{BuildOutcome, CoreCommand, TriggerReason};
    use crate::exec::boundary::BuildReport;
    use crate::types::{AssetClass, BuildScope, BuildTask, ChangeEvent};

    fn core(exit_when_idle: bool) -> CoreRuntime {
        let cfg = ConfigFile::from_raw(RawConfigFile::default(), "/p/site").unwrap();
        let classifier = Classifier::from_config(&cfg).unwrap();
        CoreRuntime::new(classifier, RuntimeOptions { exit_when_idle })
    }

    fn dispatched(step: &CoreStep) -> Vec<(u64, BuildTask)> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchBuilds(builds) => Some(builds.clone()),
                _ => None,
            })
            .flatten()
            .map(|b| (b.id, b.task))
            .collect()
    }

    #[test]
    fn file_change_dispatches_single_file_template_build() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::FileChanged(ChangeEvent::modified(
            "/p/site/src/pages/about.html",
        )));

        let builds = dispatched(&step);
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].1.class, AssetClass::Templates);
        assert_eq!(
            builds[0].1.scope,
            BuildScope::SingleFile("/p/site/src/pages/about.html".into())
        );
        assert!(step.keep_running);
        assert_eq!(core.in_flight(), 1);
    }

    #[test]
    fn unroutable_change_produces_nothing() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::FileChanged(ChangeEvent::modified(
            "/p/site/README.md",
        )));
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn completion_reloads_even_when_errored() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::BuildRequested {
            task: BuildTask::full(AssetClass::Styles),
            reason: TriggerReason::Startup,
        });
        let (id, _) = dispatched(&step)[0].clone();

        let report = BuildReport::failed(AssetClass::Styles, "/p/site/src/scss/a.scss", "boom");
        let step = core.step(RuntimeEvent::BuildFinished { id, report });

        assert!(matches!(
            step.commands.as_slice(),
            [CoreCommand::Reload(sig)] if sig.outcome == BuildOutcome::Errored(1) && sig.id == id
        ));
        assert!(step.keep_running);
        assert!(core.is_idle());
    }

    #[test]
    fn exits_once_idle_in_build_once_mode() {
        let mut core = core(true);
        let mut ids = Vec::new();
        for class in AssetClass::WATCHED {
            let step = core.step(RuntimeEvent::BuildRequested {
                task: BuildTask::full(class),
                reason: TriggerReason::Startup,
            });
            ids.extend(dispatched(&step).into_iter().map(|(id, t)| (id, t.class)));
        }

        let (last, rest) = ids.split_last().unwrap();
        for (id, class) in rest {
            let step = core.step(RuntimeEvent::BuildFinished {
                id: *id,
                report: BuildReport::new(*class),
            });
            assert!(step.keep_running);
        }

        let step = core.step(RuntimeEvent::BuildFinished {
            id: last.0,
            report: BuildReport::new(last.1),
        });
        assert!(!step.keep_running);
        assert!(matches!(step.commands.last(), Some(CoreCommand::RequestExit)));
    }

    #[test]
    fn unknown_completion_is_ignored() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::BuildFinished {
            id: 42,
            report: BuildReport::new(AssetClass::Images),
        });
        assert!(step.commands.is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut core = core(false);
        let a = core.step(RuntimeEvent::BuildRequested {
            task: BuildTask::full(AssetClass::Scripts),
            reason: TriggerReason::Manual,
        });
        let b = core.step(RuntimeEvent::BuildRequested {
            task: BuildTask::full(AssetClass::Scripts),
            reason: TriggerReason::Manual,
        });
        assert!(dispatched(&a)[0].0 < dispatched(&b)[0].0);
        assert_eq!(core.in_flight(), 2);
    }

    #[test]
    fn shutdown_stops_loop() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }
}
