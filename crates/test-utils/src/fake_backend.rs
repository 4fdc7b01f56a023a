use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sitepipe::engine::{CompletionSignal, ReloadSink, RuntimeEvent, ScheduledBuild};
use sitepipe::errors::Result;
use sitepipe::exec::{BuildBackend, BuildReport};
use sitepipe::types::{AssetClass, BuildTask};
use tokio::sync::mpsc;

/// A fake backend that:
/// - records which builds were dispatched
/// - immediately reports `BuildFinished` for each, failing the classes
///   listed in `failing` with one error.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    dispatched: Arc<Mutex<Vec<BuildTask>>>,
    failing: Vec<AssetClass>,
}

impl FakeBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        dispatched: Arc<Mutex<Vec<BuildTask>>>,
    ) -> Self {
        Self {
            runtime_tx,
            dispatched,
            failing: Vec::new(),
        }
    }

    pub fn failing(mut self, class: AssetClass) -> Self {
        self.failing.push(class);
        self
    }
}

impl BuildBackend for FakeBackend {
    fn dispatch(
        &mut self,
        builds: Vec<ScheduledBuild>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);
        let failing = self.failing.clone();

        Box::pin(async move {
            for build in builds {
                dispatched.lock().unwrap().push(build.task.clone());

                let class = build.task.class;
                let report = if failing.contains(&class) {
                    BuildReport::failed(class, "fake/input", "fake failure")
                } else {
                    BuildReport::new(class)
                };

                tx.send(RuntimeEvent::BuildFinished {
                    id: build.id,
                    report,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}

/// Reload sink that remembers every signal it received.
#[derive(Debug, Clone, Default)]
pub struct RecordingReload {
    signals: Arc<Mutex<Vec<CompletionSignal>>>,
}

impl RecordingReload {
    pub fn signals(&self) -> Vec<CompletionSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl ReloadSink for RecordingReload {
    fn notify(&self, signal: CompletionSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}
