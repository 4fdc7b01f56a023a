// tests/runtime_fake_backend.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use sitepipe::config::{ConfigFile, RawConfigFile};
use sitepipe::engine::{
    BuildOutcome, CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
};
use sitepipe::types::{AssetClass, BuildScope, BuildTask, ChangeEvent, ChangeKind};
use sitepipe::watch::Classifier;
use sitepipe_test_utils::{init_tracing, with_timeout, FakeBackend, RecordingReload};

type TestResult = Result<(), Box<dyn Error>>;

fn core(exit_when_idle: bool) -> CoreRuntime {
    let cfg = ConfigFile::from_raw(RawConfigFile::default(), "/project/site").unwrap();
    let classifier = Classifier::from_config(&cfg).unwrap();
    CoreRuntime::new(classifier, RuntimeOptions { exit_when_idle })
}

async fn request_startup(tx: &mpsc::Sender<RuntimeEvent>) -> TestResult {
    for class in AssetClass::WATCHED {
        tx.send(RuntimeEvent::BuildRequested {
            task: BuildTask::full(class),
            reason: TriggerReason::Startup,
        })
        .await?;
    }
    Ok(())
}

#[tokio::test]
async fn startup_builds_each_class_once_and_exits_when_idle() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let reload = RecordingReload::default();

    let backend = FakeBackend::new(tx.clone(), Arc::clone(&dispatched));
    let runtime = Runtime::new(core(true), rx, backend, reload.clone());

    request_startup(&tx).await?;
    with_timeout(runtime.run()).await?;

    let tasks = dispatched.lock().unwrap().clone();
    let expected: Vec<BuildTask> = AssetClass::WATCHED.iter().map(|c| BuildTask::full(*c)).collect();
    assert_eq!(tasks, expected);

    let signals = reload.signals();
    assert_eq!(signals.len(), 4, "one reload per completed build");
    assert!(signals.iter().all(|s| s.outcome == BuildOutcome::Ok));
    Ok(())
}

#[tokio::test]
async fn errored_build_still_triggers_reload() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let reload = RecordingReload::default();

    let backend = FakeBackend::new(tx.clone(), Arc::clone(&dispatched)).failing(AssetClass::Styles);
    let runtime = Runtime::new(core(true), rx, backend, reload.clone());

    request_startup(&tx).await?;
    with_timeout(runtime.run()).await?;

    let styles: Vec<_> = reload
        .signals()
        .into_iter()
        .filter(|s| s.class == AssetClass::Styles)
        .collect();
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].outcome, BuildOutcome::Errored(1));
    assert_eq!(reload.signals().len(), 4);
    Ok(())
}

#[tokio::test]
async fn file_changes_are_routed_and_unknown_paths_ignored() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let reload = RecordingReload::default();

    let backend = FakeBackend::new(tx.clone(), Arc::clone(&dispatched));
    let runtime = Runtime::new(core(false), rx, backend, reload.clone());
    let handle = tokio::spawn(runtime.run());

    let events = [
        ChangeEvent::modified("/project/site/src/scss/components/_button.scss"),
        ChangeEvent::modified("/project/site/src/pages/layouts/base.html"),
        ChangeEvent::new("/project/site/src/pages/about.html", ChangeKind::Created),
        ChangeEvent::modified("/project/site/notes.txt"),
        ChangeEvent::modified("/project/site/assets/js/app.js"),
    ];
    for event in events {
        tx.send(RuntimeEvent::FileChanged(event)).await?;
    }

    // Completions are queued behind the change events; wait for all of them.
    with_timeout(async {
        while reload.signals().len() < 4 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(handle).await??;

    let tasks = dispatched.lock().unwrap().clone();
    assert_eq!(
        tasks,
        vec![
            BuildTask::full(AssetClass::Styles),
            BuildTask::full(AssetClass::Templates),
            BuildTask {
                class: AssetClass::Templates,
                scope: BuildScope::SingleFile("/project/site/src/pages/about.html".into()),
            },
            BuildTask::full(AssetClass::Scripts),
        ]
    );
    assert_eq!(reload.signals().len(), 4);
    Ok(())
}

#[tokio::test]
async fn runtime_stops_when_all_senders_are_gone() -> TestResult {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(8);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(tx.clone(), dispatched);
    let runtime = Runtime::new(core(false), rx, backend, RecordingReload::default());
    let handle = tokio::spawn(runtime.run());

    // The backend keeps a sender alive, so shut down explicitly.
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    drop(tx);
    with_timeout(handle).await??;
    Ok(())
}
