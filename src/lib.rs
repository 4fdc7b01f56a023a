// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod server;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::compile::CompilerSet;
use crate::config::{load_or_default, ConfigFile};
use crate::engine::{
    CoreRuntime, NoReload, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
};
use crate::exec::RealBuildBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::{DevServer, ReloadNotifier};
use crate::types::{AssetClass, BuildTask};
use crate::watch::{build_source_patterns, Classifier};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - compilers and the build backend
/// - the dispatcher runtime
/// - (watch only) file watcher and dev server
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let command = args.command();
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;

    if args.dry_run {
        print_dry_run(&cfg, command);
        return Ok(());
    }

    cfg.ensure_sources_exist(&command.classes())?;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let compilers = CompilerSet::from_config(&cfg, fs)?;
    let backend = RealBuildBackend::new(compilers, rt_tx.clone());
    let classifier = Classifier::from_config(&cfg)?;

    // Startup builds are queued before the watcher exists, so they are
    // always dispatched first.
    let reason = match command {
        Command::Build | Command::Watch => TriggerReason::Startup,
        _ => TriggerReason::Manual,
    };
    for class in command.classes() {
        rt_tx
            .send(RuntimeEvent::BuildRequested {
                task: BuildTask::full(class),
                reason,
            })
            .await?;
    }

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: !command.is_long_running(),
    };
    let core = CoreRuntime::new(classifier, options);

    if !command.is_long_running() {
        drop(rt_tx);
        return Ok(Runtime::new(core, rt_rx, backend, NoReload).run().await?);
    }

    let roots = build_source_patterns(&cfg)?
        .iter()
        .map(|p| p.root().to_path_buf())
        .collect();
    let _watcher_handle = crate::watch::spawn_watcher(roots, rt_tx.clone())?;

    let notifier = ReloadNotifier::default();
    let server = DevServer::new(cfg.server(), notifier.clone());
    let listener = server.bind().await?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server.serve(listener, async move {
        let _ = stop_rx.await;
    }));

    let result = Runtime::new(core, rt_rx, backend, notifier).run().await;

    let _ = stop_tx.send(());
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => debug!(error = %err, "dev server stopped with error"),
        Err(err) => debug!(error = %err, "dev server task aborted"),
    }

    Ok(result?)
}

/// Print the resolved pipeline without building anything.
fn print_dry_run(cfg: &ConfigFile, command: Command) {
    println!("sitepipe dry-run ({command:?})");
    println!("  base_dir: {}", cfg.base_dir().display());
    println!();

    for class in AssetClass::ALL {
        let paths = cfg.paths(class);
        let marker = if command.classes().contains(&class) { "*" } else { " " };
        println!("{marker} [{}]", class.label());
        println!("      src:     {}", paths.src.display());
        println!("      pattern: {}", paths.pattern);
        println!("      out:     {}", paths.out.display());
    }
    println!();

    println!("templates.layout_marker = {}", cfg.templates().layout_marker);
    println!("images.jpeg_quality = {}", cfg.images().jpeg_quality);

    let server = cfg.server();
    println!(
        "server: http://127.0.0.1:{}/{} serving {}",
        server.port,
        server.start_path,
        server.serve_root.display()
    );

    info!("dry-run complete (no build)");
}
