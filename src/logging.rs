// src/logging.rs

//! Logging setup for `sitepipe` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SITEPIPE_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR. The short console lines below (`[SCSS] Finished`)
//! go to stdout so build progress stays readable with logging turned down.
//! Finished lines are green and `✖` lines red; `NO_COLOR` turns colors off.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::types::AssetClass;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("SITEPIPE_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

/// `[HTML] Compiling: src/pages/about.html`
pub fn console_compiling(class: AssetClass, what: &str) {
    println!("{}", format!("[{}] Compiling: {}", class.label(), what).green());
}

/// `[HTML] Finished` or `✖ [HTML] Finished with 2 error(s)`
pub fn console_finished(class: AssetClass, errors: usize) {
    println!("{}", finished_line(class, errors));
}

fn finished_line(class: AssetClass, errors: usize) -> String {
    if errors == 0 {
        format!("[{}] Finished", class.label()).green().to_string()
    } else {
        format!("\u{2716} [{}] Finished with {} error(s)", class.label(), errors)
            .red()
            .to_string()
    }
}

/// `✖ [SCSS] src/scss/main.scss: expected ";".`
pub fn console_file_error(class: AssetClass, path: &Path, message: &str) {
    let line = format!("\u{2716} [{}] {}: {}", class.label(), path.display(), message);
    eprintln!("{}", line.red());
}
