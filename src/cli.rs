// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::AssetClass;

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build and live-reload a static front-end: templates, SCSS, scripts and images.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sitepipe.toml` in the current working directory, or
    /// built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print the resolved pipeline, build nothing.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl CliArgs {
    /// The selected command, `watch` when none was given.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Watch)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Optimize JPEGs and copy other images.
    Images,
    /// Copy scripts.
    Scripts,
    /// Compile SCSS to CSS.
    Styles,
    /// Render HTML templates.
    Templates,
    /// Copy third-party packages into the public tree.
    Vendor,
    /// Run templates, styles, scripts and images once.
    Build,
    /// Build everything, then watch sources and serve with live reload.
    Watch,
}

impl Command {
    /// Asset classes built before the command settles (or starts watching).
    pub fn classes(self) -> Vec<AssetClass> {
        match self {
            Command::Images => vec![AssetClass::Images],
            Command::Scripts => vec![AssetClass::Scripts],
            Command::Styles => vec![AssetClass::Styles],
            Command::Templates => vec![AssetClass::Templates],
            Command::Vendor => vec![AssetClass::Vendor],
            Command::Build | Command::Watch => AssetClass::WATCHED.to_vec(),
        }
    }

    pub fn is_long_running(self) -> bool {
        matches!(self, Command::Watch)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
