// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Startup problems (config, missing roots, bad globs) are fatal and surface
//! as a [`PipelineError`]. Per-file compile failures never reach this type;
//! they are collected in a `BuildReport` instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source root for {class} does not exist: {}", path.display())]
    MissingSourceRoot { class: String, path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
