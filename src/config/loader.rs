// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; defaults and validation are
/// applied by [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and resolve it against the file's directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    ConfigFile::from_raw(raw_config, config_root_dir(path))
}

/// Resolve the configuration for a CLI invocation.
///
/// - An explicit `--config` path must exist.
/// - Otherwise `Sitepipe.toml` in the working directory is used when present.
/// - Otherwise the built-in defaults apply, rooted at the working directory.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        return load_and_validate(&default_path);
    }

    info!("no {} found; using built-in defaults", default_path.display());
    ConfigFile::try_from(RawConfigFile::default())
}

/// Default config location: `Sitepipe.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sitepipe.toml")
}

/// Directory that relative config paths are resolved against.
///
/// A bare filename like `Sitepipe.toml` has an empty parent; fall back to
/// the current working directory then.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
