// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Apply defaults, resolve paths and check invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    AssetPaths, ConfigFile, ImageConfig, RawConfigFile, RawImageSection, RawServerSection,
    RawSourceSection, RawTemplateSection, ServerConfig, TemplateConfig,
};
pub use validate::validate_config;
