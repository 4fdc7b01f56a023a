// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::AssetClass;

/// Top-level configuration as read from a TOML file.
///
/// Every section and every key is optional; missing values fall back to the
/// default layout of a Stisla-style front-end checkout:
///
/// ```toml
/// [server]
/// port = 8080
/// serve_root = "."
/// start_path = "pages/index.html"
///
/// [templates]
/// src = "src/pages"
/// pattern = "**/*.html"
/// out = "pages"
/// layout_marker = "layouts"
///
/// [templates.context]
/// site_name = "Stisla"
///
/// [styles]
/// src = "src/scss"
/// out = "../../public/assets/css"
///
/// [images]
/// jpeg_quality = 80
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: RawServerSection,

    #[serde(default)]
    pub templates: RawTemplateSection,

    #[serde(default)]
    pub styles: RawSourceSection,

    #[serde(default)]
    pub scripts: RawSourceSection,

    #[serde(default)]
    pub images: RawImageSection,

    #[serde(default)]
    pub vendor: RawSourceSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerSection {
    pub port: Option<u16>,
    /// Directory served over HTTP.
    pub serve_root: Option<String>,
    /// Entry document, relative to `serve_root`.
    pub start_path: Option<String>,
}

/// Shared shape of `[styles]`, `[scripts]` and `[vendor]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceSection {
    pub src: Option<String>,
    pub pattern: Option<String>,
    pub out: Option<String>,
}

/// `[templates]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTemplateSection {
    #[serde(flatten)]
    pub paths: RawSourceSection,

    /// Path segment that marks a shared layout template.
    pub layout_marker: Option<String>,

    /// Variables made available to every page.
    pub context: Option<toml::Table>,
}

/// `[images]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImageSection {
    #[serde(flatten)]
    pub paths: RawSourceSection,

    /// JPEG re-encoding quality (1..=100).
    pub jpeg_quality: Option<u8>,
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_START_PATH: &str = "pages/index.html";
pub const DEFAULT_LAYOUT_MARKER: &str = "layouts";
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Default `(src, pattern, out)` for an asset class.
pub fn default_paths(class: AssetClass) -> (&'static str, &'static str, &'static str) {
    match class {
        AssetClass::Templates => ("src/pages", "**/*.html", "pages"),
        AssetClass::Styles => ("src/scss", "**/*.scss", "../../public/assets/css"),
        AssetClass::Scripts => ("assets/js", "**/*.js", "../../public/assets/js"),
        AssetClass::Images => ("assets/img", "**/*.*", "../../public/assets/img"),
        AssetClass::Vendor => ("node_modules", "**/*", "../../public/node_modules"),
    }
}

/// Resolved source/output locations of one asset class.
///
/// `src` and `out` are absolute, lexically normalised paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub src: PathBuf,
    pub pattern: String,
    pub out: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub serve_root: PathBuf,
    pub start_path: String,
}

#[derive(Debug, Clone)]
pub struct TemplateConfig {
    pub paths: AssetPaths,
    pub layout_marker: String,
    pub context: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub paths: AssetPaths,
    pub jpeg_quality: u8,
}

/// Validated, fully resolved configuration.
///
/// Built once at startup (see [`crate::config::load_and_validate`]) and passed
/// by reference to the classifier, compilers and dev server.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub(crate) base_dir: PathBuf,
    pub(crate) server: ServerConfig,
    pub(crate) templates: TemplateConfig,
    pub(crate) styles: AssetPaths,
    pub(crate) scripts: AssetPaths,
    pub(crate) images: ImageConfig,
    pub(crate) vendor: AssetPaths,
}

impl ConfigFile {
    /// Directory relative paths were resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn templates(&self) -> &TemplateConfig {
        &self.templates
    }

    pub fn images(&self) -> &ImageConfig {
        &self.images
    }

    /// Source and output locations for the given class.
    pub fn paths(&self, class: AssetClass) -> &AssetPaths {
        match class {
            AssetClass::Templates => &self.templates.paths,
            AssetClass::Styles => &self.styles,
            AssetClass::Scripts => &self.scripts,
            AssetClass::Images => &self.images.paths,
            AssetClass::Vendor => &self.vendor,
        }
    }
}
