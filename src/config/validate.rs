// src/config/validate.rs

use std::path::{Path, PathBuf};

use crate::config::model::{
    default_paths, AssetPaths, ConfigFile, ImageConfig, RawConfigFile, RawSourceSection,
    ServerConfig, TemplateConfig, DEFAULT_JPEG_QUALITY, DEFAULT_LAYOUT_MARKER, DEFAULT_PORT,
    DEFAULT_START_PATH,
};
use crate::errors::{PipelineError, Result};
use crate::types::AssetClass;
use crate::watch::path_utils::normalize_lexically;
use crate::watch::patterns::build_glob;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipelineError;

    /// Resolve relative paths against the current working directory.
    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let cwd = std::env::current_dir()?;
        ConfigFile::from_raw(raw, cwd)
    }
}

impl ConfigFile {
    /// Apply defaults, resolve every path against `base_dir` and validate.
    pub fn from_raw(raw: RawConfigFile, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = normalize_lexically(&std::path::absolute(base_dir.into())?);

        let templates = TemplateConfig {
            paths: resolve_paths(&base_dir, AssetClass::Templates, &raw.templates.paths),
            layout_marker: raw
                .templates
                .layout_marker
                .clone()
                .unwrap_or_else(|| DEFAULT_LAYOUT_MARKER.to_string()),
            context: template_context(raw.templates.context.as_ref())?,
        };

        let images = ImageConfig {
            paths: resolve_paths(&base_dir, AssetClass::Images, &raw.images.paths),
            jpeg_quality: raw.images.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY),
        };

        let server = ServerConfig {
            port: raw.server.port.unwrap_or(DEFAULT_PORT),
            serve_root: normalize_lexically(
                &base_dir.join(raw.server.serve_root.as_deref().unwrap_or(".")),
            ),
            start_path: raw
                .server
                .start_path
                .clone()
                .unwrap_or_else(|| DEFAULT_START_PATH.to_string()),
        };

        let cfg = ConfigFile {
            styles: resolve_paths(&base_dir, AssetClass::Styles, &raw.styles),
            scripts: resolve_paths(&base_dir, AssetClass::Scripts, &raw.scripts),
            vendor: resolve_paths(&base_dir, AssetClass::Vendor, &raw.vendor),
            base_dir,
            server,
            templates,
            images,
        };

        validate_config(&cfg)?;
        Ok(cfg)
    }

    /// Fail fast when a source root needed by `classes` is missing.
    pub fn ensure_sources_exist(&self, classes: &[AssetClass]) -> Result<()> {
        for class in classes {
            let src = &self.paths(*class).src;
            if !src.is_dir() {
                return Err(PipelineError::MissingSourceRoot {
                    class: class.to_string(),
                    path: src.clone(),
                });
            }
        }
        Ok(())
    }
}

fn resolve_paths(base: &Path, class: AssetClass, raw: &RawSourceSection) -> AssetPaths {
    let (src, pattern, out) = default_paths(class);
    AssetPaths {
        src: normalize_lexically(&base.join(raw.src.as_deref().unwrap_or(src))),
        pattern: raw.pattern.clone().unwrap_or_else(|| pattern.to_string()),
        out: normalize_lexically(&base.join(raw.out.as_deref().unwrap_or(out))),
    }
}

/// Defaults overlaid with `[templates.context]`, key by key.
fn template_context(table: Option<&toml::Table>) -> Result<serde_json::Value> {
    let mut context = serde_json::json!({
        "version": "2.3.0",
        "site_name": "Stisla",
    });
    let Some(table) = table else {
        return Ok(context);
    };

    let overrides = serde_json::to_value(table).map_err(|e| {
        PipelineError::ConfigError(format!("[templates.context] is not representable: {e}"))
    })?;
    if let (Some(defaults), serde_json::Value::Object(overrides)) =
        (context.as_object_mut(), overrides)
    {
        defaults.extend(overrides);
    }
    Ok(context)
}

/// Check the invariants of a resolved configuration.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_patterns(cfg)?;
    validate_templates(cfg)?;
    validate_images(cfg)?;
    validate_source_roots_disjoint(cfg)?;
    validate_outputs_outside_sources(cfg)?;
    Ok(())
}

fn validate_patterns(cfg: &ConfigFile) -> Result<()> {
    for class in AssetClass::WATCHED.iter().chain([AssetClass::Vendor].iter()) {
        let pattern = &cfg.paths(*class).pattern;
        build_glob(pattern).map_err(|e| {
            PipelineError::ConfigError(format!("[{class}].pattern '{pattern}' is invalid: {e}"))
        })?;
    }
    Ok(())
}

fn validate_templates(cfg: &ConfigFile) -> Result<()> {
    let marker = &cfg.templates.layout_marker;
    if marker.trim().is_empty() {
        return Err(PipelineError::ConfigError(
            "[templates].layout_marker must not be empty".to_string(),
        ));
    }
    if marker.contains('/') || marker.contains('\\') {
        return Err(PipelineError::ConfigError(format!(
            "[templates].layout_marker must be a single path segment (got '{marker}')"
        )));
    }
    if !cfg.templates.context.is_object() {
        return Err(PipelineError::ConfigError(
            "[templates.context] must be a table".to_string(),
        ));
    }
    Ok(())
}

fn validate_images(cfg: &ConfigFile) -> Result<()> {
    let q = cfg.images.jpeg_quality;
    if !(1..=100).contains(&q) {
        return Err(PipelineError::ConfigError(format!(
            "[images].jpeg_quality must be within 1..=100 (got {q})"
        )));
    }
    Ok(())
}

/// Watched source roots must not contain one another, otherwise a single
/// file would be claimed by two asset classes.
fn validate_source_roots_disjoint(cfg: &ConfigFile) -> Result<()> {
    let classes = AssetClass::WATCHED;
    for (i, a) in classes.iter().enumerate() {
        for b in classes.iter().skip(i + 1) {
            let pa = &cfg.paths(*a).src;
            let pb = &cfg.paths(*b).src;
            if pa.starts_with(pb) || pb.starts_with(pa) {
                return Err(PipelineError::ConfigError(format!(
                    "source roots of {a} ({}) and {b} ({}) overlap",
                    pa.display(),
                    pb.display()
                )));
            }
        }
    }
    Ok(())
}

/// An output root inside a watched source root would make every build
/// re-trigger itself.
fn validate_outputs_outside_sources(cfg: &ConfigFile) -> Result<()> {
    for out_class in AssetClass::WATCHED.iter().chain([AssetClass::Vendor].iter()) {
        let out = &cfg.paths(*out_class).out;
        for src_class in AssetClass::WATCHED {
            let src = &cfg.paths(src_class).src;
            if out.starts_with(src) {
                return Err(PipelineError::ConfigError(format!(
                    "output root of {out_class} ({}) is inside the {src_class} source root ({})",
                    out.display(),
                    src.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_from(toml_src: &str) -> RawConfigFile {
        toml::from_str(toml_src).expect("valid toml")
    }

    #[test]
    fn defaults_follow_project_layout() {
        let cfg = ConfigFile::from_raw(RawConfigFile::default(), "/project/site").unwrap();

        assert_eq!(
            cfg.paths(AssetClass::Styles).src,
            PathBuf::from("/project/site/src/scss")
        );
        assert_eq!(
            cfg.paths(AssetClass::Styles).out,
            PathBuf::from("/public/assets/css")
        );
        assert_eq!(cfg.paths(AssetClass::Templates).out, PathBuf::from("/project/site/pages"));
        assert_eq!(cfg.templates().layout_marker, "layouts");
        assert_eq!(cfg.templates().context["site_name"], "Stisla");
        assert_eq!(cfg.images().jpeg_quality, 80);
        assert_eq!(cfg.server().port, 8080);
        assert_eq!(cfg.server().start_path, "pages/index.html");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let raw = raw_from(
            r#"
[styles]
out = "dist/css"

[templates.context]
site_name = "Demo"
"#,
        );
        let cfg = ConfigFile::from_raw(raw, "/p").unwrap();
        assert_eq!(cfg.paths(AssetClass::Styles).src, PathBuf::from("/p/src/scss"));
        assert_eq!(cfg.paths(AssetClass::Styles).out, PathBuf::from("/p/dist/css"));
        assert_eq!(cfg.paths(AssetClass::Styles).pattern, "**/*.scss");
        assert_eq!(cfg.templates().context["site_name"], "Demo");
    }

    #[test]
    fn template_context_merges_over_defaults() {
        let raw = raw_from(
            r#"
[templates.context]
site_name = "Demo"
year = 2024
"#,
        );
        let cfg = ConfigFile::from_raw(raw, "/p").unwrap();
        let context = &cfg.templates().context;
        assert_eq!(context["site_name"], "Demo");
        assert_eq!(context["version"], "2.3.0");
        assert_eq!(context["year"], 2024);
    }

    #[test]
    fn overlapping_source_roots_are_rejected() {
        let raw = raw_from(
            r#"
[scripts]
src = "assets"

[images]
src = "assets/img"
"#,
        );
        let err = ConfigFile::from_raw(raw, "/p").unwrap_err();
        match err {
            PipelineError::ConfigError(msg) => assert!(msg.contains("overlap")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn output_inside_source_is_rejected() {
        let raw = raw_from(
            r#"
[templates]
out = "src/pages/dist"
"#,
        );
        let err = ConfigFile::from_raw(raw, "/p").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(ref m) if m.contains("inside")));
    }

    #[test]
    fn bad_marker_and_quality_are_rejected() {
        let raw = raw_from("[templates]\nlayout_marker = \"a/b\"\n");
        assert!(ConfigFile::from_raw(raw, "/p").is_err());

        let raw = raw_from("[images]\njpeg_quality = 0\n");
        assert!(ConfigFile::from_raw(raw, "/p").is_err());
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let raw = raw_from("[scripts]\npattern = \"**/*.{js\"\n");
        let err = ConfigFile::from_raw(raw, "/p").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(ref m) if m.contains("pattern")));
    }
}
