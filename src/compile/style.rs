// src/compile/style.rs

//! SCSS to CSS.
//!
//! Output is flat: `components/_button.scss` becomes `<out>/button.css`.
//! Two stylesheets with the same stem overwrite each other (last one wins).
//! Compiled CSS is run through `lightningcss` to add vendor prefixes for
//! [`prefix_targets`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::compile::{scoped_inputs, Compiler};
use crate::config::ConfigFile;
use crate::exec::boundary::{BuildReport, ErrorBoundary};
use crate::fs::FileSystem;
use crate::types::{AssetClass, BuildScope};
use crate::watch::patterns::SourcePattern;

#[derive(Debug)]
pub struct StyleCompiler {
    fs: Arc<dyn FileSystem>,
    pattern: SourcePattern,
    out: PathBuf,
}

impl StyleCompiler {
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let paths = cfg.paths(AssetClass::Styles);
        Ok(Self {
            fs,
            pattern: SourcePattern::from_paths(AssetClass::Styles, paths)?,
            out: paths.out.clone(),
        })
    }

    fn compile_one(&self, path: &Path) -> Result<()> {
        let root = self.pattern.root().to_path_buf();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.clone());

        let options = grass::Options::default().load_path(&root).load_path(&dir);
        let css = grass::from_path(path, &options).map_err(|e| anyhow!("{e}"))?;
        let css = add_vendor_prefixes(&css)?;

        let target = self.out.join(css_file_name(path)?);
        self.fs.write(&target, css.as_bytes())
    }
}

impl Compiler for StyleCompiler {
    fn run(&self, scope: &BuildScope) -> BuildReport {
        let mut boundary = ErrorBoundary::new(AssetClass::Styles);
        for path in scoped_inputs(self.fs.as_ref(), &self.pattern, scope, &mut boundary) {
            boundary.attempt(&path, || self.compile_one(&path));
        }
        boundary.finish()
    }
}

const fn version(major: u32, minor: u32) -> u32 {
    (major << 16) | (minor << 8)
}

/// Browsers prefixes are generated for, close to autoprefixer's defaults.
pub fn prefix_targets() -> Targets {
    Targets::from(Browsers {
        android: Some(version(120, 0)),
        chrome: Some(version(109, 0)),
        edge: Some(version(109, 0)),
        firefox: Some(version(115, 0)),
        ios_saf: Some(version(15, 4)),
        opera: Some(version(95, 0)),
        safari: Some(version(15, 4)),
        samsung: Some(version(20, 0)),
        ..Browsers::default()
    })
}

/// Add the vendor-prefixed forms `prefix_targets` still needs.
pub fn add_vendor_prefixes(css: &str) -> Result<String> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| anyhow!("prefixing: {e}"))?;
    sheet
        .minify(MinifyOptions {
            targets: prefix_targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("prefixing: {e}"))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: false,
            targets: prefix_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("prefixing: {e}"))?;
    Ok(printed.code)
}

/// `components/_button.scss` -> `button.css`
pub fn css_file_name(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("stylesheet has no usable file name: {:?}", path))?;
    let stem = stem.strip_prefix('_').unwrap_or(stem);
    if stem.is_empty() {
        return Err(anyhow!("stylesheet has no usable file name: {:?}", path));
    }
    Ok(format!("{stem}.css"))
}
