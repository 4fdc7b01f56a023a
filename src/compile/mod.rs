// src/compile/mod.rs

//! Compiler adapters.
//!
//! Each adapter turns the inputs of one asset class into files under its
//! output root and returns a [`BuildReport`]. The transformations themselves
//! are delegated to third-party crates:
//!
//! - [`template`]: Handlebars pages and layouts (`handlebars`)
//! - [`style`]: SCSS to flat CSS (`grass`)
//! - [`assets`]: byte-for-byte copy for scripts and vendor files
//! - [`images`]: JPEG re-encoding, verbatim copy otherwise (`image`)
//!
//! Adapters are synchronous; the executor runs them on Tokio's blocking pool.

pub mod assets;
pub mod images;
pub mod style;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::ConfigFile;
use crate::exec::boundary::{BuildReport, ErrorBoundary};
use crate::fs::FileSystem;
use crate::types::{AssetClass, BuildScope};
use crate::watch::patterns::{collect_matching_files, SourcePattern};

pub use assets::AssetCopier;
pub use images::ImageOptimizer;
pub use style::StyleCompiler;
pub use template::TemplateCompiler;

/// A single-purpose compiler for one asset class.
pub trait Compiler: Send + Sync {
    /// Process every input in `scope`. Never fails: per-file problems are
    /// recorded in the returned report.
    fn run(&self, scope: &BuildScope) -> BuildReport;
}

/// One adapter per asset class, shared by every build task.
#[derive(Clone)]
pub struct CompilerSet {
    templates: Arc<dyn Compiler>,
    styles: Arc<dyn Compiler>,
    scripts: Arc<dyn Compiler>,
    images: Arc<dyn Compiler>,
    vendor: Arc<dyn Compiler>,
}

impl std::fmt::Debug for CompilerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerSet").finish_non_exhaustive()
    }
}

impl CompilerSet {
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        Ok(Self {
            templates: Arc::new(TemplateCompiler::from_config(cfg, fs.clone())?),
            styles: Arc::new(StyleCompiler::from_config(cfg, fs.clone())?),
            scripts: Arc::new(AssetCopier::from_config(
                AssetClass::Scripts,
                cfg,
                fs.clone(),
            )?),
            images: Arc::new(ImageOptimizer::from_config(cfg, fs.clone())?),
            vendor: Arc::new(AssetCopier::from_config(AssetClass::Vendor, cfg, fs)?),
        })
    }

    pub fn get(&self, class: AssetClass) -> Arc<dyn Compiler> {
        match class {
            AssetClass::Templates => Arc::clone(&self.templates),
            AssetClass::Styles => Arc::clone(&self.styles),
            AssetClass::Scripts => Arc::clone(&self.scripts),
            AssetClass::Images => Arc::clone(&self.images),
            AssetClass::Vendor => Arc::clone(&self.vendor),
        }
    }
}

/// Every source under the pattern root. Unreadable directories are recorded
/// in `boundary`; the files that could be listed are still returned.
pub(crate) fn collect_sources(
    fs: &dyn FileSystem,
    pattern: &SourcePattern,
    boundary: &mut ErrorBoundary,
) -> Vec<PathBuf> {
    match collect_matching_files(fs, pattern) {
        Ok(listing) => {
            for (dir, err) in &listing.unreadable {
                boundary.record(dir, err);
            }
            listing.files
        }
        Err(err) => {
            boundary.record(pattern.root(), &err);
            Vec::new()
        }
    }
}

/// Resolve a scope into the list of inputs to process.
///
/// A single file that no longer exists (deleted page) yields nothing: builds
/// are non-cleaning, so its previous output is left in place.
pub(crate) fn scoped_inputs(
    fs: &dyn FileSystem,
    pattern: &SourcePattern,
    scope: &BuildScope,
    boundary: &mut ErrorBoundary,
) -> Vec<PathBuf> {
    match scope {
        BuildScope::FullPattern => collect_sources(fs, pattern, boundary),
        BuildScope::SingleFile(path) => {
            if fs.is_file(path) {
                vec![path.clone()]
            } else {
                debug!(path = ?path, "scoped source no longer exists; nothing to build");
                Vec::new()
            }
        }
    }
}

/// Output path for `input`, mirroring its position under the pattern root.
pub(crate) fn mirrored_output(
    pattern: &SourcePattern,
    out_root: &std::path::Path,
    input: &std::path::Path,
) -> Result<PathBuf> {
    let rel = pattern
        .relative(input)
        .ok_or_else(|| anyhow::anyhow!("{:?} is not under {:?}", input, pattern.root()))?;
    Ok(out_root.join(rel))
}
