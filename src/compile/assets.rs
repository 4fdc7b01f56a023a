// src/compile/assets.rs

//! Copy-through adapter for scripts and vendor files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::compile::{mirrored_output, scoped_inputs, Compiler};
use crate::config::ConfigFile;
use crate::exec::boundary::{BuildReport, ErrorBoundary};
use crate::fs::FileSystem;
use crate::types::{AssetClass, BuildScope};
use crate::watch::patterns::SourcePattern;

#[derive(Debug)]
pub struct AssetCopier {
    class: AssetClass,
    fs: Arc<dyn FileSystem>,
    pattern: SourcePattern,
    out: PathBuf,
}

impl AssetCopier {
    pub fn from_config(class: AssetClass, cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let paths = cfg.paths(class);
        Ok(Self {
            class,
            fs,
            pattern: SourcePattern::from_paths(class, paths)?,
            out: paths.out.clone(),
        })
    }

    fn copy_one(&self, path: &Path) -> Result<()> {
        let bytes = self.fs.read(path)?;
        let target = mirrored_output(&self.pattern, &self.out, path)?;
        self.fs.write(&target, &bytes)
    }
}

impl Compiler for AssetCopier {
    fn run(&self, scope: &BuildScope) -> BuildReport {
        let mut boundary = ErrorBoundary::new(self.class);
        for path in scoped_inputs(self.fs.as_ref(), &self.pattern, scope, &mut boundary) {
            boundary.attempt(&path, || self.copy_one(&path));
        }
        boundary.finish()
    }
}
