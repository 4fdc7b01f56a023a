// src/compile/images.rs

//! Image pass: JPEGs are re-encoded at the configured quality, everything
//! else (PNG, SVG, GIF, ...) is copied unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::compile::{mirrored_output, scoped_inputs, Compiler};
use crate::config::ConfigFile;
use crate::exec::boundary::{BuildReport, ErrorBoundary};
use crate::fs::FileSystem;
use crate::types::{AssetClass, BuildScope};
use crate::watch::patterns::SourcePattern;

#[derive(Debug)]
pub struct ImageOptimizer {
    fs: Arc<dyn FileSystem>,
    pattern: SourcePattern,
    out: PathBuf,
    jpeg_quality: u8,
}

impl ImageOptimizer {
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let images = cfg.images();
        Ok(Self {
            fs,
            pattern: SourcePattern::from_paths(AssetClass::Images, &images.paths)?,
            out: images.paths.out.clone(),
            jpeg_quality: images.jpeg_quality,
        })
    }

    fn process_one(&self, path: &Path) -> Result<()> {
        let bytes = self.fs.read(path)?;
        let output = if is_jpeg(path) {
            recompress_jpeg(&bytes, self.jpeg_quality)
                .with_context(|| format!("recompressing {:?}", path))?
        } else {
            bytes
        };
        let target = mirrored_output(&self.pattern, &self.out, path)?;
        self.fs.write(&target, &output)
    }
}

impl Compiler for ImageOptimizer {
    fn run(&self, scope: &BuildScope) -> BuildReport {
        let mut boundary = ErrorBoundary::new(AssetClass::Images);
        for path in scoped_inputs(self.fs.as_ref(), &self.pattern, scope, &mut boundary) {
            boundary.attempt(&path, || self.process_one(&path));
        }
        boundary.finish()
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// Decode a JPEG and encode it again at `quality`.
pub fn recompress_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}
