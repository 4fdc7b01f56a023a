#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sitepipe::config::{load_and_validate, ConfigFile};
use tempfile::TempDir;

/// Config used by [`SiteBuilder`]: default source layout, every output
/// under `public/` so nothing escapes the temp dir.
pub const SITE_CONFIG: &str = r#"
[server]
port = 0
serve_root = "public"
start_path = "pages/index.html"

[templates]
out = "public/pages"

[templates.context]
site_name = "Stisla"
version = "2.3.0"

[styles]
out = "public/assets/css"

[scripts]
out = "public/assets/js"

[images]
out = "public/assets/img"

[vendor]
out = "public/node_modules"
"#;

/// Builder for an on-disk project in a temp directory.
pub struct SiteBuilder {
    files: Vec<(String, Vec<u8>)>,
    config: String,
    create_roots: bool,
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            config: SITE_CONFIG.to_string(),
            create_roots: true,
        }
    }

    /// Add a source file at `rel` (relative to the project root).
    pub fn file(mut self, rel: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files.push((rel.to_string(), contents.as_ref().to_vec()));
        self
    }

    /// Replace the generated `Sitepipe.toml`.
    pub fn config(mut self, toml: &str) -> Self {
        self.config = toml.to_string();
        self
    }

    /// Do not pre-create empty source roots.
    pub fn without_roots(mut self) -> Self {
        self.create_roots = false;
        self
    }

    pub fn build(self) -> Site {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().to_path_buf();

        if self.create_roots {
            for rel in ["src/pages", "src/scss", "assets/js", "assets/img", "node_modules"] {
                fs::create_dir_all(root.join(rel)).expect("create source root");
            }
        }

        for (rel, contents) in &self.files {
            write_file(&root.join(rel), contents);
        }

        let config_path = root.join("Sitepipe.toml");
        fs::write(&config_path, &self.config).expect("write Sitepipe.toml");

        Site {
            _dir: dir,
            root,
            config_path,
        }
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A project on disk; deleted when dropped.
pub struct Site {
    _dir: TempDir,
    root: PathBuf,
    config_path: PathBuf,
}

impl Site {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> ConfigFile {
        load_and_validate(&self.config_path).expect("valid site config")
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
        write_file(&self.path(rel), contents.as_ref());
    }

    pub fn read_string(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_string_opt(&self, rel: &str) -> Option<String> {
        fs::read_to_string(self.path(rel)).ok()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }
}

fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}
