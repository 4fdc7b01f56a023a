// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::config::{AssetPaths, ConfigFile};
use crate::fs::FileSystem;
use crate::types::AssetClass;
use crate::watch::path_utils::relative_str;

/// Compile a single glob with `/`-aware wildcards (`*` never crosses a
/// directory boundary, `**/` does).
pub fn build_glob(pattern: &str) -> std::result::Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Compiled (root directory, glob suffix) pair owned by one asset class.
///
/// Paths are matched relative to `root`, e.g. `components/_button.scss`
/// against `**/*.scss`.
#[derive(Clone)]
pub struct SourcePattern {
    class: AssetClass,
    root: PathBuf,
    pattern: String,
    matcher: GlobMatcher,
}

impl fmt::Debug for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePattern")
            .field("class", &self.class)
            .field("root", &self.root)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl SourcePattern {
    pub fn new(class: AssetClass, root: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let matcher = build_glob(pattern)
            .with_context(|| format!("invalid glob pattern for {class}: {pattern}"))?
            .compile_matcher();
        Ok(Self {
            class,
            root: root.into(),
            pattern: pattern.to_string(),
            matcher,
        })
    }

    pub fn from_paths(class: AssetClass, paths: &AssetPaths) -> Result<Self> {
        Self::new(class, &paths.src, &paths.pattern)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `path` relative to this pattern's root, if it lives there.
    pub fn relative(&self, path: &Path) -> Option<String> {
        relative_str(&self.root, path).filter(|rel| !rel.is_empty())
    }

    /// True if the relative path is selected by the glob suffix.
    pub fn matches_relative(&self, rel: &str) -> bool {
        self.matcher.is_match(rel)
    }

    /// True if `path` is under the root and selected by the glob.
    pub fn claims(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|rel| self.matches_relative(&rel))
    }
}

/// Build one pattern per watched asset class from the config.
pub fn build_source_patterns(cfg: &ConfigFile) -> Result<Vec<SourcePattern>> {
    AssetClass::WATCHED
        .iter()
        .map(|class| SourcePattern::from_paths(*class, cfg.paths(*class)))
        .collect()
}

/// Outcome of walking one source root.
#[derive(Debug, Default)]
pub struct SourceListing {
    /// Matching files, sorted so builds visit them in a stable order.
    pub files: Vec<PathBuf>,
    /// Directories below the root that could not be listed.
    pub unreadable: Vec<(PathBuf, anyhow::Error)>,
}

/// Collect all files under the pattern root that match the glob.
///
/// Symlinked directories are not descended into, so link cycles (common in
/// `node_modules`) terminate and nothing is emitted twice. A subdirectory
/// that cannot be listed is reported in the listing and the walk goes on;
/// only an unreadable root is an error.
pub fn collect_matching_files(fs: &dyn FileSystem, pattern: &SourcePattern) -> Result<SourceListing> {
    let root = pattern.root();
    let mut listing = SourceListing::default();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if dir != root => {
                listing.unreadable.push((dir, err));
                continue;
            }
            Err(err) => return Err(err),
        };

        for path in entries {
            if fs.is_dir(&path) {
                if fs.is_symlink(&path) {
                    debug!(path = ?path, "not following symlinked directory");
                } else {
                    stack.push(path);
                }
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if pattern.matches_relative(&rel_str) {
                        listing.files.push(path);
                    }
                }
            }
        }
    }

    listing.files.sort();
    listing.unreadable.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn double_star_matches_top_level_and_nested() {
        let p = SourcePattern::new(AssetClass::Styles, "/s", "**/*.scss").unwrap();
        assert!(p.matches_relative("main.scss"));
        assert!(p.matches_relative("components/_button.scss"));
        assert!(!p.matches_relative("components/readme.md"));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let p = SourcePattern::new(AssetClass::Scripts, "/j", "*.js").unwrap();
        assert!(p.matches_relative("app.js"));
        assert!(!p.matches_relative("lib/app.js"));
    }

    #[test]
    fn claims_requires_root_and_glob() {
        let p = SourcePattern::new(AssetClass::Templates, "/site/src/pages", "**/*.html").unwrap();
        assert!(p.claims(Path::new("/site/src/pages/about.html")));
        assert!(!p.claims(Path::new("/site/src/pages/notes.txt")));
        assert!(!p.claims(Path::new("/site/other/about.html")));
        assert!(!p.claims(Path::new("/site/src/pages")));
    }

    #[test]
    fn collects_matching_files_in_sorted_order() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/b.scss", "b{}");
        fs.add_file("/s/nested/a.scss", "a{}");
        fs.add_file("/s/nested/notes.txt", "x");

        let p = SourcePattern::new(AssetClass::Styles, "/s", "**/*.scss").unwrap();
        let listing = collect_matching_files(&fs, &p).unwrap();
        assert!(listing.unreadable.is_empty());
        assert_eq!(
            listing.files,
            vec![PathBuf::from("/s/b.scss"), PathBuf::from("/s/nested/a.scss")]
        );
    }

    #[test]
    fn symlinked_directories_are_not_descended() {
        let fs = MockFileSystem::new();
        fs.add_file("/j/app.js", "app");
        fs.add_file("/j/lib/util.js", "util");
        fs.add_symlink("/j/lib/loop", "/j");

        let p = SourcePattern::new(AssetClass::Scripts, "/j", "**/*.js").unwrap();
        let listing = collect_matching_files(&fs, &p).unwrap();
        assert_eq!(
            listing.files,
            vec![PathBuf::from("/j/app.js"), PathBuf::from("/j/lib/util.js")]
        );
    }

    #[test]
    fn symlinked_files_are_collected() {
        let fs = MockFileSystem::new();
        fs.add_file("/shared/theme.js", "theme");
        fs.add_file("/j/app.js", "app");
        fs.add_symlink("/j/theme.js", "/shared/theme.js");

        let p = SourcePattern::new(AssetClass::Scripts, "/j", "**/*.js").unwrap();
        let listing = collect_matching_files(&fs, &p).unwrap();
        assert_eq!(
            listing.files,
            vec![PathBuf::from("/j/app.js"), PathBuf::from("/j/theme.js")]
        );
    }

    #[test]
    fn unreadable_subdirectory_is_reported_and_walk_continues() {
        let fs = MockFileSystem::new();
        fs.add_file("/v/a.js", "a");
        fs.add_unreadable_dir("/v/locked");
        fs.add_file("/v/z/b.js", "b");

        let p = SourcePattern::new(AssetClass::Vendor, "/v", "**/*").unwrap();
        let listing = collect_matching_files(&fs, &p).unwrap();
        assert_eq!(
            listing.files,
            vec![PathBuf::from("/v/a.js"), PathBuf::from("/v/z/b.js")]
        );
        assert_eq!(listing.unreadable.len(), 1);
        assert_eq!(listing.unreadable[0].0, PathBuf::from("/v/locked"));
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_unreadable_dir("/v");

        let p = SourcePattern::new(AssetClass::Vendor, "/v", "**/*").unwrap();
        assert!(collect_matching_files(&fs, &p).is_err());
    }
}
