// src/compile/template.rs

//! Handlebars page compiler.
//!
//! Every template under the source root is registered under its relative
//! path without extension, so pages can pull in layouts with
//! `{{#> layouts/base}}…{{/layouts/base}}` or `{{> layouts/header}}`.
//! Templates inside the layout marker directory are never written out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use handlebars::{handlebars_helper, Handlebars};
use regex::RegexBuilder;
use serde_json::Value;

use crate::compile::{collect_sources, mirrored_output, scoped_inputs, Compiler};
use crate::config::ConfigFile;
use crate::exec::boundary::{BuildReport, ErrorBoundary};
use crate::fs::FileSystem;
use crate::types::{AssetClass, BuildScope};
use crate::watch::path_utils::has_segment;
use crate::watch::patterns::SourcePattern;

/// `text` when `pattern` matches `page`, else the empty string. `^` and `$`
/// match at line boundaries; an invalid pattern never matches.
fn active_text(text: &str, pattern: &str, page: &str) -> String {
    match RegexBuilder::new(pattern).multi_line(true).build() {
        Ok(re) if re.is_match(page) => text.to_string(),
        _ => String::new(),
    }
}

// `{{is_active "active" "^index" page}}` renders "active" on matching pages.
handlebars_helper!(is_active: |text: str, pattern: str, page: str| {
    active_text(text, pattern, page)
});

#[derive(Debug)]
pub struct TemplateCompiler {
    fs: Arc<dyn FileSystem>,
    pattern: SourcePattern,
    out: PathBuf,
    layout_marker: String,
    context: Value,
}

impl TemplateCompiler {
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let paths = cfg.paths(AssetClass::Templates);
        Ok(Self {
            fs,
            pattern: SourcePattern::from_paths(AssetClass::Templates, paths)?,
            out: paths.out.clone(),
            layout_marker: cfg.templates().layout_marker.clone(),
            context: cfg.templates().context.clone(),
        })
    }

    fn is_layout(&self, rel: &str) -> bool {
        has_segment(rel, &self.layout_marker)
    }

    /// Register every template so pages can reference any of them.
    ///
    /// Returns the registry plus the templates that failed to parse, keyed by
    /// path. A fresh registry per call keeps a broken template from an
    /// earlier build out of later ones.
    fn build_registry(
        &self,
        sources: &[PathBuf],
        boundary: &mut ErrorBoundary,
    ) -> (Handlebars<'static>, BTreeMap<PathBuf, String>) {
        let mut registry = Handlebars::new();
        registry.register_helper("is_active", Box::new(is_active));

        let mut broken = BTreeMap::new();
        for path in sources {
            let Some(rel) = self.pattern.relative(path) else {
                continue;
            };
            let result = self
                .fs
                .read_to_string(path)
                .and_then(|source| {
                    registry
                        .register_template_string(&template_name(&rel), source)
                        .map_err(|e| anyhow!("{e}"))
                });

            if let Err(err) = result {
                if self.is_layout(&rel) {
                    // Layouts are not rendered on their own; report them here.
                    boundary.record(path, &err);
                } else {
                    broken.insert(path.clone(), format!("{err:#}"));
                }
            }
        }

        (registry, broken)
    }

    fn render_page(
        &self,
        registry: &Handlebars<'static>,
        broken: &BTreeMap<PathBuf, String>,
        path: &Path,
    ) -> Result<()> {
        if let Some(message) = broken.get(path) {
            return Err(anyhow!("{message}"));
        }

        let rel = self
            .pattern
            .relative(path)
            .ok_or_else(|| anyhow!("{:?} is not under the template root", path))?;

        let mut data = self.context.clone();
        if let Value::Object(map) = &mut data {
            map.insert("page".to_string(), Value::String(rel.clone()));
        }

        let html = registry
            .render(&template_name(&rel), &data)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("rendering {rel}"))?;

        let target = mirrored_output(&self.pattern, &self.out, path)?;
        self.fs.write(&target, html.as_bytes())
    }
}

impl Compiler for TemplateCompiler {
    fn run(&self, scope: &BuildScope) -> BuildReport {
        let mut boundary = ErrorBoundary::new(AssetClass::Templates);
        let sources = collect_sources(self.fs.as_ref(), &self.pattern, &mut boundary);
        let (registry, broken) = self.build_registry(&sources, &mut boundary);

        let in_scope = match scope {
            BuildScope::FullPattern => sources,
            BuildScope::SingleFile(_) => {
                scoped_inputs(self.fs.as_ref(), &self.pattern, scope, &mut boundary)
            }
        };
        let pages: Vec<PathBuf> = in_scope
            .into_iter()
            .filter(|p| {
                self.pattern
                    .relative(p)
                    .is_some_and(|rel| !self.is_layout(&rel))
            })
            .collect();

        for page in pages {
            boundary.attempt(&page, || self.render_page(&registry, &broken, &page));
        }

        boundary.finish()
    }
}

/// `layouts/base.html` -> `layouts/base`
fn template_name(rel: &str) -> String {
    match rel.rfind('.') {
        Some(dot) if dot > rel.rfind('/').map_or(0, |s| s + 1) => rel[..dot].to_string(),
        _ => rel.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;
    use crate::fs::mock::MockFileSystem;

    fn compiler(fs: &MockFileSystem) -> TemplateCompiler {
        let cfg = ConfigFile::from_raw(RawConfigFile::default(), "/site").unwrap();
        TemplateCompiler::from_config(&cfg, Arc::new(fs.clone())).unwrap()
    }

    #[test]
    fn names_strip_only_the_extension() {
        assert_eq!(template_name("layouts/base.html"), "layouts/base");
        assert_eq!(template_name("v1.2/page"), "v1.2/page");
        assert_eq!(template_name(".hidden"), ".hidden");
    }

    #[test]
    fn renders_page_with_layout_partial_and_context() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/site/src/pages/layouts/header.html",
            "<title>{{site_name}} {{version}}</title>",
        );
        fs.add_file(
            "/site/src/pages/index.html",
            "{{> layouts/header}}<a class=\"{{is_active \"active\" \"^index\" page}}\">home</a>",
        );

        let report = compiler(&fs).run(&BuildScope::FullPattern);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert_eq!(report.compiled, 1);

        let html = fs
            .read_to_string(Path::new("/site/pages/index.html"))
            .unwrap();
        assert_eq!(
            html,
            "<title>Stisla 2.3.0</title><a class=\"active\">home</a>"
        );
        assert!(!fs.is_file(Path::new("/site/pages/layouts/header.html")));
    }

    #[test]
    fn is_active_anchors_match_at_line_boundaries() {
        assert_eq!(active_text("on", "^b$", "a\nb\nc"), "on");
        assert_eq!(active_text("on", "^index", "docs/index.html"), "");
        assert_eq!(active_text("on", "(", "index.html"), "");
    }

    #[test]
    fn broken_page_is_reported_once_and_siblings_still_render() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/src/pages/good.html", "<p>{{site_name}}</p>");
        fs.add_file("/site/src/pages/bad.html", "<p>{{#if}}</p>");

        let report = compiler(&fs).run(&BuildScope::FullPattern);
        assert_eq!(report.compiled, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, PathBuf::from("/site/src/pages/bad.html"));
        assert!(fs.is_file(Path::new("/site/pages/good.html")));
        assert!(!fs.is_file(Path::new("/site/pages/bad.html")));
    }

    #[test]
    fn single_file_scope_writes_only_that_page() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/src/pages/about.html", "about");
        fs.add_file("/site/src/pages/index.html", "index");

        let report = compiler(&fs).run(&BuildScope::SingleFile(PathBuf::from(
            "/site/src/pages/about.html",
        )));
        assert!(report.is_ok());
        assert_eq!(report.compiled, 1);
        assert!(fs.is_file(Path::new("/site/pages/about.html")));
        assert!(!fs.is_file(Path::new("/site/pages/index.html")));
    }

    #[test]
    fn deleted_single_file_is_a_no_op() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/src/pages/index.html", "index");

        let report = compiler(&fs).run(&BuildScope::SingleFile(PathBuf::from(
            "/site/src/pages/gone.html",
        )));
        assert!(report.is_ok());
        assert_eq!(report.compiled, 0);
    }
}
