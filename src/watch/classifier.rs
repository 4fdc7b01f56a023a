// src/watch/classifier.rs

//! Maps a filesystem change to the builds it invalidates.
//!
//! Rules, first match wins:
//! 1. stylesheet → full style rebuild (imports are not tracked)
//! 2. template under the layout marker → full template rebuild
//! 3. any other template → that page only
//! 4. script → full scripts copy
//! 5. image → full image pass
//! 6. anything else → ignored

use anyhow::Result;
use tracing::trace;

use crate::config::ConfigFile;
use crate::types::{AssetClass, BuildTask, ChangeEvent};
use crate::watch::path_utils::has_segment;
use crate::watch::patterns::SourcePattern;

#[derive(Debug, Clone)]
pub struct Classifier {
    styles: SourcePattern,
    templates: SourcePattern,
    scripts: SourcePattern,
    images: SourcePattern,
    layout_marker: String,
}

impl Classifier {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Ok(Self {
            styles: SourcePattern::from_paths(AssetClass::Styles, cfg.paths(AssetClass::Styles))?,
            templates: SourcePattern::from_paths(
                AssetClass::Templates,
                cfg.paths(AssetClass::Templates),
            )?,
            scripts: SourcePattern::from_paths(
                AssetClass::Scripts,
                cfg.paths(AssetClass::Scripts),
            )?,
            images: SourcePattern::from_paths(AssetClass::Images, cfg.paths(AssetClass::Images))?,
            layout_marker: cfg.templates().layout_marker.clone(),
        })
    }

    /// Watched roots, in classification order.
    pub fn patterns(&self) -> [&SourcePattern; 4] {
        [&self.styles, &self.templates, &self.scripts, &self.images]
    }

    pub fn classify(&self, event: &ChangeEvent) -> Vec<BuildTask> {
        let path = &event.path;

        if self.styles.claims(path) {
            return vec![BuildTask::full(AssetClass::Styles)];
        }

        if let Some(rel) = self.templates.relative(path) {
            if self.templates.matches_relative(&rel) {
                if has_segment(&rel, &self.layout_marker) {
                    return vec![BuildTask::full(AssetClass::Templates)];
                }
                return vec![BuildTask::single(AssetClass::Templates, path.clone())];
            }
        }

        if self.scripts.claims(path) {
            return vec![BuildTask::full(AssetClass::Scripts)];
        }

        if self.images.claims(path) {
            return vec![BuildTask::full(AssetClass::Images)];
        }

        trace!(path = ?path, "change matches no source pattern; ignoring");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;
    use crate::types::ChangeKind;
    use std::path::PathBuf;

    fn classifier() -> Classifier {
        let cfg = ConfigFile::from_raw(RawConfigFile::default(), "/site").unwrap();
        Classifier::from_config(&cfg).unwrap()
    }

    #[test]
    fn partial_stylesheet_rebuilds_every_stylesheet() {
        let tasks = classifier().classify(&ChangeEvent::modified(
            "/site/src/scss/components/_button.scss",
        ));
        assert_eq!(tasks, vec![BuildTask::full(AssetClass::Styles)]);
    }

    #[test]
    fn layout_change_rebuilds_every_page() {
        let tasks =
            classifier().classify(&ChangeEvent::modified("/site/src/pages/layouts/base.html"));
        assert_eq!(tasks, vec![BuildTask::full(AssetClass::Templates)]);
    }

    #[test]
    fn leaf_page_change_rebuilds_only_that_page() {
        let tasks = classifier().classify(&ChangeEvent::modified("/site/src/pages/about.html"));
        assert_eq!(
            tasks,
            vec![BuildTask::single(
                AssetClass::Templates,
                PathBuf::from("/site/src/pages/about.html")
            )]
        );
    }

    #[test]
    fn scripts_and_images_rebuild_their_tree() {
        let c = classifier();
        assert_eq!(
            c.classify(&ChangeEvent::new("/site/assets/js/app/main.js", ChangeKind::Created)),
            vec![BuildTask::full(AssetClass::Scripts)]
        );
        assert_eq!(
            c.classify(&ChangeEvent::new("/site/assets/img/logo.png", ChangeKind::Deleted)),
            vec![BuildTask::full(AssetClass::Images)]
        );
    }

    #[test]
    fn unrelated_paths_are_ignored() {
        let c = classifier();
        assert!(c.classify(&ChangeEvent::modified("/site/README.md")).is_empty());
        assert!(c.classify(&ChangeEvent::modified("/site/src/pages/notes.txt")).is_empty());
        assert!(c.classify(&ChangeEvent::modified("/site/assets/js/data.json")).is_empty());
        assert!(c.classify(&ChangeEvent::modified("/elsewhere/a.scss")).is_empty());
    }

    #[test]
    fn marker_must_be_a_whole_segment() {
        let tasks =
            classifier().classify(&ChangeEvent::modified("/site/src/pages/mylayouts.html"));
        assert_eq!(tasks.len(), 1);
        assert!(matches!(
            tasks[0].scope,
            crate::types::BuildScope::SingleFile(_)
        ));
    }
}
