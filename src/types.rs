use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Category of source file with its own compiler and output root.
///
/// The first four are watched; `Vendor` is a copy-only class that is only
/// built on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Templates,
    Styles,
    Scripts,
    Images,
    Vendor,
}

impl AssetClass {
    /// Classes that take part in a full build and in the watch loop.
    pub const WATCHED: [AssetClass; 4] = [
        AssetClass::Templates,
        AssetClass::Styles,
        AssetClass::Scripts,
        AssetClass::Images,
    ];

    pub const ALL: [AssetClass; 5] = [
        AssetClass::Templates,
        AssetClass::Styles,
        AssetClass::Scripts,
        AssetClass::Images,
        AssetClass::Vendor,
    ];

    /// Short console label, e.g. `[SCSS] Finished`.
    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Templates => "HTML",
            AssetClass::Styles => "SCSS",
            AssetClass::Scripts => "JS",
            AssetClass::Images => "IMG",
            AssetClass::Vendor => "VENDOR",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetClass::Templates => "templates",
            AssetClass::Styles => "styles",
            AssetClass::Scripts => "scripts",
            AssetClass::Images => "images",
            AssetClass::Vendor => "vendor",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "templates" | "html" => Ok(AssetClass::Templates),
            "styles" | "scss" | "css" => Ok(AssetClass::Styles),
            "scripts" | "js" => Ok(AssetClass::Scripts),
            "images" | "img" => Ok(AssetClass::Images),
            "vendor" => Ok(AssetClass::Vendor),
            other => Err(format!(
                "unknown asset class: {other} (expected templates, styles, scripts, images or vendor)"
            )),
        }
    }
}

/// Kind of filesystem change reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Created,
    Deleted,
}

/// A single filesystem change, consumed once by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Modified)
    }
}

/// Which inputs of an asset class a build covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildScope {
    /// Exactly one source file.
    SingleFile(PathBuf),
    /// Every file matching the class's source pattern.
    FullPattern,
}

/// A unit of work for one compiler adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    pub class: AssetClass,
    pub scope: BuildScope,
}

impl BuildTask {
    pub fn full(class: AssetClass) -> Self {
        Self {
            class,
            scope: BuildScope::FullPattern,
        }
    }

    pub fn single(class: AssetClass, path: impl Into<PathBuf>) -> Self {
        Self {
            class,
            scope: BuildScope::SingleFile(path.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_aliases() {
        assert_eq!("SCSS".parse::<AssetClass>(), Ok(AssetClass::Styles));
        assert_eq!("img".parse::<AssetClass>(), Ok(AssetClass::Images));
        assert!("fonts".parse::<AssetClass>().is_err());
    }

    #[test]
    fn vendor_is_not_watched() {
        assert!(!AssetClass::WATCHED.contains(&AssetClass::Vendor));
    }
}
