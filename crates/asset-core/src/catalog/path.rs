//! Hierarchical catalog paths.

use crate::config::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

const SEP: char = CatalogConfig::PATH_SEPARATOR;

/// Path of a catalog in the catalog hierarchy, like `Characters/Humans`.
///
/// Always stored in cleaned-up form: `/`-separated, no leading, trailing or
/// repeated separators, each component trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogPath(String);

impl CatalogPath {
    /// Build a cleaned-up catalog path. Backslashes count as separators.
    pub fn new(path: &str) -> Self {
        let cleaned = path
            .split(['/', '\\'])
            .map(str::trim)
            .filter(|component| !component.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(cleaned)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEP).filter(|c| !c.is_empty())
    }

    /// Last component, empty for the empty path.
    pub fn name(&self) -> &str {
        self.0.rsplit(SEP).next().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<CatalogPath> {
        self.0
            .rfind(SEP)
            .map(|pos| CatalogPath(self.0[..pos].to_string()))
    }

    pub fn join(&self, child: &str) -> CatalogPath {
        if self.is_empty() {
            return CatalogPath::new(child);
        }
        CatalogPath::new(&format!("{}{}{}", self.0, SEP, child))
    }

    /// True when `self` equals `other` or lies below it.
    pub fn is_contained_in(&self, other: &CatalogPath) -> bool {
        if other.is_empty() {
            return true;
        }
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with(SEP))
    }

    /// Replace the `from` prefix of this path by `to`.
    ///
    /// Returns `None` when the path is not contained in `from`.
    pub fn rebase(&self, from: &CatalogPath, to: &CatalogPath) -> Option<CatalogPath> {
        if !self.is_contained_in(from) {
            return None;
        }
        let rest = &self.0[from.0.len()..];
        Some(CatalogPath::new(&format!("{}{}", to.0, rest)))
    }
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogPath {
    fn from(path: &str) -> Self {
        CatalogPath::new(path)
    }
}
