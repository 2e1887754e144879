//! Per-asset metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptive data attached to an asset.
///
/// `catalog_simple_name` duplicates the simple name of the catalog the asset
/// is assigned to. It lets the catalog assignment be recovered when the
/// catalog definition file is lost or corrupted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetaData {
    /// Catalog the asset belongs to, nil when unassigned.
    #[serde(default)]
    pub catalog_id: Uuid,
    #[serde(default)]
    pub catalog_simple_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AssetMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata assigned to the given catalog.
    pub fn in_catalog(catalog_id: Uuid, simple_name: impl Into<String>) -> Self {
        Self {
            catalog_id,
            catalog_simple_name: simple_name.into(),
            ..Self::default()
        }
    }

    pub fn has_catalog(&self) -> bool {
        !self.catalog_id.is_nil()
    }

    /// Add a tag unless it's already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_catalog() {
        let meta = AssetMetaData::new();
        assert!(!meta.has_catalog());
        assert!(meta.catalog_simple_name.is_empty());
    }

    #[test]
    fn test_tags_are_unique() {
        let mut meta = AssetMetaData::new();
        assert!(meta.add_tag("wood"));
        assert!(!meta.add_tag("wood"));
        assert!(meta.remove_tag("wood"));
        assert!(!meta.remove_tag("wood"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let meta: AssetMetaData = serde_json::from_str(r#"{"author":"kim"}"#).unwrap();
        assert_eq!(meta.author.as_deref(), Some("kim"));
        assert!(meta.catalog_id.is_nil());
        assert!(meta.tags.is_empty());
    }
}
