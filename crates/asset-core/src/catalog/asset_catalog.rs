//! A single asset catalog.

use crate::catalog::path::CatalogPath;
use crate::config::CatalogConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named group of assets, identified by UUID.
///
/// Assets refer to catalogs by UUID only, so a catalog can be moved around
/// in the hierarchy without touching any asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalog {
    #[serde(rename = "id")]
    pub catalog_id: Uuid,
    pub path: CatalogPath,
    pub simple_name: String,
}

impl AssetCatalog {
    pub fn new(catalog_id: Uuid, path: CatalogPath, simple_name: impl Into<String>) -> Self {
        Self {
            catalog_id,
            path,
            simple_name: simple_name.into(),
        }
    }

    /// A catalog with a fresh UUID and a simple name derived from its path.
    pub fn from_path(path: CatalogPath) -> Self {
        let simple_name = sensible_simple_name_for_path(&path);
        Self::new(Uuid::new_v4(), path, simple_name)
    }
}

/// Derive a simple name from a catalog path.
///
/// Separators become dashes. Names that would not fit the simple-name
/// storage keep their tail, since the start of a path is its most generic
/// part.
pub fn sensible_simple_name_for_path(path: &CatalogPath) -> String {
    let name = path.as_str().replace(CatalogConfig::PATH_SEPARATOR, "-");
    let max_chars = CatalogConfig::MAX_SIMPLE_NAME_LENGTH - 1;
    let char_count = name.chars().count();
    if char_count < max_chars {
        return name;
    }

    let keep = max_chars - 3;
    let tail: String = name.chars().skip(char_count - keep).collect();
    format!("...{tail}")
}
