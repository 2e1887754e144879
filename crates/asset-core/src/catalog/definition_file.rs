//! Catalog definition file (CDF) persistence.
//!
//! A library root holds at most one CDF, a JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "catalogs": [
//!     { "id": "…uuid…", "path": "Props/Chairs", "simple_name": "Props-Chairs" }
//!   ]
//! }
//! ```

use crate::catalog::asset_catalog::AssetCatalog;
use crate::config::CatalogConfig;
use crate::error::{AssetError, Result};
use crate::metadata::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// On-disk layout of a catalog definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DefinitionFileData {
    version: u32,
    #[serde(default)]
    catalogs: Vec<AssetCatalog>,
}

/// Cheap fingerprint of a file's state, used to detect outside changes
/// without re-reading the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModificationMarker {
    modified: Option<SystemTime>,
    len: u64,
}

impl ModificationMarker {
    /// Marker of the file at `path`, `None` if it doesn't exist.
    pub fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Path of the CDF inside a library root directory.
pub fn definition_file_path(root: &str) -> PathBuf {
    Path::new(root).join(CatalogConfig::DEFINITION_FILENAME)
}

/// Read the catalogs stored in the CDF at `path`.
///
/// Returns `None` when the file doesn't exist.
pub fn read_definition_file(path: &Path) -> Result<Option<Vec<AssetCatalog>>> {
    let Some(data) = read_json::<DefinitionFileData>(path)? else {
        return Ok(None);
    };

    if data.version != CatalogConfig::DEFINITION_VERSION {
        return Err(AssetError::UnsupportedCatalogVersion {
            path: path.to_path_buf(),
            found: data.version,
            expected: CatalogConfig::DEFINITION_VERSION,
        });
    }

    let mut catalogs = Vec::with_capacity(data.catalogs.len());
    for catalog in data.catalogs {
        // Paths are re-cleaned since the file may have been edited by hand.
        let path = crate::catalog::CatalogPath::new(catalog.path.as_str());
        if path.is_empty() {
            return Err(AssetError::InvalidCatalogPath {
                path: catalog.path.to_string(),
            });
        }
        catalogs.push(AssetCatalog::new(catalog.catalog_id, path, catalog.simple_name));
    }
    Ok(Some(catalogs))
}

/// Write `catalogs` to the CDF at `path`, sorted by catalog path.
pub fn write_definition_file<'a>(
    path: &Path,
    catalogs: impl IntoIterator<Item = &'a AssetCatalog>,
) -> Result<()> {
    let mut catalogs: Vec<AssetCatalog> = catalogs.into_iter().cloned().collect();
    catalogs.sort_by(|a, b| a.path.cmp(&b.path).then(a.catalog_id.cmp(&b.catalog_id)));

    let data = DefinitionFileData {
        version: CatalogConfig::DEFINITION_VERSION,
        catalogs,
    };
    write_json_atomic(path, &data, CatalogConfig::KEEP_BACKUP)
}
