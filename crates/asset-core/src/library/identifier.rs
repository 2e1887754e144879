//! Asset identifiers and persistable weak references.

use crate::library::exploded::split_library_path;
use crate::library::reference::AssetLibraryType;
use crate::platform::normalize_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Locates an asset: the root of its library plus a path relative to it.
///
/// The root is shared with the owning library, so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetIdentifier {
    library_root_path: Arc<str>,
    relative_asset_path: String,
}

impl AssetIdentifier {
    pub fn new(library_root_path: Arc<str>, relative_asset_path: impl Into<String>) -> Self {
        Self {
            library_root_path,
            relative_asset_path: relative_asset_path.into(),
        }
    }

    /// Root of the owning library. Empty for in-memory libraries.
    pub fn library_root_path(&self) -> &str {
        &self.library_root_path
    }

    pub fn library_relative_identifier(&self) -> &str {
        &self.relative_asset_path
    }

    /// Library root joined with the relative path.
    pub fn full_path(&self) -> String {
        normalize_path(&format!(
            "{}{}",
            self.library_root_path, self.relative_asset_path
        ))
    }

    /// Path of the document file containing the asset, if the full path
    /// reaches into one.
    pub fn full_library_path(&self) -> Option<String> {
        let full_path = self.full_path();
        split_library_path(&full_path).map(|(dir, _, _)| dir.to_string())
    }
}

/// Persistent, non-owning reference to an asset.
///
/// Survives across sessions: it names the library by type and, for custom
/// libraries, by name instead of pointing at a loaded library. Local
/// libraries rooted on disk are named by their root directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWeakReference {
    pub asset_library_type: AssetLibraryType,
    /// Library name for custom libraries, root directory for on-disk local
    /// libraries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_library_identifier: Option<String>,
    pub relative_asset_identifier: String,
}

impl AssetWeakReference {
    pub fn new(
        asset_library_type: AssetLibraryType,
        asset_library_identifier: Option<String>,
        relative_asset_identifier: impl Into<String>,
    ) -> Self {
        Self {
            asset_library_type,
            asset_library_identifier,
            relative_asset_identifier: relative_asset_identifier.into(),
        }
    }

    /// Reference into the library of the given type and name.
    pub(crate) fn make_reference(
        library_type: AssetLibraryType,
        library_name: &str,
        identifier: &AssetIdentifier,
    ) -> Self {
        let library_identifier = match library_type {
            AssetLibraryType::Local => identifier.library_root_path(),
            _ => library_name,
        };
        Self {
            asset_library_type: library_type,
            asset_library_identifier: (!library_identifier.is_empty())
                .then(|| library_identifier.to_string()),
            relative_asset_identifier: identifier.library_relative_identifier().to_string(),
        }
    }
}

impl fmt::Display for AssetWeakReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.asset_library_identifier {
            Some(name) => write!(
                f,
                "{}:{}:{}",
                self.asset_library_type, name, self.relative_asset_identifier
            ),
            None => write!(
                f,
                "{}:{}",
                self.asset_library_type, self.relative_asset_identifier
            ),
        }
    }
}
