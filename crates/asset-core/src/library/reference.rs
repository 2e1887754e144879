//! Library types and library references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a loaded asset library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLibraryType {
    /// Aggregate of every loaded library.
    All,
    /// The open document, in memory or rooted at its directory.
    Local,
    /// Bundled with the application.
    Essentials,
    /// Configured by the user in the preferences.
    Custom,
}

impl AssetLibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetLibraryType::All => "all",
            AssetLibraryType::Local => "local",
            AssetLibraryType::Essentials => "essentials",
            AssetLibraryType::Custom => "custom",
        }
    }
}

impl fmt::Display for AssetLibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to ask the registry for a library. Never owns anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetLibraryReference {
    /// The in-memory library of the open document, saved or not.
    CurrentFile,
    /// The open document: in memory while unsaved, on disk afterwards.
    Local,
    /// The bundled essentials library.
    Essentials,
    /// The custom library at this index in the preferences.
    Custom { index: usize },
    /// Every library at once.
    All,
}

impl AssetLibraryReference {
    /// Type of the library this reference resolves to.
    pub fn library_type(&self) -> AssetLibraryType {
        match self {
            AssetLibraryReference::CurrentFile | AssetLibraryReference::Local => {
                AssetLibraryType::Local
            }
            AssetLibraryReference::Essentials => AssetLibraryType::Essentials,
            AssetLibraryReference::Custom { .. } => AssetLibraryType::Custom,
            AssetLibraryReference::All => AssetLibraryType::All,
        }
    }
}

impl fmt::Display for AssetLibraryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLibraryReference::CurrentFile => f.write_str("current-file"),
            AssetLibraryReference::Local => f.write_str("local"),
            AssetLibraryReference::Essentials => f.write_str("essentials"),
            AssetLibraryReference::Custom { index } => write!(f, "custom[{index}]"),
            AssetLibraryReference::All => f.write_str("all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_library_types() {
        assert_eq!(
            AssetLibraryReference::CurrentFile.library_type(),
            AssetLibraryType::Local
        );
        assert_eq!(
            AssetLibraryReference::Custom { index: 2 }.library_type(),
            AssetLibraryType::Custom
        );
    }

    #[test]
    fn test_type_serializes_snake_case() {
        let json = serde_json::to_string(&AssetLibraryType::Essentials).unwrap();
        assert_eq!(json, "\"essentials\"");
    }
}
