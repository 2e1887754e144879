//! User preferences relevant to asset libraries.
//!
//! Stored as JSON (see [`crate::platform::default_preferences_path`]).

use crate::error::Result;
use crate::metadata::{read_json, write_json_atomic};
use crate::platform::path_is_within;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// How an asset is brought into the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportMethod {
    /// Reference the data-block from the library file.
    Link,
    /// Copy the data-block and everything it uses.
    Append,
    /// Copy the data-block, reusing data that was appended before.
    #[default]
    AppendReuse,
}

/// A custom asset library configured by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAssetLibrary {
    pub name: String,
    pub dirpath: String,
    #[serde(default)]
    pub import_method: ImportMethod,
    #[serde(default = "default_use_relative_path")]
    pub use_relative_path: bool,
}

fn default_use_relative_path() -> bool {
    true
}

impl CustomAssetLibrary {
    pub fn new(name: impl Into<String>, dirpath: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dirpath: dirpath.into(),
            import_method: ImportMethod::default(),
            use_relative_path: default_use_relative_path(),
        }
    }

    pub fn with_import_method(mut self, import_method: ImportMethod) -> Self {
        self.import_method = import_method;
        self
    }
}

/// Asset library preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Custom libraries, in the order shown to the user. A library's index
    /// here is what `AssetLibraryReference::Custom` refers to.
    #[serde(default)]
    pub asset_libraries: Vec<CustomAssetLibrary>,
    /// Directory of the bundled essentials library, if installed.
    #[serde(default)]
    pub essentials_directory: Option<String>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from `path`; a missing file gives defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let prefs = read_json::<Preferences>(path)?.unwrap_or_default();
        debug!(
            "Loaded preferences from {} ({} custom libraries)",
            path.display(),
            prefs.asset_libraries.len()
        );
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self, false)
    }

    /// Append a custom library and return its index.
    pub fn add_library(&mut self, library: CustomAssetLibrary) -> usize {
        self.asset_libraries.push(library);
        self.asset_libraries.len() - 1
    }

    pub fn remove_library(&mut self, index: usize) -> Option<CustomAssetLibrary> {
        (index < self.asset_libraries.len()).then(|| self.asset_libraries.remove(index))
    }

    pub fn custom_library(&self, index: usize) -> Option<&CustomAssetLibrary> {
        self.asset_libraries.get(index)
    }

    pub fn find_library_by_name(&self, name: &str) -> Option<&CustomAssetLibrary> {
        self.asset_libraries.iter().find(|lib| lib.name == name)
    }

    /// First custom library whose directory contains `path`.
    pub fn library_containing_path(&self, path: &str) -> Option<&CustomAssetLibrary> {
        self.asset_libraries
            .iter()
            .find(|lib| path_is_within(path, &lib.dirpath))
    }

    /// Essentials directory, `None` when unset or empty.
    pub fn essentials_directory(&self) -> Option<&str> {
        self.essentials_directory
            .as_deref()
            .filter(|dir| !dir.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");

        let mut prefs = Preferences::new();
        prefs.add_library(
            CustomAssetLibrary::new("Studio", "/mnt/studio/assets")
                .with_import_method(ImportMethod::Link),
        );
        prefs.essentials_directory = Some("/opt/app/essentials".to_string());
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let prefs = Preferences::load(&temp_dir.path().join("none.json")).unwrap();
        assert!(prefs.asset_libraries.is_empty());
        assert!(prefs.essentials_directory().is_none());
    }

    #[test]
    fn test_partial_entry_gets_defaults() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"assetLibraries": [{"name": "Mine", "dirpath": "/home/me/assets"}]}"#,
        )
        .unwrap();
        let lib = prefs.custom_library(0).unwrap();
        assert_eq!(lib.import_method, ImportMethod::AppendReuse);
        assert!(lib.use_relative_path);
    }

    #[test]
    fn test_library_containing_path() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("A", "/assets/a"));
        prefs.add_library(CustomAssetLibrary::new("B", "/assets/b/"));

        let found = prefs.library_containing_path("/assets/b/props/chair.blend");
        assert_eq!(found.map(|l| l.name.as_str()), Some("B"));
        assert!(prefs.library_containing_path("/assets/c/x.blend").is_none());
    }

    #[test]
    fn test_remove_library_out_of_range() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("A", "/a"));
        assert!(prefs.remove_library(3).is_none());
        assert_eq!(prefs.remove_library(0).map(|l| l.name), Some("A".to_string()));
    }
}
