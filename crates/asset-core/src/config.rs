//! Centralized configuration for the asset system.
//!
//! Constants for catalog persistence, path handling and preference storage.

/// Catalog definition file configuration.
pub struct CatalogConfig;

impl CatalogConfig {
    /// File name of the catalog definition file in a library root.
    pub const DEFINITION_FILENAME: &'static str = "asset_catalogs.json";
    /// Version written to and accepted from catalog definition files.
    pub const DEFINITION_VERSION: u32 = 1;
    /// Separator between catalog path components.
    pub const PATH_SEPARATOR: char = '/';
    /// Simple names are limited to this many bytes, terminator included.
    pub const MAX_SIMPLE_NAME_LENGTH: usize = 64;
    /// Keep a `.bak` copy of the previous definition file on write.
    pub const KEEP_BACKUP: bool = true;
}

/// Path handling configuration.
pub struct PathsConfig;

impl PathsConfig {
    /// Separator used in library-relative identifiers and normalized paths.
    pub const SEPARATOR: char = '/';
    /// Extensions identifying a library document file inside a full asset path.
    pub const DOCUMENT_FILE_EXTENSIONS: &'static [&'static str] = &[".blend", ".ble", ".blend.gz"];
    /// Size of the caller buffer used by the exploded-path C contract.
    pub const FILE_MAX_LIBEXTRA: usize = 1090;
    /// Directory under the platform config dir holding our files.
    pub const CONFIG_DIR_NAME: &'static str = "asset-system";
    /// Preferences file name inside [`PathsConfig::CONFIG_DIR_NAME`].
    pub const PREFERENCES_FILENAME: &'static str = "asset_preferences.json";
}
