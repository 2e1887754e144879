//! Asset System - runtime management of asset libraries.
//!
//! Libraries are directories of document files containing reusable assets,
//! plus a catalog definition file describing how those assets are grouped.
//! This crate loads libraries on demand, keeps their catalogs in sync with
//! disk, tracks the assets each library knows about and resolves persisted
//! weak references back to files on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use asset_system::{
//!     AssetLibraryReference, AssetLibraryService, Document, Preferences, SaveHandlerRegistry,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> asset_system::Result<()> {
//!     let prefs = Preferences::load(&asset_system::platform::default_preferences_path()?)?;
//!     let mut service = AssetLibraryService::new(prefs, Arc::new(SaveHandlerRegistry::new()));
//!
//!     let document = Document::new();
//!     if let Some(all) = service.get_asset_library(&document, AssetLibraryReference::All) {
//!         for catalog in all.catalog_service().catalogs() {
//!             println!("{}", catalog.path);
//!         }
//!     }
//!
//!     service.destroy();
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod library;
pub mod metadata;
pub mod platform;
pub mod preferences;
pub mod registry;

// Re-export commonly used types
pub use catalog::{AssetCatalog, AssetCatalogService, CatalogPath};
pub use document::{Document, IdRemapper, IdType, LocalId, SaveHandlerRegistry};
pub use error::{AssetError, Result};
pub use library::{
    AssetIdentifier, AssetLibrary, AssetLibraryReference, AssetLibraryType, AssetRepresentation,
    AssetWeakReference, ExplodedOffsets, ExplodedPath, ImportSettings,
};
pub use metadata::AssetMetaData;
pub use preferences::{CustomAssetLibrary, ImportMethod, Preferences};
pub use registry::{AssetLibraryService, EXPLODE_BUFFER_SIZE};
