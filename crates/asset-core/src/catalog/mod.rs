//! Asset catalogs.
//!
//! Catalogs group assets hierarchically. Each library keeps its catalogs in
//! a catalog definition file (CDF) in its root directory; the
//! [`AssetCatalogService`] loads, edits and writes them back.

mod asset_catalog;
mod definition_file;
mod path;
mod service;

pub use asset_catalog::{sensible_simple_name_for_path, AssetCatalog};
pub use definition_file::{
    definition_file_path, read_definition_file, write_definition_file, ModificationMarker,
};
pub use path::CatalogPath;
pub use service::AssetCatalogService;
