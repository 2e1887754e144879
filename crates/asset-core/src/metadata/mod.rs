//! Asset metadata and JSON persistence.
//!
//! This module provides:
//! - `AssetMetaData`, the descriptive data attached to each asset
//! - Atomic JSON file operations shared by catalogs and preferences

mod asset_metadata;
mod atomic;

pub use asset_metadata::AssetMetaData;
pub use atomic::{backup_path, read_json, write_json_atomic};
