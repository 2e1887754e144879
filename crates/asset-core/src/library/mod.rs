//! Loaded asset libraries and the assets they know about.

mod asset_library;
mod exploded;
mod identifier;
mod reference;
mod representation;

pub use asset_library::{AssetLibrary, ImportSettings};
pub use exploded::{nul_terminated_str, split_library_path, ExplodedOffsets, ExplodedPath};
pub use identifier::{AssetIdentifier, AssetWeakReference};
pub use reference::{AssetLibraryReference, AssetLibraryType};
pub use representation::{AssetRepresentation, ExternalAsset};
