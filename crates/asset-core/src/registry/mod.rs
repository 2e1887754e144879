//! Registry of loaded asset libraries.
//!
//! The [`AssetLibraryService`] is the single owner of every loaded library.
//! It maps library references from the UI and persisted weak references to
//! loaded libraries and paths on disk.

mod library_service;

pub use library_service::{AssetLibraryService, EXPLODE_BUFFER_SIZE};
