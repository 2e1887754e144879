//! Platform abstraction layer.
//!
//! Path normalization and platform-standard locations live here so the rest
//! of the crate never deals with separators or config directories directly.

pub mod paths;

pub use paths::{
    default_preferences_path, has_document_extension, normalize_directory_path, normalize_path,
    path_is_within, split_dir_part,
};
