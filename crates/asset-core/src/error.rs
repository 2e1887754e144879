//! Error types for the asset system.
//!
//! Only genuine failures live here. Lookups that miss (unresolvable weak
//! references, unknown catalogs, assets that are not owned by a library) are
//! reported through `Option`/`bool` return values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the asset system.
#[derive(Debug, Error)]
pub enum AssetError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Unsupported catalog definition version {found} in {path} (expected {expected})")]
    UnsupportedCatalogVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    // Catalog errors
    #[error("Invalid catalog path: {path:?}")]
    InvalidCatalogPath { path: String },

    #[error("Catalog already exists at path: {path}")]
    CatalogExists { path: String },

    // Path resolution errors
    #[error("Path of {len} bytes does not fit a buffer of {max} bytes")]
    PathTooLong { len: usize, max: usize },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for asset system operations.
pub type Result<T> = std::result::Result<T, AssetError>;

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(err: serde_json::Error) -> Self {
        AssetError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl AssetError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        AssetError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// True for errors caused by the contents of a file rather than by
    /// access to it. Such files are skipped rather than retried.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            AssetError::Json { .. }
                | AssetError::UnsupportedCatalogVersion { .. }
                | AssetError::InvalidCatalogPath { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssetError::PathTooLong { len: 2000, max: 1090 };
        assert_eq!(
            err.to_string(),
            "Path of 2000 bytes does not fit a buffer of 1090 bytes"
        );
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        match AssetError::io_with_path(io, "/tmp/lib") {
            AssetError::Io { path, source, .. } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/lib")));
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_data_classification() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(AssetError::from(json_err).is_corrupt_data());
        assert!(!AssetError::Other("x".into()).is_corrupt_data());
    }
}
