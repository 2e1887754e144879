//! Atomic JSON persistence.
//!
//! Writes go through a temporary file created next to the target so the
//! final rename never crosses a filesystem boundary:
//! 1. Serialize and write into a `tempfile::NamedTempFile` in the target dir
//! 2. fsync the temporary file
//! 3. Optionally copy the previous target to `<name>.bak`
//! 4. Persist (rename) over the target

use crate::error::{AssetError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if reading or
/// parsing fails.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AssetError::io_with_path(e, path)),
    };

    let data = serde_json::from_str(&contents).map_err(|e| AssetError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write `data` as pretty-printed JSON to `path`, atomically.
///
/// Missing parent directories are created. Backup failures are logged and
/// otherwise ignored.
pub fn write_json_atomic<T: Serialize>(path: &Path, data: &T, keep_backup: bool) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| AssetError::io_with_path(e, parent))?;

    let serialized = serde_json::to_string_pretty(data).map_err(|e| AssetError::Json {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| AssetError::io_with_path(e, parent))?;
    temp.write_all(serialized.as_bytes())
        .map_err(|e| AssetError::io_with_path(e, temp.path()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| AssetError::io_with_path(e, temp.path()))?;

    if keep_backup && path.exists() {
        let backup = backup_path(path);
        match fs::copy(path, &backup) {
            Ok(_) => debug!("Created backup: {}", backup.display()),
            Err(e) => warn!("Failed to create backup {}: {}", backup.display(), e),
        }
    }

    temp.persist(path)
        .map_err(|e| AssetError::io_with_path(e.error, path))?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

/// `<path>.bak`, keeping the original extension intact.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}
