//! String path utilities.
//!
//! Library roots and asset identifiers are handled as `/`-separated strings
//! rather than `PathBuf`s: full asset paths reach *into* library document
//! files (`/lib/props.blend/Object/Chair`) and have to be split at separator
//! positions, which `Path` cannot represent. Backslashes are accepted on
//! input and converted.

use crate::config::PathsConfig;
use crate::error::{AssetError, Result};
use std::path::PathBuf;

const SEP: char = PathsConfig::SEPARATOR;

/// Normalize a path string.
///
/// - `\` becomes `/`
/// - repeated separators collapse
/// - `.` segments are dropped and `..` segments resolved where possible
/// - a trailing separator on the input is preserved
///
/// An empty input stays empty.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with(SEP);
    let trailing = unified.len() > 1 && unified.ends_with(SEP);

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split(SEP) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let mut normalized = String::with_capacity(unified.len());
    if absolute {
        normalized.push(SEP);
    }
    normalized.push_str(&parts.join("/"));
    if trailing && !parts.is_empty() {
        normalized.push(SEP);
    }
    normalized
}

/// Normalize a directory path and make sure it ends with a separator.
///
/// Empty input stays empty, which is how in-memory libraries spell
/// "no root".
pub fn normalize_directory_path(directory: &str) -> String {
    if directory.is_empty() {
        return String::new();
    }
    let mut normalized = normalize_path(directory);
    if !normalized.ends_with(SEP) {
        normalized.push(SEP);
    }
    normalized
}

/// Directory part of `path`, including the trailing separator.
///
/// Returns an empty string when `path` has no separator.
pub fn split_dir_part(path: &str) -> String {
    let unified = path.replace('\\', "/");
    match unified.rfind(SEP) {
        Some(pos) => unified[..=pos].to_string(),
        None => String::new(),
    }
}

/// Check whether `path` names a library document file by its extension.
pub fn has_document_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    PathsConfig::DOCUMENT_FILE_EXTENSIONS
        .iter()
        .any(|ext| lower.len() > ext.len() && lower.ends_with(ext))
}

/// Check whether `path` lies inside (or is) the directory `root`.
pub fn path_is_within(path: &str, root: &str) -> bool {
    let root_dir = normalize_directory_path(root);
    if root_dir.is_empty() {
        return false;
    }
    let path = normalize_path(path);
    path.starts_with(&root_dir) || path == root_dir.trim_end_matches(SEP)
}

/// Location of the preferences file in the platform config directory.
///
/// - **Linux**: `~/.config/asset-system/asset_preferences.json`
/// - **Windows**: `%APPDATA%\asset-system\asset_preferences.json`
/// - **macOS**: `~/Library/Application Support/asset-system/asset_preferences.json`
pub fn default_preferences_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| AssetError::Config {
        message: "Could not determine config directory".to_string(),
    })?;
    Ok(config_dir
        .join(PathsConfig::CONFIG_DIR_NAME)
        .join(PathsConfig::PREFERENCES_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_resolves() {
        assert_eq!(normalize_path("/a//b/./c/../d"), "/a/b/d");
        assert_eq!(normalize_path("a\\b\\c"), "a/b/c");
        assert_eq!(normalize_path("/a/b/"), "/a/b/");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn test_normalize_parent_segments() {
        assert_eq!(normalize_path("/../a"), "/a");
        assert_eq!(normalize_path("../a/b/../c"), "../a/c");
        assert_eq!(normalize_path("a/../../b"), "../b");
    }

    #[test]
    fn test_normalize_directory_adds_separator() {
        assert_eq!(normalize_directory_path("/lib/assets"), "/lib/assets/");
        assert_eq!(normalize_directory_path("/lib/assets//"), "/lib/assets/");
        assert_eq!(normalize_directory_path(""), "");
    }

    #[test]
    fn test_split_dir_part() {
        assert_eq!(split_dir_part("/projects/shot.blend"), "/projects/");
        assert_eq!(split_dir_part("shot.blend"), "");
    }

    #[test]
    fn test_document_extension_check() {
        assert!(has_document_extension("/lib/props.blend"));
        assert!(has_document_extension("/lib/PROPS.BLEND"));
        assert!(has_document_extension("/lib/props.blend.gz"));
        assert!(!has_document_extension("/lib/props.txt"));
        assert!(!has_document_extension(".blend"));
    }

    #[test]
    fn test_path_is_within() {
        assert!(path_is_within("/lib/assets/props.blend", "/lib/assets"));
        assert!(path_is_within("/lib/assets", "/lib/assets/"));
        assert!(!path_is_within("/lib/assets2/props.blend", "/lib/assets"));
        assert!(!path_is_within("/lib/assets/x", ""));
    }
}
