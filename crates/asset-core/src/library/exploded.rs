//! Splitting full asset paths into library file, group and name.
//!
//! A full asset path reaches into a library document file:
//! `/lib/props.blend/Object/Chair`. The part up to and including the
//! document file is the *directory* component, the next component is the
//! *group* (the ID type's group name) and everything after that is the
//! *name*, which may itself contain separators.

use crate::config::PathsConfig;
use crate::error::{AssetError, Result};
use crate::platform::has_document_extension;
use std::ops::Range;

const SEP: char = PathsConfig::SEPARATOR;

/// Split `path` at the right-most document file component.
///
/// Returns `(dir, group, name)`; `group` and `name` may be empty. `None`
/// when the path contains no document file component.
pub fn split_library_path(path: &str) -> Option<(&str, &str, &str)> {
    let mut search_end = path.len();
    while let Some(pos) = path[..search_end].rfind(SEP) {
        let dir = &path[..pos];
        if has_document_extension(dir) {
            let rest = &path[pos + 1..];
            let (group, name) = rest.split_once(SEP).unwrap_or((rest, ""));
            return Some((dir, group, name));
        }
        search_end = pos;
    }
    None
}

/// A resolved full path, split into components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodedPath {
    full_path: String,
    dir: Option<Range<usize>>,
    group: Range<usize>,
    name: Range<usize>,
}

/// Start offsets of the NUL-terminated components written by
/// [`ExplodedPath::write_into`]. `None` marks an absent component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplodedOffsets {
    pub dir: Option<usize>,
    pub group: Option<usize>,
    pub name: Option<usize>,
}

impl ExplodedPath {
    /// Explode a path inside the current file: `<group>/<name>`.
    pub fn from_path_in_file(path_in_file: &str) -> Option<Self> {
        let (group, name) = path_in_file.split_once(SEP)?;
        if group.is_empty() || name.is_empty() {
            return None;
        }
        let group_end = group.len();
        Some(Self {
            full_path: path_in_file.to_string(),
            dir: None,
            group: 0..group_end,
            name: group_end + 1..path_in_file.len(),
        })
    }

    /// Explode a full path pointing into a library document file.
    pub fn from_library_path(full_path: &str) -> Option<Self> {
        let (dir, group, name) = split_library_path(full_path)?;
        if group.is_empty() || name.is_empty() {
            return None;
        }
        let dir_end = dir.len();
        let group_start = dir_end + 1;
        let group_end = group_start + group.len();
        Some(Self {
            full_path: full_path.to_string(),
            dir: (!dir.is_empty()).then_some(0..dir_end),
            group: group_start..group_end,
            name: group_end + 1..full_path.len(),
        })
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn dir(&self) -> Option<&str> {
        self.dir.clone().map(|range| &self.full_path[range])
    }

    pub fn group(&self) -> &str {
        &self.full_path[self.group.clone()]
    }

    pub fn name(&self) -> &str {
        &self.full_path[self.name.clone()]
    }

    /// Copy the full path into `buffer` and terminate every component with
    /// a NUL byte in place, so each can be read as its own C string.
    pub fn write_into(&self, buffer: &mut [u8]) -> Result<ExplodedOffsets> {
        let bytes = self.full_path.as_bytes();
        if bytes.len() + 1 > buffer.len() {
            return Err(AssetError::PathTooLong {
                len: bytes.len(),
                max: buffer.len().saturating_sub(1),
            });
        }

        buffer[..bytes.len()].copy_from_slice(bytes);
        buffer[bytes.len()] = 0;

        if let Some(dir) = &self.dir {
            buffer[dir.end] = 0;
        }
        buffer[self.group.end] = 0;

        Ok(ExplodedOffsets {
            dir: self.dir.as_ref().map(|dir| dir.start),
            group: Some(self.group.start),
            name: Some(self.name.start),
        })
    }
}

/// Read the NUL-terminated UTF-8 string starting at `offset`.
pub fn nul_terminated_str(buffer: &[u8], offset: usize) -> Option<&str> {
    let tail = buffer.get(offset..)?;
    let end = tail.iter().position(|b| *b == 0)?;
    std::str::from_utf8(&tail[..end]).ok()
}
