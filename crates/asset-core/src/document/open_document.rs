//! The open document: its file path and the data-blocks it holds.

use crate::document::id::{IdType, LocalId, SessionUid};
use std::path::{Path, PathBuf};

/// The document currently open in the host application.
///
/// Only the parts the asset system consults are modelled: where the file
/// lives on disk (nothing while unsaved) and which data-blocks it contains.
#[derive(Debug, Default)]
pub struct Document {
    filepath: Option<PathBuf>,
    ids: Vec<LocalId>,
    last_session_uid: SessionUid,
}

impl Document {
    /// A new, never saved document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document loaded from (or already saved to) `filepath`.
    pub fn with_filepath(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: Some(filepath.into()),
            ..Self::default()
        }
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// The file path as a `/`-separated string, empty while unsaved.
    pub fn filepath_str(&self) -> String {
        self.filepath
            .as_deref()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }

    pub fn set_filepath(&mut self, filepath: impl Into<PathBuf>) {
        self.filepath = Some(filepath.into());
    }

    pub fn is_saved(&self) -> bool {
        self.filepath.is_some()
    }

    /// Create a new data-block and return a handle to it.
    pub fn add_id(&mut self, id_type: IdType, name: &str) -> LocalId {
        self.last_session_uid += 1;
        let id = LocalId::new(self.last_session_uid, id_type, name);
        self.ids.push(id.clone());
        id
    }

    /// Delete a data-block. Returns whether it existed.
    pub fn remove_id(&mut self, id: &LocalId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[LocalId] {
        &self.ids
    }

    pub fn find_id(&self, id_type: IdType, name: &str) -> Option<&LocalId> {
        self.ids
            .iter()
            .find(|id| id.id_type() == id_type && id.name() == name)
    }
}
