//! ID types and handles for data-blocks living in a document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of data-block an asset wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    Action,
    Brush,
    Collection,
    Image,
    Material,
    Mesh,
    NodeTree,
    Object,
    Scene,
    World,
}

impl IdType {
    pub const ALL: [IdType; 10] = [
        IdType::Action,
        IdType::Brush,
        IdType::Collection,
        IdType::Image,
        IdType::Material,
        IdType::Mesh,
        IdType::NodeTree,
        IdType::Object,
        IdType::Scene,
        IdType::World,
    ];

    /// Two-letter code, as stored in front of data-block names.
    pub fn code(&self) -> &'static str {
        match self {
            IdType::Action => "AC",
            IdType::Brush => "BR",
            IdType::Collection => "GR",
            IdType::Image => "IM",
            IdType::Material => "MA",
            IdType::Mesh => "ME",
            IdType::NodeTree => "NT",
            IdType::Object => "OB",
            IdType::Scene => "SC",
            IdType::World => "WO",
        }
    }

    /// Name of the group this type is listed under inside a library file.
    pub fn group_name(&self) -> &'static str {
        match self {
            IdType::Action => "Action",
            IdType::Brush => "Brush",
            IdType::Collection => "Collection",
            IdType::Image => "Image",
            IdType::Material => "Material",
            IdType::Mesh => "Mesh",
            IdType::NodeTree => "NodeTree",
            IdType::Object => "Object",
            IdType::Scene => "Scene",
            IdType::World => "World",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_group_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.group_name() == name)
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}

/// Session-unique identifier of a data-block. Zero is never handed out.
pub type SessionUid = u32;

/// Non-owning handle to a data-block stored in the open document.
///
/// Handles are cheap to clone. Two handles are equal when they refer to the
/// same data-block (same session UID).
#[derive(Debug, Clone)]
pub struct LocalId {
    session_uid: SessionUid,
    id_type: IdType,
    name: Arc<str>,
}

impl LocalId {
    pub(crate) fn new(session_uid: SessionUid, id_type: IdType, name: &str) -> Self {
        Self {
            session_uid,
            id_type,
            name: Arc::from(name),
        }
    }

    pub fn session_uid(&self) -> SessionUid {
        self.session_uid
    }

    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of this data-block relative to its file: `<Group>/<name>`.
    pub fn relative_asset_path(&self) -> String {
        format!("{}/{}", self.id_type.group_name(), self.name)
    }
}

impl PartialEq for LocalId {
    fn eq(&self, other: &Self) -> bool {
        self.session_uid == other.session_uid
    }
}

impl Eq for LocalId {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for id_type in IdType::ALL {
            assert_eq!(IdType::from_code(id_type.code()), Some(id_type));
            assert_eq!(IdType::from_group_name(id_type.group_name()), Some(id_type));
        }
        assert_eq!(IdType::from_code("ZZ"), None);
    }

    #[test]
    fn test_relative_asset_path() {
        let id = LocalId::new(7, IdType::Material, "Oak Planks");
        assert_eq!(id.relative_asset_path(), "Material/Oak Planks");
    }

    #[test]
    fn test_equality_is_by_session_uid() {
        let a = LocalId::new(3, IdType::Object, "Chair");
        let renamed = LocalId::new(3, IdType::Object, "Chair.001");
        let other = LocalId::new(4, IdType::Object, "Chair");
        assert_eq!(a, renamed);
        assert_ne!(a, other);
    }
}
