//! Runtime representation of a single asset.

use crate::document::{IdRemapper, IdType, LocalId, RemapOutcome};
use crate::library::asset_library::AssetLibrary;
use crate::library::identifier::{AssetIdentifier, AssetWeakReference};
use crate::metadata::AssetMetaData;
use crate::preferences::ImportMethod;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Data of an asset stored in another file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAsset {
    pub name: String,
    pub id_type: IdType,
    pub metadata: AssetMetaData,
}

#[derive(Debug)]
enum AssetData {
    External(ExternalAsset),
    /// An ID of the current document. The slot is emptied when the ID is
    /// deleted; the owning library then drops the representation.
    LocalId {
        /// Type of the ID the asset was created for, reported once the slot
        /// is empty.
        initial_id_type: IdType,
        id: RwLock<Option<LocalId>>,
    },
}

/// An asset known to a loaded [`AssetLibrary`].
///
/// Owned by its library; everyone else holds a `Weak` and must not assume it
/// outlives the library.
#[derive(Debug)]
pub struct AssetRepresentation {
    identifier: AssetIdentifier,
    data: AssetData,
    owner: Weak<AssetLibrary>,
}

impl AssetRepresentation {
    pub(crate) fn new_external(
        identifier: AssetIdentifier,
        asset: ExternalAsset,
        owner: Weak<AssetLibrary>,
    ) -> Self {
        Self {
            identifier,
            data: AssetData::External(asset),
            owner,
        }
    }

    pub(crate) fn new_local_id(
        identifier: AssetIdentifier,
        id: LocalId,
        owner: Weak<AssetLibrary>,
    ) -> Self {
        Self {
            identifier,
            data: AssetData::LocalId {
                initial_id_type: id.id_type(),
                id: RwLock::new(Some(id)),
            },
            owner,
        }
    }

    /// Persistent reference to this asset. `None` once the owning library
    /// is gone.
    pub fn make_weak_reference(&self) -> Option<AssetWeakReference> {
        let owner = self.owner.upgrade()?;
        Some(AssetWeakReference::make_reference(
            owner.library_type(),
            owner.name(),
            &self.identifier,
        ))
    }

    /// Asset name. For local IDs this follows renames and remaps; empty once
    /// the ID was unassigned.
    pub fn name(&self) -> String {
        match &self.data {
            AssetData::External(asset) => asset.name.clone(),
            AssetData::LocalId { id, .. } => read_slot(id)
                .as_ref()
                .map(|id| id.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// ID type. For local IDs this follows remaps to IDs of another type.
    pub fn id_type(&self) -> IdType {
        match &self.data {
            AssetData::External(asset) => asset.id_type,
            AssetData::LocalId {
                initial_id_type,
                id,
            } => read_slot(id)
                .as_ref()
                .map_or(*initial_id_type, LocalId::id_type),
        }
    }

    /// Metadata of an external asset.
    ///
    /// # Panics
    ///
    /// For local ID assets, whose metadata lives on the ID itself.
    pub fn metadata(&self) -> &AssetMetaData {
        match &self.data {
            AssetData::External(asset) => &asset.metadata,
            AssetData::LocalId { .. } => panic!(
                "metadata() called on local ID asset {:?}",
                self.identifier.library_relative_identifier()
            ),
        }
    }

    /// External asset data, `None` for local IDs.
    pub fn external(&self) -> Option<&ExternalAsset> {
        match &self.data {
            AssetData::External(asset) => Some(asset),
            AssetData::LocalId { .. } => None,
        }
    }

    /// The local ID, `None` once it was unassigned.
    ///
    /// # Panics
    ///
    /// For external assets.
    pub fn local_id(&self) -> Option<LocalId> {
        match &self.data {
            AssetData::LocalId { id, .. } => read_slot(id).clone(),
            AssetData::External(_) => panic!(
                "local_id() called on external asset {:?}",
                self.identifier.library_relative_identifier()
            ),
        }
    }

    pub fn is_local_id(&self) -> bool {
        matches!(self.data, AssetData::LocalId { .. })
    }

    pub fn identifier(&self) -> &AssetIdentifier {
        &self.identifier
    }

    pub fn library_relative_identifier(&self) -> &str {
        self.identifier.library_relative_identifier()
    }

    pub fn full_path(&self) -> String {
        self.identifier.full_path()
    }

    pub fn full_library_path(&self) -> Option<String> {
        self.identifier.full_library_path()
    }

    /// Import method configured for the owning library, if any.
    pub fn import_method(&self) -> Option<ImportMethod> {
        self.owner
            .upgrade()
            .and_then(|owner| owner.import_settings().import_method)
    }

    /// Whether the user may pick another import method. Always true when the
    /// library doesn't prescribe one.
    pub fn may_override_import_method(&self) -> bool {
        match self.owner.upgrade() {
            Some(owner) => {
                let settings = owner.import_settings();
                settings.import_method.is_none() || settings.may_override_import_method
            }
            None => true,
        }
    }

    pub fn use_relative_path(&self) -> bool {
        self.owner
            .upgrade()
            .map(|owner| owner.import_settings().use_relative_path)
            .unwrap_or(true)
    }

    pub fn owner_asset_library(&self) -> Option<Arc<AssetLibrary>> {
        self.owner.upgrade()
    }

    /// Let a local ID follow `remapper`. External assets are left alone.
    pub(crate) fn remap_local_id(&self, remapper: &IdRemapper) -> RemapOutcome {
        match &self.data {
            AssetData::LocalId { id, .. } => {
                let mut slot = id.write().unwrap_or_else(PoisonError::into_inner);
                remapper.apply(&mut *slot)
            }
            AssetData::External(_) => RemapOutcome::Unchanged,
        }
    }
}

fn read_slot(slot: &RwLock<Option<LocalId>>) -> std::sync::RwLockReadGuard<'_, Option<LocalId>> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}
