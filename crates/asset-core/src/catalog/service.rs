//! Catalog service: the set of catalogs of one asset library.

use crate::catalog::asset_catalog::{sensible_simple_name_for_path, AssetCatalog};
use crate::catalog::definition_file::{
    definition_file_path, read_definition_file, write_definition_file, ModificationMarker,
};
use crate::catalog::path::CatalogPath;
use crate::error::{AssetError, Result};
use crate::platform::{normalize_directory_path, split_dir_part};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maps catalog UUIDs to catalogs and keeps them in sync with the library's
/// catalog definition file.
///
/// Local edits (created, renamed or deleted catalogs) are tracked so that
/// reloading from disk merges outside changes instead of discarding work.
#[derive(Debug, Default)]
pub struct AssetCatalogService {
    /// Library root, normalized with trailing separator. Empty when the
    /// owning library lives in memory only.
    root: String,
    catalogs: HashMap<Uuid, AssetCatalog>,
    /// Catalogs deleted locally since the last load/write.
    deleted_catalogs: HashSet<Uuid>,
    /// Catalogs created or changed locally since the last load/write.
    locally_modified: HashSet<Uuid>,
    /// CDF that was read from or written to.
    definition_file: Option<PathBuf>,
    /// State of `definition_file` when it was last read or written.
    loaded_marker: Option<ModificationMarker>,
    has_unsaved_changes: bool,
    read_only: bool,
}

impl AssetCatalogService {
    /// A service for the library rooted at `root` (may be empty).
    pub fn new(root: &str) -> Self {
        Self {
            root: normalize_directory_path(root),
            ..Self::default()
        }
    }

    /// A service that can be filled through [`Self::add_from_existing`] but
    /// never writes to disk.
    pub fn new_read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// CDF this service is bound to, if any was read or written.
    pub fn definition_file(&self) -> Option<&Path> {
        self.definition_file.as_deref()
    }

    // ========================================
    // Disk I/O
    // ========================================

    /// Read the catalogs from the CDF in the library root.
    ///
    /// Missing, unreadable or corrupt files leave the service empty; that
    /// state is logged, not returned.
    pub fn load_from_disk(&mut self) {
        if self.root.is_empty() {
            return;
        }
        let path = definition_file_path(&self.root);

        match read_definition_file(&path) {
            Ok(Some(catalogs)) => {
                info!("Loaded {} catalogs from {}", catalogs.len(), path.display());
                self.catalogs = catalogs.into_iter().map(|c| (c.catalog_id, c)).collect();
                self.loaded_marker = ModificationMarker::of(&path);
                self.definition_file = Some(path);
            }
            Ok(None) => {
                debug!("No catalog definition file at {}", path.display());
            }
            Err(e) => {
                warn!("Ignoring catalog definition file {}: {}", path.display(), e);
                self.loaded_marker = ModificationMarker::of(&path);
            }
        }
    }

    /// Merge the current CDF contents into memory.
    ///
    /// Catalogs edited locally keep their local state, locally deleted ones
    /// stay deleted, everything else follows the file.
    pub fn reload_catalogs(&mut self) {
        let Some(path) = self.candidate_definition_file() else {
            return;
        };

        let on_disk = match read_definition_file(&path) {
            Ok(Some(catalogs)) => catalogs,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Not reloading catalogs from {}: {}", path.display(), e);
                return;
            }
        };

        let on_disk_ids: HashSet<Uuid> = on_disk.iter().map(|c| c.catalog_id).collect();
        // Unmodified catalogs that vanished from the file were deleted elsewhere.
        self.catalogs
            .retain(|id, _| on_disk_ids.contains(id) || self.locally_modified.contains(id));

        for catalog in on_disk {
            let id = catalog.catalog_id;
            if self.deleted_catalogs.contains(&id) || self.locally_modified.contains(&id) {
                continue;
            }
            self.catalogs.insert(id, catalog);
        }

        self.loaded_marker = ModificationMarker::of(&path);
        if path.exists() {
            self.definition_file = Some(path);
        }
        debug!("Reloaded catalogs, {} in memory", self.catalogs.len());
    }

    /// Whether the CDF changed on disk since it was last read or written.
    pub fn is_dirty_on_disk(&self) -> bool {
        match self.candidate_definition_file() {
            Some(path) => ModificationMarker::of(&path) != self.loaded_marker,
            None => false,
        }
    }

    /// Write the catalogs to disk.
    ///
    /// The target is the CDF that was loaded, else the CDF location in the
    /// library root, else the directory of `document_path`. Returns
    /// `Ok(false)` for read-only services. Having nothing to write counts as
    /// success.
    pub fn write_to_disk(&mut self, document_path: &str) -> Result<bool> {
        if self.read_only {
            debug!("Not writing read-only catalog service");
            return Ok(false);
        }

        let target = match &self.definition_file {
            Some(path) => {
                let path = path.clone();
                // Keep catalogs that others added to the file meanwhile.
                self.reload_catalogs();
                path
            }
            None => {
                if self.catalogs.is_empty() && self.deleted_catalogs.is_empty() {
                    return Ok(true);
                }
                self.suitable_definition_file_for_writing(document_path)?
            }
        };

        write_definition_file(&target, self.catalogs.values())?;
        info!("Wrote {} catalogs to {}", self.catalogs.len(), target.display());

        self.loaded_marker = ModificationMarker::of(&target);
        self.definition_file = Some(target);
        self.deleted_catalogs.clear();
        self.locally_modified.clear();
        self.has_unsaved_changes = false;
        Ok(true)
    }

    fn candidate_definition_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.definition_file {
            return Some(path.clone());
        }
        if self.root.is_empty() {
            return None;
        }
        Some(definition_file_path(&self.root))
    }

    fn suitable_definition_file_for_writing(&self, document_path: &str) -> Result<PathBuf> {
        if !self.root.is_empty() {
            return Ok(definition_file_path(&self.root));
        }
        let document_dir = split_dir_part(document_path);
        if document_dir.is_empty() {
            return Err(AssetError::Config {
                message: format!(
                    "Cannot determine where to write catalogs for document {document_path:?}"
                ),
            });
        }
        Ok(definition_file_path(&document_dir))
    }

    // ========================================
    // Catalog editing
    // ========================================

    /// Create a catalog at `path` and return it.
    pub fn create_catalog(&mut self, path: &str) -> Result<&AssetCatalog> {
        if self.read_only {
            return Err(AssetError::Other(
                "Cannot create catalogs in a read-only catalog service".to_string(),
            ));
        }
        let path = CatalogPath::new(path);
        if path.is_empty() {
            return Err(AssetError::InvalidCatalogPath {
                path: path.to_string(),
            });
        }
        if self.find_catalog_by_path(&path).is_some() {
            return Err(AssetError::CatalogExists {
                path: path.to_string(),
            });
        }

        let catalog = AssetCatalog::from_path(path);
        let id = catalog.catalog_id;
        debug!("Created catalog {} at {}", id, catalog.path);
        self.locally_modified.insert(id);
        self.deleted_catalogs.remove(&id);
        self.tag_has_unsaved_changes();
        Ok(&*self.catalogs.entry(id).or_insert(catalog))
    }

    /// Delete a catalog. Returns whether it existed.
    pub fn delete_catalog(&mut self, catalog_id: Uuid) -> bool {
        if self.read_only || self.catalogs.remove(&catalog_id).is_none() {
            return false;
        }
        self.locally_modified.remove(&catalog_id);
        self.deleted_catalogs.insert(catalog_id);
        self.tag_has_unsaved_changes();
        true
    }

    /// Move the catalog and all catalogs below it to `new_path`.
    ///
    /// Simple names are left alone; they are what assets fall back on.
    /// Returns the number of catalogs moved.
    pub fn update_catalog_path(&mut self, catalog_id: Uuid, new_path: &str) -> Result<usize> {
        let new_path = CatalogPath::new(new_path);
        if new_path.is_empty() {
            return Err(AssetError::InvalidCatalogPath {
                path: new_path.to_string(),
            });
        }
        let Some(old_path) = self.catalogs.get(&catalog_id).map(|c| c.path.clone()) else {
            return Ok(0);
        };

        let mut moved = 0;
        for catalog in self.catalogs.values_mut() {
            if let Some(rebased) = catalog.path.rebase(&old_path, &new_path) {
                catalog.path = rebased;
                self.locally_modified.insert(catalog.catalog_id);
                moved += 1;
            }
        }
        if moved > 0 {
            self.tag_has_unsaved_changes();
        }
        Ok(moved)
    }

    /// Copy all catalogs of `other` that this service doesn't know yet.
    pub fn add_from_existing(&mut self, other: &AssetCatalogService) {
        for catalog in other.catalogs.values() {
            self.catalogs
                .entry(catalog.catalog_id)
                .or_insert_with(|| catalog.clone());
        }
    }

    // ========================================
    // Lookup
    // ========================================

    pub fn find_catalog(&self, catalog_id: Uuid) -> Option<&AssetCatalog> {
        self.catalogs.get(&catalog_id)
    }

    pub fn find_catalog_by_path(&self, path: &CatalogPath) -> Option<&AssetCatalog> {
        self.catalogs.values().find(|c| &c.path == path)
    }

    /// All catalogs, ordered by path.
    pub fn catalogs(&self) -> Vec<&AssetCatalog> {
        let mut catalogs: Vec<&AssetCatalog> = self.catalogs.values().collect();
        catalogs.sort_by(|a, b| a.path.cmp(&b.path));
        catalogs
    }

    /// Catalogs at or below `parent`, ordered by path.
    pub fn catalogs_in(&self, parent: &CatalogPath) -> Vec<&AssetCatalog> {
        let mut catalogs: Vec<&AssetCatalog> = self
            .catalogs
            .values()
            .filter(|c| c.path.is_contained_in(parent))
            .collect();
        catalogs.sort_by(|a, b| a.path.cmp(&b.path));
        catalogs
    }

    /// Simple name a new catalog at `path` would get.
    pub fn simple_name_for(&self, path: &CatalogPath) -> String {
        sensible_simple_name_for_path(path)
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    // ========================================
    // Change tracking
    // ========================================

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn tag_has_unsaved_changes(&mut self) {
        self.has_unsaved_changes = true;
    }

    pub fn untag_has_unsaved_changes(&mut self) {
        self.has_unsaved_changes = false;
    }
}
