//! A loaded asset library: its catalogs and asset representations.

use crate::catalog::AssetCatalogService;
use crate::document::{
    Document, IdRemapper, IdType, LocalId, RemapOutcome, SaveHandlerId, SaveHandlerRegistry,
};
use crate::library::identifier::AssetIdentifier;
use crate::library::reference::AssetLibraryType;
use crate::library::representation::{AssetRepresentation, ExternalAsset};
use crate::metadata::AssetMetaData;
use crate::platform::{has_document_extension, normalize_directory_path};
use crate::preferences::ImportMethod;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Process-wide switch: write catalogs of every library when the document
/// is saved.
static SAVE_CATALOGS_WHEN_FILE_IS_SAVED: AtomicBool = AtomicBool::new(true);

/// How assets of a library are imported into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    /// `None` leaves the choice to the user.
    pub import_method: Option<ImportMethod>,
    pub may_override_import_method: bool,
    pub use_relative_path: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            import_method: None,
            may_override_import_method: false,
            use_relative_path: true,
        }
    }
}

/// Representations, keyed by library relative identifier.
#[derive(Debug, Default)]
struct AssetStorage {
    local_id_assets: HashMap<String, Arc<AssetRepresentation>>,
    external_assets: HashMap<String, Arc<AssetRepresentation>>,
}

#[derive(Debug)]
struct SaveHookRegistration {
    registry: Weak<SaveHandlerRegistry>,
    handler: SaveHandlerId,
}

/// A loaded asset library.
///
/// Always lives in an `Arc` (see [`AssetLibrary::new`]) so representations
/// and save handlers can point back at it without owning it. All state is
/// behind locks: the library is shared between the registry, UI code and
/// background loaders.
pub struct AssetLibrary {
    library_type: AssetLibraryType,
    /// User-visible name; empty for builtin libraries.
    name: String,
    /// Normalized with trailing separator; empty for in-memory libraries.
    root_path: Arc<str>,
    catalog_service: RwLock<AssetCatalogService>,
    /// Set on the "all" library when a member library's catalogs changed.
    catalogs_dirty: AtomicBool,
    storage: Mutex<AssetStorage>,
    import_settings: RwLock<ImportSettings>,
    save_hook: Mutex<Option<SaveHookRegistration>>,
    self_ref: Weak<AssetLibrary>,
}

impl AssetLibrary {
    /// Create a library. `root_path` may be empty for in-memory libraries.
    ///
    /// Catalogs are not read yet, see [`Self::load_catalogs`].
    pub fn new(library_type: AssetLibraryType, name: &str, root_path: &str) -> Arc<Self> {
        let root_path = normalize_directory_path(root_path);
        Arc::new_cyclic(|self_ref| Self {
            library_type,
            name: name.to_string(),
            catalog_service: RwLock::new(AssetCatalogService::new(&root_path)),
            root_path: Arc::from(root_path),
            catalogs_dirty: AtomicBool::new(false),
            storage: Mutex::new(AssetStorage::default()),
            import_settings: RwLock::new(ImportSettings::default()),
            save_hook: Mutex::new(None),
            self_ref: self_ref.clone(),
        })
    }

    pub fn library_type(&self) -> AssetLibraryType {
        self.library_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn import_settings(&self) -> ImportSettings {
        *self
            .import_settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_import_settings(&self, settings: ImportSettings) {
        *self
            .import_settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn save_catalogs_when_file_is_saved() -> bool {
        SAVE_CATALOGS_WHEN_FILE_IS_SAVED.load(Ordering::Relaxed)
    }

    pub fn set_save_catalogs_when_file_is_saved(enabled: bool) {
        SAVE_CATALOGS_WHEN_FILE_IS_SAVED.store(enabled, Ordering::Relaxed);
    }

    // ========================================
    // Catalogs
    // ========================================

    /// Read the catalogs from disk into a fresh service and swap it in.
    ///
    /// Readers see either the old or the new service, never a partial one.
    pub fn load_catalogs(&self) {
        let mut fresh = AssetCatalogService::new(&self.root_path);
        fresh.load_from_disk();
        self.replace_catalog_service(fresh);
    }

    /// Swap in another catalog service. The previous one is dropped after
    /// the lock is released.
    pub(crate) fn replace_catalog_service(&self, service: AssetCatalogService) {
        let previous = std::mem::replace(&mut *self.catalog_service_mut(), service);
        drop(previous);
    }

    pub fn catalog_service(&self) -> RwLockReadGuard<'_, AssetCatalogService> {
        self.catalog_service
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn catalog_service_mut(&self) -> RwLockWriteGuard<'_, AssetCatalogService> {
        self.catalog_service
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge catalog changes from disk, keeping local edits.
    pub fn refresh_catalogs(&self) {
        if self.root_path.is_empty() || self.library_type == AssetLibraryType::All {
            return;
        }
        self.catalog_service_mut().reload_catalogs();
    }

    /// Reload catalogs if the definition file changed on disk. Returns
    /// whether anything was reloaded.
    pub fn reload_catalogs_if_dirty(&self) -> bool {
        if self.root_path.is_empty() || self.library_type == AssetLibraryType::All {
            return false;
        }
        let (dirty, has_unsaved) = {
            let service = self.catalog_service();
            (service.is_dirty_on_disk(), service.has_unsaved_changes())
        };
        if !dirty {
            return false;
        }

        debug!("Catalog definition file of {:?} changed on disk", self.root_path);
        if has_unsaved {
            self.refresh_catalogs();
        } else {
            self.load_catalogs();
        }
        true
    }

    pub fn is_catalogs_dirty(&self) -> bool {
        self.catalogs_dirty.load(Ordering::Acquire)
    }

    pub fn tag_catalogs_dirty(&self) {
        self.catalogs_dirty.store(true, Ordering::Release);
    }

    pub(crate) fn untag_catalogs_dirty(&self) {
        self.catalogs_dirty.store(false, Ordering::Release);
    }

    /// Update the cached catalog simple name in `metadata` from this
    /// library's catalogs. Left alone when the asset has no catalog or the
    /// catalog is unknown here.
    pub fn refresh_catalog_simplename(&self, metadata: &mut AssetMetaData) {
        if metadata.catalog_id.is_nil() {
            return;
        }
        let service = self.catalog_service();
        if let Some(catalog) = service.find_catalog(metadata.catalog_id) {
            metadata.catalog_simple_name = catalog.simple_name.clone();
        }
    }

    // ========================================
    // Asset representations
    // ========================================

    /// Representation of an asset stored in another file, created unless one
    /// with the same relative identifier exists already.
    pub fn add_external_asset(
        &self,
        relative_asset_path: &str,
        name: &str,
        id_type: IdType,
        metadata: AssetMetaData,
    ) -> Weak<AssetRepresentation> {
        let mut storage = self.lock_storage();
        let representation = storage
            .external_assets
            .entry(relative_asset_path.to_string())
            .or_insert_with(|| {
                Arc::new(AssetRepresentation::new_external(
                    self.make_identifier(relative_asset_path),
                    ExternalAsset {
                        name: name.to_string(),
                        id_type,
                        metadata,
                    },
                    self.self_ref.clone(),
                ))
            });
        Arc::downgrade(representation)
    }

    /// Representation of an ID of the current document, created unless one
    /// with the same relative identifier exists already.
    pub fn add_local_id_asset(
        &self,
        relative_asset_path: &str,
        id: &LocalId,
    ) -> Weak<AssetRepresentation> {
        let mut storage = self.lock_storage();
        let representation = storage
            .local_id_assets
            .entry(relative_asset_path.to_string())
            .or_insert_with(|| {
                Arc::new(AssetRepresentation::new_local_id(
                    self.make_identifier(relative_asset_path),
                    id.clone(),
                    self.self_ref.clone(),
                ))
            });
        Arc::downgrade(representation)
    }

    /// Remove exactly this representation. Returns false if it isn't owned
    /// by this library.
    pub fn remove_asset(&self, asset: &AssetRepresentation) -> bool {
        let mut guard = self.lock_storage();
        let storage = &mut *guard;
        let key = asset.library_relative_identifier();
        let removed = remove_if_same(&mut storage.local_id_assets, key, asset)
            || remove_if_same(&mut storage.external_assets, key, asset);
        if removed {
            debug!("Removed asset {:?} from {:?}", key, self.root_path);
        }
        removed
    }

    /// Let local ID assets follow `remapper`; drop those whose ID was
    /// unassigned. Returns how many were dropped.
    pub fn remap_ids_and_remove_invalid(&self, remapper: &IdRemapper) -> usize {
        let mut storage = self.lock_storage();

        let invalid: Vec<String> = storage
            .local_id_assets
            .iter()
            .filter(|(_, asset)| asset.remap_local_id(remapper) == RemapOutcome::SourceUnassigned)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &invalid {
            storage.local_id_assets.remove(key);
        }
        if !invalid.is_empty() {
            debug!("Removed {} assets with unassigned IDs", invalid.len());
        }
        invalid.len()
    }

    pub fn asset_count(&self) -> usize {
        let storage = self.lock_storage();
        storage.local_id_assets.len() + storage.external_assets.len()
    }

    pub fn local_id_assets(&self) -> Vec<Arc<AssetRepresentation>> {
        self.lock_storage().local_id_assets.values().cloned().collect()
    }

    pub fn external_assets(&self) -> Vec<Arc<AssetRepresentation>> {
        self.lock_storage().external_assets.values().cloned().collect()
    }

    /// Look up a representation by relative identifier, local IDs first.
    pub fn find_asset(&self, relative_asset_path: &str) -> Option<Arc<AssetRepresentation>> {
        let storage = self.lock_storage();
        storage
            .local_id_assets
            .get(relative_asset_path)
            .or_else(|| storage.external_assets.get(relative_asset_path))
            .cloned()
    }

    fn make_identifier(&self, relative_asset_path: &str) -> AssetIdentifier {
        AssetIdentifier::new(Arc::clone(&self.root_path), relative_asset_path)
    }

    fn lock_storage(&self) -> MutexGuard<'_, AssetStorage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================
    // Document save hook
    // ========================================

    /// Write catalogs whenever a document is saved through `registry`.
    ///
    /// # Panics
    ///
    /// If a handler is registered already.
    pub fn on_blend_save_handler_register(&self, registry: &Arc<SaveHandlerRegistry>) {
        let mut hook = self.lock_save_hook();
        assert!(
            hook.is_none(),
            "save handler registered twice for asset library at {:?}",
            self.root_path
        );

        let library = self.self_ref.clone();
        let handler = registry.add(Arc::new(move |document: &Document| {
            if let Some(library) = library.upgrade() {
                library.on_blend_save_post(document);
            }
        }));
        *hook = Some(SaveHookRegistration {
            registry: Arc::downgrade(registry),
            handler,
        });
    }

    /// Remove the save handler, if any.
    pub fn on_blend_save_handler_unregister(&self) {
        let Some(registration) = self.lock_save_hook().take() else {
            return;
        };
        if let Some(registry) = registration.registry.upgrade() {
            registry.remove(registration.handler);
        }
    }

    pub fn has_save_handler(&self) -> bool {
        self.lock_save_hook().is_some()
    }

    /// Called after `document` was written to disk.
    pub fn on_blend_save_post(&self, document: &Document) {
        if !Self::save_catalogs_when_file_is_saved() {
            return;
        }
        let document_path = document.filepath_str();
        if let Err(e) = self.catalog_service_mut().write_to_disk(&document_path) {
            warn!(
                "Failed to write catalogs of asset library {:?}: {}",
                self.root_path, e
            );
        }
    }

    fn lock_save_hook(&self) -> MutexGuard<'_, Option<SaveHookRegistration>> {
        self.save_hook.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================
    // Files
    // ========================================

    /// Document files below the library root, sorted.
    pub fn document_files(&self) -> Vec<PathBuf> {
        if self.root_path.is_empty() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&*self.root_path)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry in {:?}: {}", self.root_path, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .to_str()
                    .is_some_and(has_document_extension)
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }
}

fn remove_if_same(
    assets: &mut HashMap<String, Arc<AssetRepresentation>>,
    key: &str,
    asset: &AssetRepresentation,
) -> bool {
    let same = assets
        .get(key)
        .is_some_and(|existing| std::ptr::eq(Arc::as_ptr(existing), asset));
    if same {
        assets.remove(key);
    }
    same
}

impl Drop for AssetLibrary {
    fn drop(&mut self) {
        self.on_blend_save_handler_unregister();
        let storage = self
            .storage
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let in_use = storage
            .local_id_assets
            .values()
            .chain(storage.external_assets.values())
            .filter(|asset| Arc::strong_count(asset) > 1)
            .count();
        if in_use > 0 {
            warn!(
                "{} asset representations of {:?} outlive their library",
                in_use, self.root_path
            );
        }
        storage.local_id_assets.clear();
        storage.external_assets.clear();
        info!("Unloaded asset library {:?}", self.root_path);
    }
}

impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("library_type", &self.library_type)
            .field("name", &self.name)
            .field("root_path", &self.root_path)
            .finish_non_exhaustive()
    }
}
