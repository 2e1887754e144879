//! Registry of loaded asset libraries.

use crate::catalog::AssetCatalogService;
use crate::config::PathsConfig;
use crate::document::{Document, IdRemapper, SaveHandlerRegistry};
use crate::error::Result;
use crate::library::{
    AssetLibrary, AssetLibraryReference, AssetLibraryType, AssetWeakReference, ExplodedOffsets,
    ExplodedPath, ImportSettings,
};
use crate::platform::{normalize_directory_path, normalize_path, split_dir_part};
use crate::preferences::{ImportMethod, Preferences};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Size of a buffer that fits any exploded path.
pub const EXPLODE_BUFFER_SIZE: usize = PathsConfig::FILE_MAX_LIBEXTRA;

/// Owns every loaded asset library.
///
/// On-disk libraries are cached by normalized root path, so asking twice for
/// the same directory yields the same [`AssetLibrary`]. The in-memory
/// library of the current file and the aggregate "all" library are kept
/// separately. Create one per application session and call
/// [`Self::destroy`] when done.
#[derive(Debug)]
pub struct AssetLibraryService {
    preferences: Preferences,
    save_handlers: Arc<SaveHandlerRegistry>,
    on_disk_libraries: HashMap<String, Arc<AssetLibrary>>,
    current_file_library: Option<Arc<AssetLibrary>>,
    all_library: Option<Arc<AssetLibrary>>,
    /// Every library except "all", in the order it was loaded.
    load_order: Vec<Arc<AssetLibrary>>,
}

impl AssetLibraryService {
    pub fn new(preferences: Preferences, save_handlers: Arc<SaveHandlerRegistry>) -> Self {
        info!(
            "Asset library service started with {} custom libraries",
            preferences.asset_libraries.len()
        );
        Self {
            preferences,
            save_handlers,
            on_disk_libraries: HashMap::new(),
            current_file_library: None,
            all_library: None,
            load_order: Vec::new(),
        }
    }

    /// Unload every library and unregister their save handlers.
    ///
    /// Libraries still referenced elsewhere stay alive but no longer react to
    /// document saves.
    pub fn destroy(self) {
        self.foreach_loaded_asset_library(
            |library| library.on_blend_save_handler_unregister(),
            true,
        );
        info!(
            "Asset library service destroyed ({} libraries)",
            self.load_order.len()
        );
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Mutable access to the preferences. Already loaded libraries are not
    /// affected until they're requested again.
    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn save_handlers(&self) -> &Arc<SaveHandlerRegistry> {
        &self.save_handlers
    }

    // ========================================
    // Getting libraries
    // ========================================

    /// Get (loading on first use) the library `reference` points at.
    ///
    /// `document` is the open document; it decides what "local" means.
    /// Returns `None` for references that don't resolve to any library, such
    /// as a custom index without a configured directory.
    pub fn get_asset_library(
        &mut self,
        document: &Document,
        reference: AssetLibraryReference,
    ) -> Option<Arc<AssetLibrary>> {
        match reference {
            AssetLibraryReference::CurrentFile => Some(self.get_asset_library_current_file()),
            AssetLibraryReference::Local => {
                match self.find_suitable_root_path_from_document(document) {
                    Some(root_path) => Some(self.get_asset_library_on_disk_builtin(
                        AssetLibraryType::Local,
                        &root_path,
                    )),
                    None => Some(self.get_asset_library_current_file()),
                }
            }
            AssetLibraryReference::Essentials => {
                let root_path = self.preferences.essentials_directory()?.to_string();
                let library =
                    self.get_asset_library_on_disk_builtin(AssetLibraryType::Essentials, &root_path);
                library.set_import_settings(ImportSettings {
                    import_method: Some(ImportMethod::AppendReuse),
                    ..ImportSettings::default()
                });
                Some(library)
            }
            AssetLibraryReference::Custom { index } => {
                let custom = self.preferences.custom_library(index)?.clone();
                if custom.dirpath.is_empty() {
                    debug!("Custom asset library {:?} has no directory", custom.name);
                    return None;
                }
                let library = self.get_asset_library_on_disk_custom(&custom.name, &custom.dirpath);
                library.set_import_settings(ImportSettings {
                    import_method: Some(custom.import_method),
                    may_override_import_method: true,
                    use_relative_path: custom.use_relative_path,
                });
                Some(library)
            }
            AssetLibraryReference::All => Some(self.get_asset_library_all(document)),
        }
    }

    /// Get the library at `dirpath`, or the current-file library when
    /// `dirpath` is empty.
    pub fn load_asset_library(&mut self, name: &str, dirpath: &str) -> Arc<AssetLibrary> {
        if dirpath.is_empty() {
            return self.get_asset_library_current_file();
        }
        self.get_asset_library_on_disk_custom(name, dirpath)
    }

    /// Get the custom library rooted at `dirpath`, loading it on first use.
    pub fn get_asset_library_on_disk_custom(
        &mut self,
        name: &str,
        dirpath: &str,
    ) -> Arc<AssetLibrary> {
        self.get_asset_library_on_disk(AssetLibraryType::Custom, name, dirpath)
    }

    /// Get a builtin (unnamed) library rooted at `dirpath`.
    pub fn get_asset_library_on_disk_builtin(
        &mut self,
        library_type: AssetLibraryType,
        dirpath: &str,
    ) -> Arc<AssetLibrary> {
        debug_assert!(
            matches!(
                library_type,
                AssetLibraryType::Local | AssetLibraryType::Essentials
            ),
            "{library_type} is not a builtin on-disk library type"
        );
        self.get_asset_library_on_disk(library_type, "", dirpath)
    }

    fn get_asset_library_on_disk(
        &mut self,
        library_type: AssetLibraryType,
        name: &str,
        dirpath: &str,
    ) -> Arc<AssetLibrary> {
        debug_assert!(!dirpath.is_empty(), "on-disk library without directory");
        let root_path = normalize_directory_path(dirpath);

        if let Some(library) = self.on_disk_libraries.get(&root_path) {
            debug!("Asset library {:?} (cached)", root_path);
            let library = Arc::clone(library);
            if library.reload_catalogs_if_dirty() {
                self.tag_all_library_catalogs_dirty();
            }
            return library;
        }

        let library = AssetLibrary::new(library_type, name, &root_path);
        library.on_blend_save_handler_register(&self.save_handlers);
        library.load_catalogs();
        info!("Loaded {} asset library {:?}", library_type, root_path);

        self.on_disk_libraries
            .insert(root_path, Arc::clone(&library));
        self.load_order.push(Arc::clone(&library));
        self.tag_all_library_catalogs_dirty();
        library
    }

    /// The in-memory library of the current file, created on first use.
    ///
    /// Its catalogs are written next to the document when it's saved.
    pub fn get_asset_library_current_file(&mut self) -> Arc<AssetLibrary> {
        if let Some(library) = &self.current_file_library {
            return Arc::clone(library);
        }

        let library = AssetLibrary::new(AssetLibraryType::Local, "", "");
        library.on_blend_save_handler_register(&self.save_handlers);
        info!("Created current file asset library");
        self.current_file_library = Some(Arc::clone(&library));
        self.load_order.push(Arc::clone(&library));
        self.tag_all_library_catalogs_dirty();
        library
    }

    /// The "all" library, after loading every valid library it aggregates.
    ///
    /// Its catalogs are a read-only merge of every loaded library's
    /// catalogs, rebuilt whenever one of them changed.
    pub fn get_asset_library_all(&mut self, document: &Document) -> Arc<AssetLibrary> {
        for reference in self.all_valid_asset_library_refs() {
            self.get_asset_library(document, reference);
        }

        let all = match &self.all_library {
            Some(all) => Arc::clone(all),
            None => {
                let all = AssetLibrary::new(AssetLibraryType::All, "", "");
                all.tag_catalogs_dirty();
                info!("Created all asset library");
                self.all_library = Some(Arc::clone(&all));
                all
            }
        };

        if all.is_catalogs_dirty() {
            self.rebuild_all_library_catalogs(&all);
        }
        all
    }

    fn rebuild_all_library_catalogs(&self, all: &AssetLibrary) {
        let mut merged = AssetCatalogService::new_read_only();
        for library in &self.load_order {
            merged.add_from_existing(&library.catalog_service());
        }
        debug!("Rebuilt all library catalogs ({} catalogs)", merged.len());
        all.replace_catalog_service(merged);
        all.untag_catalogs_dirty();
    }

    fn tag_all_library_catalogs_dirty(&self) {
        if let Some(all) = &self.all_library {
            all.tag_catalogs_dirty();
        }
    }

    // ========================================
    // Weak reference resolution
    // ========================================

    /// Directory of the library `reference` points into, normalized with a
    /// trailing separator. Empty for the current file.
    pub fn resolve_asset_weak_reference_to_library_path(
        &self,
        reference: &AssetWeakReference,
    ) -> Option<String> {
        let library_dirpath = match reference.asset_library_type {
            AssetLibraryType::Local => {
                return Some(match reference.asset_library_identifier.as_deref() {
                    Some(root) if !root.is_empty() => normalize_directory_path(root),
                    _ => String::new(),
                });
            }
            AssetLibraryType::All => return None,
            AssetLibraryType::Essentials => {
                self.preferences.essentials_directory()?.to_string()
            }
            AssetLibraryType::Custom => {
                let name = reference.asset_library_identifier.as_deref()?;
                match self.preferences.find_library_by_name(name) {
                    Some(custom) => custom.dirpath.clone(),
                    // Libraries loaded from arbitrary paths aren't in the
                    // preferences but can still be referenced.
                    None => self
                        .find_loaded_on_disk_asset_library_from_name(name)?
                        .root_path()
                        .to_string(),
                }
            }
        };
        if library_dirpath.is_empty() {
            return None;
        }
        Some(normalize_directory_path(&library_dirpath))
    }

    /// Full path of the asset `reference` points at.
    pub fn resolve_asset_weak_reference_to_full_path(
        &self,
        reference: &AssetWeakReference,
    ) -> Option<String> {
        if reference.relative_asset_identifier.is_empty() {
            return None;
        }
        let library_path = self.resolve_asset_weak_reference_to_library_path(reference)?;
        Some(normalize_path(&format!(
            "{library_path}{}",
            reference.relative_asset_identifier
        )))
    }

    /// Full path of the asset `reference` points at, split into the
    /// document file, group and name.
    pub fn resolve_asset_weak_reference_to_exploded_path(
        &self,
        reference: &AssetWeakReference,
    ) -> Option<ExplodedPath> {
        if reference.relative_asset_identifier.is_empty() {
            return None;
        }
        match reference.asset_library_type {
            AssetLibraryType::Local => {
                // Assets of a rooted local library may live in other files
                // below the root; everything else is in the current file.
                let full_path = self.resolve_asset_weak_reference_to_full_path(reference)?;
                ExplodedPath::from_library_path(&full_path).or_else(|| {
                    let path_in_file = normalize_path(&reference.relative_asset_identifier);
                    ExplodedPath::from_path_in_file(&path_in_file)
                })
            }
            AssetLibraryType::Custom | AssetLibraryType::Essentials => {
                let full_path = self.resolve_asset_weak_reference_to_full_path(reference)?;
                ExplodedPath::from_library_path(&full_path)
            }
            AssetLibraryType::All => None,
        }
    }

    /// Write the exploded full path of `reference` into `buffer` as
    /// NUL-terminated components, typically a `[u8; FILE_MAX_LIBEXTRA]`.
    ///
    /// Unresolvable references leave an empty string and no offsets.
    pub fn full_path_explode_into_buffer(
        &self,
        reference: &AssetWeakReference,
        buffer: &mut [u8],
    ) -> Result<ExplodedOffsets> {
        match self.resolve_asset_weak_reference_to_exploded_path(reference) {
            Some(exploded) => exploded.write_into(buffer),
            None => {
                if let Some(first) = buffer.first_mut() {
                    *first = 0;
                }
                Ok(ExplodedOffsets::default())
            }
        }
    }

    fn find_loaded_on_disk_asset_library_from_name(&self, name: &str) -> Option<&AssetLibrary> {
        self.on_disk_libraries
            .values()
            .find(|library| library.name() == name)
            .map(|library| library.as_ref())
    }

    // ========================================
    // Operations on all loaded libraries
    // ========================================

    /// Call `f` for every loaded library in load order, preceded by the
    /// "all" library if `include_all_library` is set.
    pub fn foreach_loaded_asset_library<F>(&self, mut f: F, include_all_library: bool)
    where
        F: FnMut(&AssetLibrary),
    {
        if include_all_library {
            if let Some(all) = &self.all_library {
                f(all);
            }
        }
        for library in &self.load_order {
            f(library);
        }
    }

    pub fn loaded_library_count(&self) -> usize {
        self.load_order.len()
    }

    pub fn has_any_unsaved_catalogs(&self) -> bool {
        let mut unsaved = false;
        self.foreach_loaded_asset_library(
            |library| unsaved |= library.catalog_service().has_unsaved_changes(),
            true,
        );
        unsaved
    }

    /// Reload the catalogs of libraries whose definition file changed on
    /// disk. Returns how many were reloaded.
    pub fn reload_all_library_catalogs_if_dirty(&self) -> usize {
        let reloaded = self
            .load_order
            .iter()
            .filter(|library| library.reload_catalogs_if_dirty())
            .count();
        if reloaded > 0 {
            info!("Reloaded catalogs of {} asset libraries", reloaded);
            self.tag_all_library_catalogs_dirty();
        }
        reloaded
    }

    /// Let local ID assets of every library follow `remapper`.
    pub fn remap_ids(&self, remapper: &IdRemapper) -> usize {
        let mut removed = 0;
        self.foreach_loaded_asset_library(
            |library| removed += library.remap_ids_and_remove_invalid(remapper),
            true,
        );
        removed
    }

    // ========================================
    // Library references and root paths
    // ========================================

    /// Root directory of the library `reference` names in the preferences.
    /// `None` for libraries without a fixed directory.
    pub fn root_path_from_library_ref(&self, reference: AssetLibraryReference) -> Option<String> {
        match reference {
            AssetLibraryReference::Essentials => {
                self.preferences.essentials_directory().map(str::to_string)
            }
            AssetLibraryReference::Custom { index } => self
                .preferences
                .custom_library(index)
                .map(|custom| custom.dirpath.clone())
                .filter(|dirpath| !dirpath.is_empty()),
            AssetLibraryReference::CurrentFile
            | AssetLibraryReference::Local
            | AssetLibraryReference::All => None,
        }
    }

    /// Root to use for a library containing `input_path`: the custom library
    /// whose directory contains it, else the path's own directory.
    pub fn find_suitable_root_path_from_path(&self, input_path: &str) -> String {
        if let Some(custom) = self.preferences.library_containing_path(input_path) {
            return custom.dirpath.clone();
        }
        split_dir_part(&normalize_path(input_path))
    }

    /// Root to use for the local library of `document`. `None` while the
    /// document was never saved.
    pub fn find_suitable_root_path_from_document(&self, document: &Document) -> Option<String> {
        if !document.is_saved() {
            return None;
        }
        Some(self.find_suitable_root_path_from_path(&document.filepath_str()))
    }

    /// Every reference that currently points at a usable library: the
    /// essentials, each custom library whose directory exists, and the
    /// local library.
    pub fn all_valid_asset_library_refs(&self) -> Vec<AssetLibraryReference> {
        let mut refs = Vec::new();
        if self.preferences.essentials_directory().is_some() {
            refs.push(AssetLibraryReference::Essentials);
        }
        for (index, custom) in self.preferences.asset_libraries.iter().enumerate() {
            if !custom.dirpath.is_empty() && Path::new(&custom.dirpath).is_dir() {
                refs.push(AssetLibraryReference::Custom { index });
            }
        }
        refs.push(AssetLibraryReference::Local);
        refs
    }

    pub fn all_library_reference() -> AssetLibraryReference {
        AssetLibraryReference::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{definition_file_path, write_definition_file, AssetCatalog};
    use crate::document::IdType;
    use crate::library::nul_terminated_str;
    use crate::metadata::AssetMetaData;
    use crate::preferences::CustomAssetLibrary;
    use std::fs;
    use tempfile::TempDir;

    fn service_with(preferences: Preferences) -> AssetLibraryService {
        AssetLibraryService::new(preferences, Arc::new(SaveHandlerRegistry::new()))
    }

    fn dir_str(temp_dir: &TempDir) -> String {
        temp_dir.path().to_str().unwrap().to_string()
    }

    #[test]
    fn test_same_directory_gives_same_library() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());

        let a = service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        let b = service.get_asset_library_on_disk_custom("A", &format!("{}//", dir_str(&temp_dir)));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(service.loaded_library_count(), 1);
    }

    #[test]
    fn test_on_disk_library_registers_save_handler() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        let library = service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        assert!(library.has_save_handler());
        assert_eq!(service.save_handlers().len(), 1);
    }

    #[test]
    fn test_load_asset_library_empty_path_is_current_file() {
        let mut service = service_with(Preferences::new());
        let library = service.load_asset_library("ignored", "");
        let current = service.get_asset_library_current_file();
        assert!(Arc::ptr_eq(&library, &current));
        assert_eq!(library.root_path(), "");
        assert_eq!(library.library_type(), AssetLibraryType::Local);
    }

    #[test]
    fn test_local_reference_follows_document_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());

        let unsaved = Document::new();
        let library = service
            .get_asset_library(&unsaved, AssetLibraryReference::Local)
            .unwrap();
        assert_eq!(library.root_path(), "");

        let saved = Document::with_filepath(temp_dir.path().join("scene.blend"));
        let library = service
            .get_asset_library(&saved, AssetLibraryReference::Local)
            .unwrap();
        assert_eq!(
            library.root_path(),
            normalize_directory_path(&dir_str(&temp_dir))
        );
    }

    #[test]
    fn test_custom_reference_applies_import_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut prefs = Preferences::new();
        prefs.add_library(
            CustomAssetLibrary::new("Studio", dir_str(&temp_dir))
                .with_import_method(ImportMethod::Link),
        );
        let mut service = service_with(prefs);

        let library = service
            .get_asset_library(&Document::new(), AssetLibraryReference::Custom { index: 0 })
            .unwrap();
        assert_eq!(library.name(), "Studio");
        let settings = library.import_settings();
        assert_eq!(settings.import_method, Some(ImportMethod::Link));
        assert!(settings.may_override_import_method);
    }

    #[test]
    fn test_unresolvable_references_give_none() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Empty", ""));
        let mut service = service_with(prefs);
        let document = Document::new();

        assert!(service
            .get_asset_library(&document, AssetLibraryReference::Custom { index: 0 })
            .is_none());
        assert!(service
            .get_asset_library(&document, AssetLibraryReference::Custom { index: 7 })
            .is_none());
        assert!(service
            .get_asset_library(&document, AssetLibraryReference::Essentials)
            .is_none());
    }

    #[test]
    fn test_all_library_merges_catalogs() {
        let lib_a = TempDir::new().unwrap();
        let lib_b = TempDir::new().unwrap();
        write_definition_file(
            &definition_file_path(&normalize_directory_path(&dir_str(&lib_a))),
            [AssetCatalog::from_path("props".into())].iter(),
        )
        .unwrap();
        write_definition_file(
            &definition_file_path(&normalize_directory_path(&dir_str(&lib_b))),
            [
                AssetCatalog::from_path("characters".into()),
                AssetCatalog::from_path("characters/heroes".into()),
            ]
            .iter(),
        )
        .unwrap();

        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("A", dir_str(&lib_a)));
        prefs.add_library(CustomAssetLibrary::new("B", dir_str(&lib_b)));
        let mut service = service_with(prefs);

        let all = service
            .get_asset_library(&Document::new(), AssetLibraryReference::All)
            .unwrap();
        assert_eq!(all.library_type(), AssetLibraryType::All);
        assert_eq!(all.catalog_service().len(), 3);
        assert!(all.catalog_service().is_read_only());
        assert!(!all.is_catalogs_dirty());
    }

    #[test]
    fn test_foreach_visits_all_library_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        service.get_asset_library_current_file();
        service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        service.get_asset_library_all(&Document::new());

        let mut visited = Vec::new();
        service.foreach_loaded_asset_library(|library| visited.push(library.library_type()), true);
        assert_eq!(
            visited,
            vec![
                AssetLibraryType::All,
                AssetLibraryType::Local,
                AssetLibraryType::Custom
            ]
        );

        let mut count = 0;
        service.foreach_loaded_asset_library(|_| count += 1, false);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_has_any_unsaved_catalogs() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        let library = service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        assert!(!service.has_any_unsaved_catalogs());

        library.catalog_service_mut().create_catalog("props").unwrap();
        assert!(service.has_any_unsaved_catalogs());
    }

    #[test]
    fn test_reload_all_tags_all_library_dirty() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        let library = service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        let all = service.get_asset_library_all(&Document::new());
        assert!(!all.is_catalogs_dirty());
        assert_eq!(service.reload_all_library_catalogs_if_dirty(), 0);

        write_definition_file(
            &definition_file_path(library.root_path()),
            [AssetCatalog::from_path("new".into())].iter(),
        )
        .unwrap();
        assert_eq!(service.reload_all_library_catalogs_if_dirty(), 1);
        assert!(all.is_catalogs_dirty());
        assert_eq!(library.catalog_service().len(), 1);
    }

    #[test]
    fn test_remap_ids_reaches_every_library() {
        let mut document = Document::new();
        let id = document.add_id(IdType::Object, "Chair");
        let mut service = service_with(Preferences::new());
        let library = service.get_asset_library_current_file();
        library.add_local_id_asset(&id.relative_asset_path(), &id);

        let mut remapper = IdRemapper::new();
        remapper.add_unassign(&id);
        assert_eq!(service.remap_ids(&remapper), 1);
        assert_eq!(library.asset_count(), 0);
    }

    #[test]
    fn test_resolve_custom_reference() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Studio", "/mnt/studio/assets"));
        let service = service_with(prefs);

        let reference = AssetWeakReference::new(
            AssetLibraryType::Custom,
            Some("Studio".to_string()),
            "props/chairs.blend/Object/Chair",
        );
        assert_eq!(
            service
                .resolve_asset_weak_reference_to_library_path(&reference)
                .as_deref(),
            Some("/mnt/studio/assets/")
        );
        assert_eq!(
            service
                .resolve_asset_weak_reference_to_full_path(&reference)
                .as_deref(),
            Some("/mnt/studio/assets/props/chairs.blend/Object/Chair")
        );

        let exploded = service
            .resolve_asset_weak_reference_to_exploded_path(&reference)
            .unwrap();
        assert_eq!(exploded.dir(), Some("/mnt/studio/assets/props/chairs.blend"));
        assert_eq!(exploded.group(), "Object");
        assert_eq!(exploded.name(), "Chair");
    }

    #[test]
    fn test_resolve_custom_reference_to_loaded_library() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        let library = service.get_asset_library_on_disk_custom("Adhoc", &dir_str(&temp_dir));

        let reference =
            AssetWeakReference::new(AssetLibraryType::Custom, Some("Adhoc".to_string()), "x.blend/Mesh/Cube");
        assert_eq!(
            service.resolve_asset_weak_reference_to_library_path(&reference),
            Some(library.root_path().to_string())
        );
    }

    #[test]
    fn test_resolve_unknown_references() {
        let service = service_with(Preferences::new());
        let unknown = AssetWeakReference::new(
            AssetLibraryType::Custom,
            Some("Nope".to_string()),
            "x.blend/Mesh/Cube",
        );
        assert!(service.resolve_asset_weak_reference_to_full_path(&unknown).is_none());

        let essentials =
            AssetWeakReference::new(AssetLibraryType::Essentials, None, "x.blend/Mesh/Cube");
        assert!(service.resolve_asset_weak_reference_to_full_path(&essentials).is_none());

        let empty = AssetWeakReference::new(AssetLibraryType::Local, None, "");
        assert!(service.resolve_asset_weak_reference_to_full_path(&empty).is_none());
        assert!(service.resolve_asset_weak_reference_to_exploded_path(&empty).is_none());
    }

    #[test]
    fn test_resolve_local_reference() {
        let service = service_with(Preferences::new());
        let reference = AssetWeakReference::new(AssetLibraryType::Local, None, "Material//Steel");

        assert_eq!(
            service
                .resolve_asset_weak_reference_to_full_path(&reference)
                .as_deref(),
            Some("Material/Steel")
        );
        let exploded = service
            .resolve_asset_weak_reference_to_exploded_path(&reference)
            .unwrap();
        assert_eq!(exploded.dir(), None);
        assert_eq!(exploded.group(), "Material");
        assert_eq!(exploded.name(), "Steel");
    }

    #[test]
    fn test_explode_into_buffer() {
        let mut prefs = Preferences::new();
        prefs.essentials_directory = Some("/opt/app/essentials".to_string());
        let service = service_with(prefs);
        let reference = AssetWeakReference::new(
            AssetLibraryType::Essentials,
            None,
            "brushes.blend/Brush/Smooth",
        );

        let mut buffer = [0u8; EXPLODE_BUFFER_SIZE];
        let offsets = service
            .full_path_explode_into_buffer(&reference, &mut buffer)
            .unwrap();
        assert_eq!(
            nul_terminated_str(&buffer, offsets.dir.unwrap()),
            Some("/opt/app/essentials/brushes.blend")
        );
        assert_eq!(nul_terminated_str(&buffer, offsets.group.unwrap()), Some("Brush"));
        assert_eq!(nul_terminated_str(&buffer, offsets.name.unwrap()), Some("Smooth"));
    }

    #[test]
    fn test_explode_unresolvable_into_buffer() {
        let service = service_with(Preferences::new());
        let reference = AssetWeakReference::new(AssetLibraryType::All, None, "x.blend/Mesh/Cube");
        let mut buffer = [b'x'; 16];
        let offsets = service
            .full_path_explode_into_buffer(&reference, &mut buffer)
            .unwrap();
        assert_eq!(offsets, ExplodedOffsets::default());
        assert_eq!(nul_terminated_str(&buffer, 0), Some(""));
    }

    #[test]
    fn test_weak_reference_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Studio", dir_str(&temp_dir)));
        let mut service = service_with(prefs);
        let library = service
            .get_asset_library(&Document::new(), AssetLibraryReference::Custom { index: 0 })
            .unwrap();

        let asset = library
            .add_external_asset(
                "props/chairs.blend/Object/Chair",
                "Chair",
                IdType::Object,
                AssetMetaData::new(),
            )
            .upgrade()
            .unwrap();
        let reference = asset.make_weak_reference().unwrap();
        assert_eq!(
            service.resolve_asset_weak_reference_to_full_path(&reference),
            Some(asset.full_path())
        );
    }

    #[test]
    fn test_weak_reference_round_trip_local_library() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = service_with(Preferences::new());
        let mut document = Document::with_filepath(temp_dir.path().join("scene.blend"));
        let id = document.add_id(IdType::Object, "Chair");
        let library = service
            .get_asset_library(&document, AssetLibraryReference::Local)
            .unwrap();
        assert_eq!(library.library_type(), AssetLibraryType::Local);

        let local = library
            .add_local_id_asset(&id.relative_asset_path(), &id)
            .upgrade()
            .unwrap();
        let external = library
            .add_external_asset(
                "props.blend/Object/Table",
                "Table",
                IdType::Object,
                AssetMetaData::new(),
            )
            .upgrade()
            .unwrap();

        for asset in [&local, &external] {
            let reference = asset.make_weak_reference().unwrap();
            assert_eq!(
                reference.asset_library_identifier.as_deref(),
                Some(library.root_path())
            );
            assert_eq!(
                service.resolve_asset_weak_reference_to_full_path(&reference),
                Some(asset.full_path())
            );
        }

        let reference = external.make_weak_reference().unwrap();
        let exploded = service
            .resolve_asset_weak_reference_to_exploded_path(&reference)
            .unwrap();
        assert_eq!(
            exploded.dir().map(str::to_string),
            Some(format!("{}props.blend", library.root_path()))
        );
        assert_eq!(exploded.name(), "Table");

        let reference = local.make_weak_reference().unwrap();
        let exploded = service
            .resolve_asset_weak_reference_to_exploded_path(&reference)
            .unwrap();
        assert_eq!(exploded.dir(), None);
        assert_eq!(exploded.group(), "Object");
        assert_eq!(exploded.name(), "Chair");
    }

    #[test]
    fn test_full_path_normalizes_parent_segments() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Studio", "/mnt/studio/assets"));
        let service = service_with(prefs);
        let reference = AssetWeakReference::new(
            AssetLibraryType::Custom,
            Some("Studio".to_string()),
            "../shared/other.blend/Object/A",
        );

        assert_eq!(
            service
                .resolve_asset_weak_reference_to_full_path(&reference)
                .as_deref(),
            Some("/mnt/studio/shared/other.blend/Object/A")
        );
        let exploded = service
            .resolve_asset_weak_reference_to_exploded_path(&reference)
            .unwrap();
        assert_eq!(exploded.dir(), Some("/mnt/studio/shared/other.blend"));
    }

    #[test]
    fn test_current_file_catalogs_written_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Arc::new(SaveHandlerRegistry::new());
        let mut service = AssetLibraryService::new(Preferences::new(), Arc::clone(&registry));
        let library = service.get_asset_library_current_file();
        assert!(library.has_save_handler());
        assert_eq!(registry.len(), 1);

        library.catalog_service_mut().create_catalog("props").unwrap();
        registry.notify_save_post(&Document::with_filepath(temp_dir.path().join("scene.blend")));

        let document_dir = normalize_directory_path(&dir_str(&temp_dir));
        assert!(definition_file_path(&document_dir).exists());
        assert!(!service.has_any_unsaved_catalogs());

        service.destroy();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_root_path_helpers() {
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Studio", "/mnt/studio"));
        let service = service_with(prefs);

        assert_eq!(
            service.root_path_from_library_ref(AssetLibraryReference::Custom { index: 0 }),
            Some("/mnt/studio".to_string())
        );
        assert_eq!(service.root_path_from_library_ref(AssetLibraryReference::Local), None);
        assert_eq!(
            service.find_suitable_root_path_from_path("/mnt/studio/props/chair.blend"),
            "/mnt/studio"
        );
        assert_eq!(
            service.find_suitable_root_path_from_path("/home/me/scene.blend"),
            "/home/me/"
        );
        assert_eq!(
            service.find_suitable_root_path_from_document(&Document::new()),
            None
        );
    }

    #[test]
    fn test_all_valid_refs_skip_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let mut prefs = Preferences::new();
        prefs.add_library(CustomAssetLibrary::new("Missing", "/definitely/not/here"));
        prefs.add_library(CustomAssetLibrary::new("Present", dir_str(&temp_dir)));
        let service = service_with(prefs);

        assert_eq!(
            service.all_valid_asset_library_refs(),
            vec![
                AssetLibraryReference::Custom { index: 1 },
                AssetLibraryReference::Local
            ]
        );
        assert_eq!(
            AssetLibraryService::all_library_reference(),
            AssetLibraryReference::All
        );
    }

    #[test]
    fn test_destroy_unregisters_save_handlers() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        let registry = Arc::new(SaveHandlerRegistry::new());
        let mut service = AssetLibraryService::new(Preferences::new(), Arc::clone(&registry));
        let kept = service.get_asset_library_on_disk_custom("A", &dir_str(&temp_dir));
        service.get_asset_library_on_disk_custom(
            "B",
            temp_dir.path().join("b").to_str().unwrap(),
        );
        assert_eq!(registry.len(), 2);

        service.destroy();
        assert!(registry.is_empty());
        assert!(!kept.has_save_handler());
    }
}
