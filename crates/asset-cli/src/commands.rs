//! Command implementations.

use anyhow::{anyhow, bail, Context, Result};
use asset_system::library::nul_terminated_str;
use asset_system::{
    AssetLibraryReference, AssetLibraryService, AssetLibraryType, AssetWeakReference,
    CustomAssetLibrary, Document, ImportMethod, Preferences, SaveHandlerRegistry,
    EXPLODE_BUFFER_SIZE,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Library service plus the document the commands run against.
pub struct Session {
    service: AssetLibraryService,
    document: Document,
    preferences_path: PathBuf,
}

impl Session {
    pub fn open(preferences_path: &Path, document_path: Option<&Path>) -> Result<Self> {
        let preferences = Preferences::load(preferences_path)
            .with_context(|| format!("Failed to load {}", preferences_path.display()))?;
        let document = match document_path {
            Some(path) => Document::with_filepath(path),
            None => Document::new(),
        };
        Ok(Self {
            service: AssetLibraryService::new(preferences, Arc::new(SaveHandlerRegistry::new())),
            document,
            preferences_path: preferences_path.to_path_buf(),
        })
    }

    pub fn close(self) {
        self.service.destroy();
    }

    pub fn libraries(&mut self) -> Result<()> {
        for reference in self.service.all_valid_asset_library_refs() {
            let root = match reference {
                AssetLibraryReference::Local => self
                    .service
                    .find_suitable_root_path_from_document(&self.document)
                    .unwrap_or_else(|| "(current file)".to_string()),
                _ => self
                    .service
                    .root_path_from_library_ref(reference)
                    .unwrap_or_default(),
            };
            let name = match reference {
                AssetLibraryReference::Custom { index } => self
                    .service
                    .preferences()
                    .custom_library(index)
                    .map(|custom| custom.name.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            };
            println!("{reference:<14} {name:<20} {root}");
        }
        Ok(())
    }

    pub fn add_library(&mut self, name: &str, dirpath: &Path, import_method: &str) -> Result<()> {
        let import_method: ImportMethod = serde_json::from_value(json!(import_method))
            .map_err(|_| anyhow!("Unknown import method {import_method:?}"))?;
        let dirpath = path_to_str(dirpath)?;

        let preferences = self.service.preferences_mut();
        if preferences.find_library_by_name(name).is_some() {
            bail!("A library named {name:?} exists already");
        }
        let index = preferences
            .add_library(CustomAssetLibrary::new(name, dirpath).with_import_method(import_method));
        preferences.save(&self.preferences_path)?;
        info!("Added custom library {:?} at index {}", name, index);
        Ok(())
    }

    pub fn catalogs(&mut self, library: &str) -> Result<()> {
        let reference = parse_library_reference(library)?;
        let library = self
            .service
            .get_asset_library(&self.document, reference)
            .ok_or_else(|| anyhow!("Library {reference} is not available"))?;

        let service = library.catalog_service();
        for catalog in service.catalogs() {
            println!("{}  {:<40} {}", catalog.catalog_id, catalog.path, catalog.simple_name);
        }
        Ok(())
    }

    pub fn add_catalog(&mut self, dirpath: &Path, path: &str) -> Result<()> {
        let dirpath = path_to_str(dirpath)?;
        let library = self.service.load_asset_library("", dirpath);
        let mut service = library.catalog_service_mut();
        let catalog_id = service.create_catalog(path)?.catalog_id;
        service.write_to_disk(&self.document.filepath_str())?;
        println!("{catalog_id}");
        Ok(())
    }

    pub fn files(&mut self, dirpath: &Path) -> Result<()> {
        let library = self.service.load_asset_library("", path_to_str(dirpath)?);
        for file in library.document_files() {
            println!("{}", file.display());
        }
        Ok(())
    }

    pub fn resolve(
        &mut self,
        library_type: &str,
        library: Option<String>,
        relative_path: &str,
        as_json: bool,
    ) -> Result<()> {
        let library_type: AssetLibraryType = serde_json::from_value(json!(library_type))
            .map_err(|_| anyhow!("Unknown library type {library_type:?}"))?;
        let reference = AssetWeakReference::new(library_type, library, relative_path);

        let full_path = self
            .service
            .resolve_asset_weak_reference_to_full_path(&reference)
            .ok_or_else(|| anyhow!("Cannot resolve {reference}"))?;

        let mut buffer = [0u8; EXPLODE_BUFFER_SIZE];
        let offsets = self
            .service
            .full_path_explode_into_buffer(&reference, &mut buffer)?;
        let component = |offset: Option<usize>| {
            offset.and_then(|offset| nul_terminated_str(&buffer, offset))
        };

        if as_json {
            let output = json!({
                "reference": reference,
                "fullPath": full_path,
                "dir": component(offsets.dir),
                "group": component(offsets.group),
                "name": component(offsets.name),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{full_path}");
            if let (Some(group), Some(name)) = (component(offsets.group), component(offsets.name)) {
                println!("  dir:   {}", component(offsets.dir).unwrap_or("(current file)"));
                println!("  group: {group}");
                println!("  name:  {name}");
            }
        }
        Ok(())
    }
}

fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", path.display()))
}

/// Parse `current-file`, `local`, `essentials`, `all` or `custom:<index>`.
fn parse_library_reference(value: &str) -> Result<AssetLibraryReference> {
    let reference = match value {
        "current-file" => AssetLibraryReference::CurrentFile,
        "local" => AssetLibraryReference::Local,
        "essentials" => AssetLibraryReference::Essentials,
        "all" => AssetLibraryReference::All,
        other => {
            let index = other
                .strip_prefix("custom:")
                .ok_or_else(|| anyhow!("Unknown library {other:?}"))?;
            AssetLibraryReference::Custom {
                index: index
                    .parse()
                    .with_context(|| format!("Invalid custom library index {index:?}"))?,
            }
        }
    };
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_library_reference() {
        assert_eq!(
            parse_library_reference("custom:3").unwrap(),
            AssetLibraryReference::Custom { index: 3 }
        );
        assert_eq!(
            parse_library_reference("all").unwrap(),
            AssetLibraryReference::All
        );
        assert!(parse_library_reference("custom:x").is_err());
        assert!(parse_library_reference("remote").is_err());
    }

    #[test]
    fn test_add_library_persists_preferences() {
        let temp_dir = TempDir::new().unwrap();
        let prefs_path = temp_dir.path().join("prefs.json");

        let mut session = Session::open(&prefs_path, None).unwrap();
        session
            .add_library("Studio", temp_dir.path(), "link")
            .unwrap();
        assert!(session.add_library("Studio", temp_dir.path(), "link").is_err());
        session.close();

        let prefs = Preferences::load(&prefs_path).unwrap();
        let library = prefs.find_library_by_name("Studio").unwrap();
        assert_eq!(library.import_method, ImportMethod::Link);
    }

    #[test]
    fn test_add_catalog_writes_definition_file() {
        let temp_dir = TempDir::new().unwrap();
        let prefs_path = temp_dir.path().join("prefs.json");
        let library_dir = temp_dir.path().join("lib");
        std::fs::create_dir_all(&library_dir).unwrap();

        let mut session = Session::open(&prefs_path, None).unwrap();
        session.add_catalog(&library_dir, "props/chairs").unwrap();
        session.close();

        let root = format!("{}/", library_dir.to_str().unwrap());
        assert!(asset_system::catalog::definition_file_path(&root).exists());
    }

    #[test]
    fn test_resolve_rejects_unknown_type() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = Session::open(&temp_dir.path().join("prefs.json"), None).unwrap();
        assert!(session
            .resolve("remote", None, "x.blend/Object/Cube", false)
            .is_err());
    }
}
