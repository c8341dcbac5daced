// Finding and reading asset files under an asset root
//
// Layout: <root>/atlases/*.json, <root>/battles/*.json, <root>/programs/*.json

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::atlas::{AtlasManifest, SpriteAtlas};
use super::AssetError;

/// Every asset is JSON
const ASSET_EXTENSION: &str = "json";

/// Kinds of asset stored under the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    /// Sprite atlas manifests
    Atlas,
    /// Recorded battle timelines
    Battle,
    /// Visual-editor battle programs
    Program,
}

impl AssetType {
    pub fn default_directory(&self) -> &'static str {
        match self {
            AssetType::Atlas => "atlases",
            AssetType::Battle => "battles",
            AssetType::Program => "programs",
        }
    }
}

/// Reads asset files relative to a root directory
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Path of a named asset; `.json` is added when the name has no extension
    pub fn resolve_path(&self, asset_type: AssetType, name: &str) -> PathBuf {
        let mut path = self
            .base_path
            .join(asset_type.default_directory())
            .join(name);
        if path.extension().is_none() {
            path.set_extension(ASSET_EXTENSION);
        }
        path
    }

    /// Read an asset as UTF-8 text
    pub fn load_string(&self, asset_type: AssetType, name: &str) -> Result<String> {
        let path = self.resolve_path(asset_type, name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.display().to_string()).into())
            }
            Err(e) => Err(AssetError::Io(e))
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Read and parse an atlas manifest
    pub fn load_atlas(&self, name: &str) -> Result<SpriteAtlas> {
        let text = self.load_string(AssetType::Atlas, name)?;
        let manifest: AtlasManifest = serde_json::from_str(&text)
            .map_err(AssetError::Parse)
            .with_context(|| format!("Bad atlas manifest {}", name))?;
        Ok(SpriteAtlas::from(manifest))
    }

    pub fn exists(&self, asset_type: AssetType, name: &str) -> bool {
        self.resolve_path(asset_type, name).is_file()
    }

    /// File names of every asset of a type, sorted. A missing directory is empty.
    pub fn list_assets(&self, asset_type: AssetType) -> Result<Vec<String>> {
        let dir = self.base_path.join(asset_type.default_directory());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_asset = path.is_file()
                && path.extension().is_some_and(|ext| ext == ASSET_EXTENSION);
            if !is_asset {
                continue;
            }
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
        }

        names.sort();
        Ok(names)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
