// Central sprite asset registry

use super::atlas::{AtlasAnimation, SpriteAtlas};
use super::{AssetError, AssetHandle, AssetId, AssetLoader, AssetType, AtlasHandle};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Animations resolved from an atlas, ready to build a character from
#[derive(Debug, Clone)]
pub struct ResolvedAnimations {
    pub atlas: AtlasHandle,
    pub atlas_name: String,
    pub animations: HashMap<String, AtlasAnimation>,
}

impl ResolvedAnimations {
    pub fn get(&self, name: &str) -> Option<&AtlasAnimation> {
        self.animations.get(name)
    }
}

/// Central asset manager
///
/// Holds sprite atlases by name and hands out resolved animation sets.
pub struct AssetManager {
    /// Asset loader
    loader: AssetLoader,

    /// Registered atlases, indexed by slot
    atlases: Vec<SpriteAtlas>,

    /// Atlas name to slot
    atlas_names: HashMap<String, AtlasHandle>,
}

impl AssetManager {
    /// Create a new asset manager
    pub fn new<P: AsRef<Path>>(asset_path: P) -> Self {
        Self {
            loader: AssetLoader::new(asset_path),
            atlases: Vec::new(),
            atlas_names: HashMap::new(),
        }
    }

    /// Register an atlas built in memory
    pub fn add_atlas(&mut self, atlas: SpriteAtlas) -> Result<AtlasHandle, AssetError> {
        if self.atlas_names.contains_key(&atlas.name) {
            return Err(AssetError::AlreadyLoaded(atlas.name));
        }

        let missing = atlas.missing_frames();
        if !missing.is_empty() {
            log::warn!(
                "Atlas '{}' references frames with no region: {}",
                atlas.name,
                missing.join(", ")
            );
        }

        let handle = AssetHandle::new(AssetId::from_slot(self.atlases.len()));
        log::debug!("Registered atlas '{}' in slot {}", atlas.name, handle.id());
        self.atlas_names.insert(atlas.name.clone(), handle);
        self.atlases.push(atlas);
        Ok(handle)
    }

    /// Load an atlas manifest from disk (cached by file name)
    pub fn load_atlas(&mut self, file_name: &str) -> Result<AtlasHandle> {
        let atlas = self.loader.load_atlas(file_name)?;
        if let Some(&handle) = self.atlas_names.get(&atlas.name) {
            log::debug!("Atlas '{}' already registered, keeping it", atlas.name);
            return Ok(handle);
        }
        log::info!("Loaded atlas '{}' from {}", atlas.name, file_name);
        Ok(self.add_atlas(atlas)?)
    }

    /// Load every atlas manifest under the asset directory
    pub fn load_all_atlases(&mut self) -> Result<Vec<AtlasHandle>> {
        let mut handles = Vec::new();
        for file_name in self.loader.list_assets(AssetType::Atlas)? {
            handles.push(self.load_atlas(&file_name)?);
        }
        Ok(handles)
    }

    /// Get an atlas by handle
    pub fn atlas(&self, handle: AtlasHandle) -> Option<&SpriteAtlas> {
        self.atlases.get(handle.id().slot())
    }

    /// Get an atlas by registered name
    pub fn atlas_by_name(&self, name: &str) -> Option<&SpriteAtlas> {
        self.atlas_names
            .get(name)
            .and_then(|&handle| self.atlas(handle))
    }

    /// Look up an atlas and check it carries every required animation.
    ///
    /// Fails on the first missing piece so broken sprites surface at load
    /// time rather than mid-replay.
    pub fn resolve_animation_set(
        &self,
        name: &str,
        required: &[&str],
    ) -> Result<ResolvedAnimations, AssetError> {
        let handle = self
            .atlas_names
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let atlas = self
            .atlas(handle)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;

        for key in required {
            match atlas.get_animation(key) {
                Some(anim) if anim.frame_count() > 0 && anim.fps > 0.0 => {}
                _ => {
                    return Err(AssetError::MissingAnimation {
                        atlas: name.to_string(),
                        animation: key.to_string(),
                    })
                }
            }
        }

        Ok(ResolvedAnimations {
            atlas: handle,
            atlas_name: atlas.name.clone(),
            animations: atlas.animations().clone(),
        })
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }
}
