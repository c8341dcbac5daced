// Sprite atlas: named frame regions plus the animations built from them

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A region within a sprite atlas
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasRegion {
    /// Name/ID of the frame
    pub name: String,

    /// Position in the atlas (pixels)
    pub x: u32,
    pub y: u32,

    /// Size of the region (pixels)
    pub width: u32,
    pub height: u32,

    /// UV coordinates (0.0 to 1.0)
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

impl AtlasRegion {
    /// Create a new atlas region with calculated UV coordinates
    pub fn new(
        name: impl Into<String>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    ) -> Self {
        let atlas_width = atlas_width.max(1) as f32;
        let atlas_height = atlas_height.max(1) as f32;
        let uv_min = Vec2::new(x as f32 / atlas_width, y as f32 / atlas_height);
        let uv_max = Vec2::new(
            (x + width) as f32 / atlas_width,
            (y + height) as f32 / atlas_height,
        );

        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            uv_min,
            uv_max,
        }
    }
}

/// A named animation: an ordered list of frame regions and a playback rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasAnimation {
    pub frames: Vec<String>,
    pub fps: f32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

impl AtlasAnimation {
    pub fn new(frames: Vec<String>, fps: f32, looping: bool) -> Self {
        Self {
            frames,
            fps,
            looping,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// A sprite atlas containing frame regions and animations
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    /// Name the atlas is registered under
    pub name: String,

    /// Width of the atlas texture
    pub width: u32,

    /// Height of the atlas texture
    pub height: u32,

    /// All regions in this atlas
    regions: Vec<AtlasRegion>,

    /// Animations by name
    animations: HashMap<String, AtlasAnimation>,
}

impl SpriteAtlas {
    /// Create an empty atlas
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            regions: Vec::new(),
            animations: HashMap::new(),
        }
    }

    /// Add a region to the atlas
    pub fn add_region(&mut self, region: AtlasRegion) {
        self.regions.push(region);
    }

    /// Add (or replace) an animation
    pub fn add_animation(&mut self, name: impl Into<String>, animation: AtlasAnimation) {
        self.animations.insert(name.into(), animation);
    }

    /// Get a region by name
    pub fn get_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Get an animation by name
    pub fn get_animation(&self, name: &str) -> Option<&AtlasAnimation> {
        self.animations.get(name)
    }

    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }

    pub fn animations(&self) -> &HashMap<String, AtlasAnimation> {
        &self.animations
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Names of animation frames that have no matching region
    pub fn missing_frames(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = self
            .animations
            .values()
            .flat_map(|anim| anim.frames.iter())
            .filter(|frame| self.get_region(frame).is_none())
            .map(String::as_str)
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

/// On-disk form of an atlas (JSON manifest next to the packed image)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasManifest {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub regions: Vec<ManifestRegion>,
    #[serde(default)]
    pub animations: HashMap<String, AtlasAnimation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRegion {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl From<AtlasManifest> for SpriteAtlas {
    fn from(manifest: AtlasManifest) -> Self {
        let mut atlas = SpriteAtlas::new(manifest.name, manifest.width, manifest.height);
        for r in manifest.regions {
            atlas.add_region(AtlasRegion::new(
                r.name,
                r.x,
                r.y,
                r.width,
                r.height,
                manifest.width,
                manifest.height,
            ));
        }
        atlas.animations = manifest.animations;
        atlas
    }
}

/// Builder that packs frames into rows
pub struct AtlasBuilder {
    name: String,
    width: u32,
    height: u32,
    padding: u32,
    current_x: u32,
    current_y: u32,
    row_height: u32,
    regions: Vec<AtlasRegion>,
    animations: HashMap<String, AtlasAnimation>,
}

impl AtlasBuilder {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            padding: 1,
            current_x: 0,
            current_y: 0,
            row_height: 0,
            regions: Vec::new(),
            animations: HashMap::new(),
        }
    }

    /// Set the padding between sprites
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Add a frame to the atlas
    ///
    /// Returns the region if successful, or None if it doesn't fit
    pub fn add_sprite(
        &mut self,
        name: impl Into<String>,
        sprite_width: u32,
        sprite_height: u32,
    ) -> Option<AtlasRegion> {
        if self.current_x + sprite_width > self.width {
            self.current_x = 0;
            self.current_y += self.row_height + self.padding;
            self.row_height = 0;
        }

        if sprite_width > self.width || self.current_y + sprite_height > self.height {
            return None;
        }

        let region = AtlasRegion::new(
            name,
            self.current_x,
            self.current_y,
            sprite_width,
            sprite_height,
            self.width,
            self.height,
        );

        self.regions.push(region.clone());

        self.current_x += sprite_width + self.padding;
        self.row_height = self.row_height.max(sprite_height);

        Some(region)
    }

    /// Pack `frame_count` equally sized frames named `{name}_{i}` and
    /// register them as one animation.
    ///
    /// Returns false if any frame did not fit; frames that did fit stay packed.
    pub fn add_animation_strip(
        &mut self,
        name: &str,
        frame_count: usize,
        frame_width: u32,
        frame_height: u32,
        fps: f32,
        looping: bool,
    ) -> bool {
        let mut frames = Vec::with_capacity(frame_count);
        for i in 0..frame_count {
            let frame_name = format!("{}_{}", name, i);
            if self
                .add_sprite(frame_name.clone(), frame_width, frame_height)
                .is_none()
            {
                return false;
            }
            frames.push(frame_name);
        }
        self.animations
            .insert(name.to_string(), AtlasAnimation::new(frames, fps, looping));
        true
    }

    /// Build the final atlas
    pub fn build(self) -> SpriteAtlas {
        let mut atlas = SpriteAtlas::new(self.name, self.width, self.height);
        for region in self.regions {
            atlas.add_region(region);
        }
        atlas.animations = self.animations;
        atlas
    }
}
