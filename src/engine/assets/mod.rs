// Asset management system
//
// Registers sprite atlases and resolves the animation sets characters are
// built from. Atlases come from JSON manifests on disk or from AtlasBuilder.

mod atlas;
mod handle;
mod loader;
mod manager;

pub use atlas::{AtlasAnimation, AtlasBuilder, AtlasManifest, AtlasRegion, SpriteAtlas};
pub use handle::{AssetHandle, AssetId, AtlasHandle, AtlasKind};
pub use loader::{AssetLoader, AssetType};
pub use manager::{AssetManager, ResolvedAnimations};

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset already loaded: {0}")]
    AlreadyLoaded(String),

    #[error("Atlas '{atlas}' has no usable '{animation}' animation")]
    MissingAnimation { atlas: String, animation: String },

    #[error("Malformed asset manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
