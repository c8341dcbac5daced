// Replay configuration
//
// Arena layout and playback timing. `Default` gives a 5-hex arena in an
// 800x600 viewport with snappy playback; a TOML file can override any field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::hex::HexLayout;

/// Errors raised while reading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Arena geometry and fallback sprite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Hexes from the centre to the edge
    pub radius: i32,
    /// Hex circumradius in pixels
    pub tile_size: f32,
    /// Viewport size; the origin hex sits at its centre
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Atlas used for participants without a sprite config
    pub default_sprite: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            tile_size: 32.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            default_sprite: "default".to_string(),
        }
    }
}

impl ArenaConfig {
    pub fn layout(&self) -> HexLayout {
        HexLayout::centered(self.tile_size, self.viewport_width, self.viewport_height)
    }
}

/// Playback pacing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Seconds per hex for moves
    pub move_step_duration: f32,
    /// Pause between consecutive actions, in seconds
    pub action_delay: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            move_step_duration: 0.3,
            action_delay: 0.1,
        }
    }
}

/// Everything a replay needs to know up front
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub arena: ArenaConfig,
    pub playback: PlaybackConfig,
}

impl ReplayConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.arena.radius, 5);
        assert_eq!(config.playback.action_delay, 0.1);
        assert_eq!(config.arena.layout().origin, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReplayConfig::from_toml_str(
            r#"
            [arena]
            radius = 3
            default_sprite = "grunt"

            [playback]
            action_delay = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.arena.radius, 3);
        assert_eq!(config.arena.default_sprite, "grunt");
        assert_eq!(config.arena.tile_size, 32.0);
        assert_eq!(config.playback.action_delay, 0.0);
        assert_eq!(config.playback.move_step_duration, 0.3);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ReplayConfig::from_toml_str("[arena]\nradius = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ReplayConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
