// Arena: hex tiles, terrain overrides, and the characters standing on them

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::hex::{generate_axial_coordinates, parse_coord_key, AxialCoord, HexLayout};
use crate::engine::assets::{AssetError, AssetManager};

use super::battle::BattleParticipant;
use super::characters::{Character, CharacterError, CharacterId, CharacterState};
use super::config::ArenaConfig;

/// Errors raised while placing characters
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Sprite for '{id}' could not be resolved: {source}")]
    Sprite {
        id: CharacterId,
        #[source]
        source: AssetError,
    },

    #[error(transparent)]
    Character(#[from] CharacterError),
}

/// Gameplay properties of a terrain override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainProperties {
    pub passable: bool,
    pub blocks_vision: bool,
    pub blocks_projectiles: bool,
    pub movement_cost: f32,
}

impl Default for TerrainProperties {
    fn default() -> Self {
        Self {
            passable: true,
            blocks_vision: false,
            blocks_projectiles: false,
            movement_cost: 1.0,
        }
    }
}

/// Per-hex override of the default tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDefinition {
    #[serde(rename = "type")]
    pub terrain_type: String,
    #[serde(default)]
    pub sprite_id: String,
    #[serde(default)]
    pub properties: TerrainProperties,
}

impl TerrainDefinition {
    pub fn new(terrain_type: impl Into<String>, properties: TerrainProperties) -> Self {
        let terrain_type = terrain_type.into();
        Self {
            sprite_id: terrain_type.clone(),
            terrain_type,
            properties,
        }
    }

    /// Terrain nothing can walk through
    pub fn wall(terrain_type: impl Into<String>) -> Self {
        Self::new(
            terrain_type,
            TerrainProperties {
                passable: false,
                blocks_vision: true,
                blocks_projectiles: true,
                ..TerrainProperties::default()
            },
        )
    }
}

/// A generated grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub coord: AxialCoord,
    /// Pixel position of the hex centre
    pub center: Vec2,
}

/// The battlefield
#[derive(Debug)]
pub struct Arena {
    config: ArenaConfig,
    layout: HexLayout,
    tiles: HashMap<AxialCoord, Tile>,
    terrain: HashMap<AxialCoord, TerrainDefinition>,
    characters: HashMap<CharacterId, Character>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        let mut arena = Self {
            layout: config.layout(),
            config,
            tiles: HashMap::new(),
            terrain: HashMap::new(),
            characters: HashMap::new(),
        };
        arena.build_tiles();
        arena
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    /// Replace the configuration and rebuild the arena
    pub fn update_config(&mut self, config: ArenaConfig) {
        self.config = config;
        self.reinitialize();
    }

    /// Rebuild tiles from the current configuration.
    ///
    /// Characters are dropped and must be added again. Terrain overrides survive.
    pub fn reinitialize(&mut self) {
        self.layout = self.config.layout();
        if !self.characters.is_empty() {
            log::info!(
                "Arena rebuilt, removing {} character(s)",
                self.characters.len()
            );
            self.characters.clear();
        }
        self.build_tiles();
    }

    fn build_tiles(&mut self) {
        self.tiles = generate_axial_coordinates(self.config.radius)
            .into_iter()
            .map(|coord| {
                let tile = Tile {
                    coord,
                    center: self.layout.to_pixel(coord),
                };
                (coord, tile)
            })
            .collect();
        log::debug!(
            "Generated {} tiles for radius {}",
            self.tiles.len(),
            self.config.radius
        );
    }

    /// Pixel position of a hex centre in this arena
    pub fn hex_to_pixel(&self, coord: AxialCoord) -> Vec2 {
        self.layout.to_pixel(coord)
    }

    /// Create a character for a participant at its initial position.
    ///
    /// An existing character with the same id is replaced.
    pub fn add_character(
        &mut self,
        participant: &BattleParticipant,
        assets: &AssetManager,
    ) -> Result<&mut Character, ArenaError> {
        let atlas = participant
            .sprite_config
            .as_ref()
            .map(|sprite| sprite.atlas.as_str())
            .unwrap_or(self.config.default_sprite.as_str());

        let animations = assets
            .resolve_animation_set(atlas, &CharacterState::required_animations())
            .map_err(|source| ArenaError::Sprite {
                id: participant.id.clone(),
                source,
            })?;

        let character = Character::new(
            participant.id.clone(),
            &participant.name,
            participant.initial_position,
            self.layout,
            &animations,
        )?
        .with_weapon(participant.weapon_id.clone());

        if !self.tiles.contains_key(&participant.initial_position) {
            log::warn!(
                "{} starts off the grid at {}",
                participant.id,
                participant.initial_position
            );
        }

        log::debug!("Adding character '{}' using atlas '{}'", participant.id, atlas);

        let slot = match self.characters.entry(participant.id.clone()) {
            Entry::Occupied(mut entry) => {
                log::warn!("Replacing existing character '{}'", participant.id);
                entry.insert(character);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(character),
        };
        Ok(slot)
    }

    /// Remove a character; does nothing if it is not present
    pub fn remove_character(&mut self, id: &str) -> Option<Character> {
        let removed = self.characters.remove(id);
        if removed.is_some() {
            log::debug!("Removed character '{}'", id);
        }
        removed
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Remove every character
    pub fn clear_characters(&mut self) {
        self.characters.clear();
    }

    /// Whether any character is still moving or animating
    pub fn is_busy(&self) -> bool {
        self.characters.values().any(Character::is_busy)
    }

    pub fn tile_at(&self, coord: AxialCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn terrain_at(&self, coord: AxialCoord) -> Option<&TerrainDefinition> {
        self.terrain.get(&coord)
    }

    /// Passable unless a terrain override explicitly says otherwise
    pub fn is_passable(&self, coord: AxialCoord) -> bool {
        self.terrain
            .get(&coord)
            .map_or(true, |terrain| terrain.properties.passable)
    }

    pub fn set_terrain(&mut self, coord: AxialCoord, terrain: TerrainDefinition) {
        self.terrain.insert(coord, terrain);
    }

    pub fn clear_terrain(&mut self, coord: AxialCoord) -> Option<TerrainDefinition> {
        self.terrain.remove(&coord)
    }

    /// Replace all terrain from a `"q,r"`-keyed map. Bad keys are skipped.
    pub fn set_terrain_map(&mut self, terrain: HashMap<String, TerrainDefinition>) {
        self.terrain.clear();
        for (key, definition) in terrain {
            match parse_coord_key(&key) {
                Some(coord) => {
                    self.terrain.insert(coord, definition);
                }
                None => log::warn!("Ignoring terrain with bad coordinate key '{}'", key),
            }
        }
    }

    /// Advance every character (called every frame)
    pub fn update(&mut self, dt: f32) {
        for character in self.characters.values_mut() {
            character.update(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AtlasBuilder;

    fn assets() -> AssetManager {
        let mut builder = AtlasBuilder::new("default", 1024, 1024);
        for (name, looping) in [("idle", true), ("run", true), ("attack", false), ("hit", false)] {
            builder.add_animation_strip(name, 2, 16, 16, 10.0, looping);
        }
        let mut assets = AssetManager::new(".");
        assets.add_atlas(builder.build()).unwrap();

        let mut broken = AtlasBuilder::new("broken", 64, 64);
        broken.add_animation_strip("idle", 1, 16, 16, 10.0, true);
        assets.add_atlas(broken.build()).unwrap();
        assets
    }

    fn small_arena() -> Arena {
        Arena::new(ArenaConfig {
            radius: 2,
            ..ArenaConfig::default()
        })
    }

    #[test]
    fn test_tiles_generated() {
        let arena = small_arena();
        assert_eq!(arena.tile_count(), 19);
        let center = arena.tile_at(AxialCoord::ORIGIN).unwrap();
        assert_eq!(center.center, Vec2::new(400.0, 300.0));
        assert!(arena.tile_at(AxialCoord::new(3, 0)).is_none());
    }

    #[test]
    fn test_passability() {
        let mut arena = small_arena();
        let rock = AxialCoord::new(1, 0);
        let grass = AxialCoord::new(0, 1);

        assert!(arena.is_passable(rock));
        assert!(arena.terrain_at(rock).is_none());

        arena.set_terrain(rock, TerrainDefinition::wall("rock"));
        arena.set_terrain(grass, TerrainDefinition::new("grass", TerrainProperties::default()));

        assert!(!arena.is_passable(rock));
        assert!(arena.is_passable(grass));
        // Off-grid coordinates without terrain are still passable
        assert!(arena.is_passable(AxialCoord::new(50, 50)));

        arena.clear_terrain(rock);
        assert!(arena.is_passable(rock));
    }

    #[test]
    fn test_terrain_map_keys() {
        let mut arena = small_arena();
        let json = r#"{
            "1,-1": {"type": "water", "properties": {"passable": false, "movementCost": 3}},
            "bogus": {"type": "lava"}
        }"#;
        let map: HashMap<String, TerrainDefinition> = serde_json::from_str(json).unwrap();
        arena.set_terrain_map(map);

        let water = arena.terrain_at(AxialCoord::new(1, -1)).unwrap();
        assert_eq!(water.terrain_type, "water");
        assert_eq!(water.properties.movement_cost, 3.0);
        assert!(!arena.is_passable(AxialCoord::new(1, -1)));
    }

    #[test]
    fn test_add_and_remove_character() {
        let mut arena = small_arena();
        let assets = assets();
        let hero = BattleParticipant::new("hero", AxialCoord::new(1, 1));

        let character = arena.add_character(&hero, &assets).unwrap();
        assert_eq!(character.position(), arena_pixel(AxialCoord::new(1, 1)));
        assert_eq!(arena.character_count(), 1);

        assert!(arena.remove_character("hero").is_some());
        assert!(arena.remove_character("hero").is_none());
        assert_eq!(arena.character_count(), 0);
    }

    fn arena_pixel(coord: AxialCoord) -> Vec2 {
        ArenaConfig {
            radius: 2,
            ..ArenaConfig::default()
        }
        .layout()
        .to_pixel(coord)
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let mut arena = small_arena();
        let assets = assets();
        arena
            .add_character(&BattleParticipant::new("hero", AxialCoord::ORIGIN), &assets)
            .unwrap();
        arena
            .add_character(
                &BattleParticipant::new("hero", AxialCoord::new(-1, 0)),
                &assets,
            )
            .unwrap();

        assert_eq!(arena.character_count(), 1);
        assert_eq!(
            arena.character("hero").unwrap().axial_position(),
            AxialCoord::new(-1, 0)
        );
    }

    #[test]
    fn test_unresolvable_sprite_fails() {
        let mut arena = small_arena();
        let assets = assets();

        let ghost = BattleParticipant::new("ghost", AxialCoord::ORIGIN).with_sprite("missing");
        assert!(matches!(
            arena.add_character(&ghost, &assets),
            Err(ArenaError::Sprite { .. })
        ));

        let broken = BattleParticipant::new("broken", AxialCoord::ORIGIN).with_sprite("broken");
        assert!(matches!(
            arena.add_character(&broken, &assets),
            Err(ArenaError::Sprite {
                source: AssetError::MissingAnimation { .. },
                ..
            })
        ));
        assert_eq!(arena.character_count(), 0);
    }

    #[test]
    fn test_reinitialize_rebuilds() {
        let mut arena = small_arena();
        let assets = assets();
        arena
            .add_character(&BattleParticipant::new("hero", AxialCoord::ORIGIN), &assets)
            .unwrap();
        arena.set_terrain(AxialCoord::new(1, 0), TerrainDefinition::wall("rock"));

        arena.update_config(ArenaConfig {
            radius: 1,
            tile_size: 10.0,
            ..ArenaConfig::default()
        });

        assert_eq!(arena.tile_count(), 7);
        assert_eq!(arena.character_count(), 0);
        assert!(!arena.is_passable(AxialCoord::new(1, 0)));
        assert_eq!(arena.layout().tile_size, 10.0);
    }

    #[test]
    fn test_update_advances_characters() {
        let mut arena = small_arena();
        let assets = assets();
        arena
            .add_character(&BattleParticipant::new("hero", AxialCoord::ORIGIN), &assets)
            .unwrap()
            .move_to_axial_position(AxialCoord::new(1, 0), 0.5);
        assert!(arena.is_busy());

        arena.update(0.5);
        assert!(!arena.is_busy());
        assert_eq!(
            arena.character("hero").unwrap().axial_position(),
            AxialCoord::new(1, 0)
        );
    }
}
