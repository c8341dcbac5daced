// Character system
//
// This module contains everything related to battle participants on the grid:
// - Character entity with hex position, facing and interpolated moves
// - State machine for idle/run/attack/hit
// - Animation playback over atlas frames

pub mod animation;
pub mod character;
pub mod state;

// Re-export commonly used types
pub use animation::{AnimationClip, AnimationFrameData, AnimationPlayer};
pub use character::{Character, CharacterError, CharacterId};
pub use state::{CharacterState, CharacterStateMachine};
