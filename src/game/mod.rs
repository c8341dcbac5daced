// Battle replay: arena, characters, timeline data and playback

pub mod arena;
pub mod battle;
pub mod characters;
pub mod config;
pub mod orchestrator;
pub mod program;

pub use arena::{Arena, ArenaError, TerrainDefinition, TerrainProperties, Tile};
pub use battle::{
    ActionKind, BattleAction, BattleData, BattleDataError, BattleParticipant, BattleTurn,
    SpriteConfig,
};
pub use config::{ArenaConfig, ConfigError, PlaybackConfig, ReplayConfig};
pub use orchestrator::{
    ActionContext, ActionError, ActionHandler, Cursor, Orchestrator, PlaybackState, ReplayEvent,
    Step,
};
pub use program::{
    BattleProgram, Instruction, ProgramDocument, ProgramError, Routine, Variable,
};
