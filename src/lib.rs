// Hex-grid battle replay core
//
// Hex coordinate math, characters on a hex arena, and a turn/action
// orchestrator that replays recorded battles one tick at a time.

pub mod core;
pub mod engine;
pub mod game;
