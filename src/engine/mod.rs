// Engine modules: replay loop timing and sprite assets

pub mod assets;
pub mod game_loop;
