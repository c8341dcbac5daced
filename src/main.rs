use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use hex_battle_replay::engine::assets::{AssetManager, AssetType, AtlasBuilder, SpriteAtlas};
use hex_battle_replay::engine::game_loop::{GameLoop, ManualClock};
use hex_battle_replay::game::{
    Arena, BattleData, Orchestrator, ProgramDocument, ReplayConfig, ReplayEvent,
};

/// Simulated seconds after which a replay is abandoned
const MAX_REPLAY_SECONDS: u32 = 600;

/// Replay a recorded hex battle headlessly
#[derive(Parser, Debug)]
#[command(name = "battle-replay")]
#[command(about = "Replay a hex battle and print where everyone ends up")]
struct Args {
    /// Battle JSON file (or a name under <assets>/battles)
    battle: String,

    /// Input is a battle program instead of battle data
    #[arg(long)]
    program: bool,

    /// TOML replay configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset directory with atlases/, battles/ and programs/
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Arena radius in hexes (overrides the config)
    #[arg(long)]
    radius: Option<i32>,

    /// Hex size in pixels (overrides the config)
    #[arg(long)]
    tile_size: Option<f32>,

    /// Simulation rate in updates per second
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReplayConfig::load(path)?,
        None => ReplayConfig::default(),
    };
    if let Some(radius) = args.radius {
        config.arena.radius = radius;
    }
    if let Some(tile_size) = args.tile_size {
        config.arena.tile_size = tile_size;
    }

    let assets = load_assets(args.assets.as_deref(), &config.arena.default_sprite)?;
    let battle = load_battle(&args, &assets)?;

    let mut orchestrator = Orchestrator::new(
        Arena::new(config.arena.clone()),
        assets,
        config.playback.clone(),
    );
    orchestrator.set_battle_data(battle);
    orchestrator.set_playing(true);

    let clock = ManualClock::new();
    let mut game_loop = GameLoop::with_clock(clock.clone()).with_update_rate(args.fps);
    let frame_time = game_loop.fixed_timestep();
    let max_frames = MAX_REPLAY_SECONDS as u64 * args.fps.max(1) as u64;

    while !orchestrator.is_finished() && game_loop.frame_count() < max_frames {
        clock.advance_secs(frame_time);
        game_loop.run_frame(|dt| orchestrator.update(dt));
        for event in orchestrator.drain_events() {
            log_event(&event);
        }
    }

    if !orchestrator.is_finished() {
        anyhow::bail!(
            "Replay did not finish within {}s of simulated time ({:.0}% played)",
            MAX_REPLAY_SECONDS,
            orchestrator.progress() * 100.0
        );
    }

    info!(
        "Replayed {} updates ({:.2}s simulated)",
        game_loop.update_count(),
        game_loop.elapsed().as_secs_f32()
    );

    let mut characters: Vec<_> = orchestrator.arena().characters().collect();
    characters.sort_by(|a, b| a.id.cmp(&b.id));
    for character in characters {
        println!(
            "{}\t{}\t{}",
            character.id,
            character.axial_position(),
            character.facing().as_str()
        );
    }

    Ok(())
}

/// Registered atlases: everything under `<dir>/atlases`, plus a built-in
/// atlas under the default sprite name when none was loaded
fn load_assets(dir: Option<&Path>, default_sprite: &str) -> Result<AssetManager> {
    let mut assets = AssetManager::new(dir.unwrap_or_else(|| Path::new("assets")));

    if dir.is_some() {
        let handles = assets.load_all_atlases()?;
        info!("Loaded {} atlas(es)", handles.len());
    }

    if assets.atlas_by_name(default_sprite).is_none() {
        assets.add_atlas(builtin_atlas(default_sprite))?;
    }
    Ok(assets)
}

/// Placeholder atlas carrying every character animation
fn builtin_atlas(name: &str) -> SpriteAtlas {
    let mut builder = AtlasBuilder::new(name, 256, 256).with_padding(1);
    builder.add_animation_strip("idle", 4, 32, 32, 8.0, true);
    builder.add_animation_strip("run", 6, 32, 32, 12.0, true);
    builder.add_animation_strip("attack", 4, 32, 32, 12.0, false);
    builder.add_animation_strip("hit", 2, 32, 32, 10.0, false);
    builder.build()
}

fn load_battle(args: &Args, assets: &AssetManager) -> Result<BattleData> {
    let asset_type = if args.program {
        AssetType::Program
    } else {
        AssetType::Battle
    };

    let text = if Path::new(&args.battle).is_file() || args.assets.is_none() {
        std::fs::read_to_string(&args.battle)
            .with_context(|| format!("Failed to read {}", args.battle))?
    } else {
        assets.loader().load_string(asset_type, &args.battle)?
    };

    let data = if args.program {
        ProgramDocument::from_json(&text)?.to_battle_data()?
    } else {
        BattleData::from_json(&text)?
    };
    Ok(data)
}

fn log_event(event: &ReplayEvent) {
    match event {
        ReplayEvent::TurnStarted { turn, id, .. } => info!("Turn {} ({})", turn, id),
        ReplayEvent::ActionStarted {
            cursor,
            kind,
            actor,
        } => info!(
            "  {}:{} {} by {}",
            cursor.turn,
            cursor.action,
            kind.as_str(),
            actor
        ),
        ReplayEvent::Effect { actor, data, .. } => match data {
            Some(data) => info!("  effect from {}: {}", actor, data),
            None => info!("  effect from {}", actor),
        },
        ReplayEvent::Finished => info!("Finished"),
        // Already logged as warnings/errors by the orchestrator
        ReplayEvent::ActionSkipped { .. } | ReplayEvent::ActionFailed { .. } => {}
    }
}
