// Turn/action playback
//
// Walks a battle timeline one action at a time. Each action is turned into
// a short script of steps by a handler looked up by action kind; steps that
// animate a character are waited on (by polling between ticks) before the
// next step or action starts.

use std::collections::{HashMap, VecDeque};

use crate::core::facing::{get_facing_direction, Facing};
use crate::core::hex::AxialCoord;
use crate::engine::assets::AssetManager;

use super::arena::Arena;
use super::battle::{ActionKind, BattleAction, BattleData, BattleDataError};
use super::characters::Character;
use super::config::PlaybackConfig;

/// Playback state of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not started, or stopped by reset
    #[default]
    Idle,
    Playing,
    /// No new actions start; the one in flight still finishes
    Paused,
    /// Every action has been consumed
    Finished,
}

/// Address of the next action to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub turn: usize,
    pub action: usize,
}

/// Something observers (renderer, effects layer, logs) may want to know
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    TurnStarted {
        turn: usize,
        id: String,
        timestamp: f64,
    },
    ActionStarted {
        cursor: Cursor,
        kind: ActionKind,
        actor: String,
    },
    ActionSkipped {
        cursor: Cursor,
        reason: String,
    },
    ActionFailed {
        cursor: Cursor,
        error: String,
    },
    /// Visual effect for the effects renderer to play
    Effect {
        actor: String,
        target: Option<String>,
        position: Option<AxialCoord>,
        data: Option<serde_json::Value>,
    },
    Finished,
}

/// Why an action could not be played
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("no character '{0}' in the arena")]
    UnknownActor(String),

    #[error("move for '{0}' has neither a path nor a position")]
    NoDestination(String),
}

impl ActionError {
    /// Lookup misses are expected in partial recordings and only warrant a warning
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, ActionError::UnknownActor(_))
    }
}

/// One unit of work inside an action
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Face {
        actor: String,
        facing: Facing,
    },
    MoveTo {
        actor: String,
        target: AxialCoord,
        duration: f32,
    },
    Walk {
        actor: String,
        path: Vec<AxialCoord>,
        step_duration: f32,
    },
    Attack {
        actor: String,
    },
    Hit {
        actor: String,
    },
    Emit(ReplayEvent),
}

/// What a handler may look at and update while planning an action
pub struct ActionContext<'a> {
    /// Where the orchestrator believes every participant stands
    pub positions: &'a mut HashMap<String, AxialCoord>,
    pub arena: &'a Arena,
    pub playback: &'a PlaybackConfig,
}

impl ActionContext<'_> {
    /// Cached position of an actor that is present in the arena
    pub fn require_actor(&self, id: &str) -> Result<AxialCoord, ActionError> {
        let character = self
            .arena
            .character(id)
            .ok_or_else(|| ActionError::UnknownActor(id.to_string()))?;
        Ok(self
            .positions
            .get(id)
            .copied()
            .unwrap_or_else(|| character.axial_position()))
    }

    /// Current facing of a character, defaulting to right
    pub fn facing_of(&self, id: &str) -> Facing {
        self.arena
            .character(id)
            .map(|c| c.facing())
            .unwrap_or_default()
    }
}

/// Turns an action into steps
pub type ActionHandler =
    Box<dyn Fn(&mut ActionContext<'_>, &BattleAction) -> Result<Vec<Step>, ActionError>>;

/// Action currently being played
#[derive(Debug)]
struct InFlight {
    steps: VecDeque<Step>,
    /// Character whose move or one-shot must end before the next step
    waiting_on: Option<String>,
}

/// Drives a battle replay
pub struct Orchestrator {
    arena: Arena,
    assets: AssetManager,
    playback: PlaybackConfig,
    handlers: HashMap<ActionKind, ActionHandler>,

    battle: Option<BattleData>,
    state: PlaybackState,
    cursor: Cursor,
    positions: HashMap<String, AxialCoord>,

    in_flight: Option<InFlight>,
    delay_remaining: f32,
    events: Vec<ReplayEvent>,
}

impl Orchestrator {
    /// Create an orchestrator with the standard action handlers
    pub fn new(arena: Arena, assets: AssetManager, playback: PlaybackConfig) -> Self {
        let mut orchestrator = Self {
            arena,
            assets,
            playback,
            handlers: HashMap::new(),
            battle: None,
            state: PlaybackState::Idle,
            cursor: Cursor::default(),
            positions: HashMap::new(),
            in_flight: None,
            delay_remaining: 0.0,
            events: Vec::new(),
        };
        orchestrator.register_handler(ActionKind::Move, handle_move);
        orchestrator.register_handler(ActionKind::Attack, handle_strike);
        // Skills reuse the attack presentation until they get their own animations
        orchestrator.register_handler(ActionKind::Skill, handle_strike);
        orchestrator.register_handler(ActionKind::Effect, handle_effect);
        orchestrator
    }

    /// Install or replace the handler for an action kind
    pub fn register_handler<F>(&mut self, kind: ActionKind, handler: F)
    where
        F: Fn(&mut ActionContext<'_>, &BattleAction) -> Result<Vec<Step>, ActionError> + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Load a battle: rewinds, stops playback, and places every participant
    pub fn set_battle_data(&mut self, data: BattleData) {
        self.stop_and_rewind();

        self.positions = data
            .participants
            .iter()
            .map(|p| (p.id.clone(), p.initial_position))
            .collect();

        self.arena.clear_characters();
        for participant in &data.participants {
            if let Err(e) = self.arena.add_character(participant, &self.assets) {
                log::error!("Could not place '{}': {}", participant.id, e);
            }
        }

        log::info!(
            "Loaded battle: {} participant(s), {} turn(s), {} action(s)",
            data.participants.len(),
            data.turns.len(),
            data.total_actions()
        );
        self.battle = Some(data);
    }

    /// Parse battle JSON and load it. On error the current battle is kept.
    pub fn load_battle_json(&mut self, json: &str) -> Result<(), BattleDataError> {
        match BattleData::from_json(json) {
            Ok(data) => {
                self.set_battle_data(data);
                Ok(())
            }
            Err(e) => {
                log::error!("Rejected battle data: {}", e);
                Err(e)
            }
        }
    }

    /// Start, resume, or pause playback
    pub fn set_playing(&mut self, playing: bool) {
        if playing {
            match self.state {
                PlaybackState::Playing => {}
                PlaybackState::Finished => {
                    log::info!("Replay already finished; reset to play again");
                }
                PlaybackState::Idle | PlaybackState::Paused => {
                    if self.battle.is_none() {
                        log::warn!("Nothing to play: no battle loaded");
                        return;
                    }
                    self.state = PlaybackState::Playing;
                    log::info!("Playback started at turn {}", self.cursor.turn);
                    self.pump();
                }
            }
        } else if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            log::info!("Playback paused");
        }
    }

    pub fn toggle_playing(&mut self) {
        let playing = self.state == PlaybackState::Playing;
        self.set_playing(!playing);
    }

    /// Rewind to the first action and put everyone back on their start hex
    pub fn reset(&mut self) {
        self.stop_and_rewind();

        let Some(battle) = self.battle.as_ref() else {
            return;
        };
        for participant in &battle.participants {
            self.positions
                .insert(participant.id.clone(), participant.initial_position);
            if let Some(character) = self.arena.character_mut(&participant.id) {
                character.teleport(participant.initial_position);
                character.set_facing_direction(Facing::default());
            }
        }
        log::info!("Playback reset");
    }

    /// Drop the battle and stop scheduling. Moves already under way still
    /// finish on later arena updates.
    pub fn destroy(&mut self) {
        self.stop_and_rewind();
        self.battle = None;
        self.positions.clear();
    }

    fn stop_and_rewind(&mut self) {
        self.state = PlaybackState::Idle;
        self.cursor = Cursor::default();
        self.in_flight = None;
        self.delay_remaining = 0.0;
    }

    /// Advance time: characters, the inter-action delay, then playback
    pub fn update(&mut self, dt: f32) {
        self.arena.update(dt);
        if self.delay_remaining > 0.0 {
            self.delay_remaining = (self.delay_remaining - dt).max(0.0);
        }
        self.pump();
    }

    /// Call `update(dt)` until the replay finishes or `max_updates` runs out.
    ///
    /// Returns whether the replay finished.
    pub fn run_until_finished(&mut self, dt: f32, max_updates: usize) -> bool {
        for _ in 0..max_updates {
            if self.is_finished() {
                break;
            }
            self.update(dt);
        }
        self.is_finished()
    }

    /// Make as much progress as possible without time passing
    fn pump(&mut self) {
        loop {
            if self.in_flight.is_some() {
                if !self.drive_in_flight() {
                    return;
                }
                self.complete_action();
            }

            if self.state != PlaybackState::Playing || self.delay_remaining > 0.0 {
                return;
            }

            if !self.seek() {
                self.finish();
                return;
            }
            self.start_action();
        }
    }

    /// Move the cursor past exhausted turns. False once the timeline is done.
    fn seek(&mut self) -> bool {
        let Some(battle) = self.battle.as_ref() else {
            return false;
        };
        while let Some(turn) = battle.turns.get(self.cursor.turn) {
            if self.cursor.action < turn.actions.len() {
                return true;
            }
            self.cursor.turn += 1;
            self.cursor.action = 0;
        }
        false
    }

    fn finish(&mut self) {
        if self.state != PlaybackState::Finished {
            self.state = PlaybackState::Finished;
            self.events.push(ReplayEvent::Finished);
            log::info!("Replay finished");
        }
    }

    fn start_action(&mut self) {
        let cursor = self.cursor;
        let Some(battle) = self.battle.as_ref() else {
            return;
        };
        let Some(action) = battle.action_at(cursor.turn, cursor.action).cloned() else {
            return;
        };

        if cursor.action == 0 {
            if let Some(turn) = battle.turns.get(cursor.turn) {
                log::debug!("Turn {} ({}) begins", cursor.turn, turn.id);
                self.events.push(ReplayEvent::TurnStarted {
                    turn: cursor.turn,
                    id: turn.id.clone(),
                    timestamp: turn.timestamp,
                });
            }
        }

        let Some(handler) = self.handlers.get(&action.kind) else {
            log::warn!(
                "Skipping {} action by '{}' at {}:{}: no handler",
                action.kind.as_str(),
                action.actor,
                cursor.turn,
                cursor.action
            );
            self.events.push(ReplayEvent::ActionSkipped {
                cursor,
                reason: format!("unsupported action type '{}'", action.kind.as_str()),
            });
            self.complete_action();
            return;
        };

        let mut ctx = ActionContext {
            positions: &mut self.positions,
            arena: &self.arena,
            playback: &self.playback,
        };
        let planned = handler(&mut ctx, &action);

        match planned {
            Ok(steps) => {
                log::debug!(
                    "{}:{} {} by '{}' ({} step(s))",
                    cursor.turn,
                    cursor.action,
                    action.kind.as_str(),
                    action.actor,
                    steps.len()
                );
                self.events.push(ReplayEvent::ActionStarted {
                    cursor,
                    kind: action.kind,
                    actor: action.actor.clone(),
                });
                self.in_flight = Some(InFlight {
                    steps: steps.into(),
                    waiting_on: None,
                });
            }
            Err(e) if e.is_lookup_miss() => {
                log::warn!("Skipping action {}:{}: {}", cursor.turn, cursor.action, e);
                self.events.push(ReplayEvent::ActionSkipped {
                    cursor,
                    reason: e.to_string(),
                });
                self.complete_action();
            }
            Err(e) => {
                log::error!("Action {}:{} failed: {}", cursor.turn, cursor.action, e);
                self.events.push(ReplayEvent::ActionFailed {
                    cursor,
                    error: e.to_string(),
                });
                self.complete_action();
            }
        }
    }

    /// Run steps until one needs time. Returns true when the action is done.
    fn drive_in_flight(&mut self) -> bool {
        let Some(mut flight) = self.in_flight.take() else {
            return true;
        };

        loop {
            if let Some(actor) = flight.waiting_on.as_deref() {
                if self.arena.character(actor).is_some_and(|c| c.is_busy()) {
                    self.in_flight = Some(flight);
                    return false;
                }
                flight.waiting_on = None;
            }

            let Some(step) = flight.steps.pop_front() else {
                return true;
            };

            match self.execute_step(step) {
                Ok(wait) => flight.waiting_on = wait,
                Err(e) => {
                    log::warn!("Abandoning action at {}:{}: {}", self.cursor.turn, self.cursor.action, e);
                    self.events.push(ReplayEvent::ActionFailed {
                        cursor: self.cursor,
                        error: e.to_string(),
                    });
                    return true;
                }
            }
        }
    }

    /// Start one step. Returns the character to wait on, if any.
    fn execute_step(&mut self, step: Step) -> Result<Option<String>, ActionError> {
        match step {
            Step::Face { actor, facing } => {
                self.character_mut(&actor)?.set_facing_direction(facing);
                Ok(None)
            }
            Step::MoveTo {
                actor,
                target,
                duration,
            } => {
                self.character_mut(&actor)?
                    .move_to_axial_position(target, duration);
                Ok(Some(actor))
            }
            Step::Walk {
                actor,
                path,
                step_duration,
            } => {
                self.character_mut(&actor)?
                    .move_along_axial_path(&path, step_duration);
                Ok(Some(actor))
            }
            Step::Attack { actor } => {
                self.character_mut(&actor)?.attack();
                Ok(Some(actor))
            }
            Step::Hit { actor } => {
                self.character_mut(&actor)?.hit();
                Ok(Some(actor))
            }
            Step::Emit(event) => {
                self.events.push(event);
                Ok(None)
            }
        }
    }

    fn character_mut(&mut self, id: &str) -> Result<&mut Character, ActionError> {
        self.arena
            .character_mut(id)
            .ok_or_else(|| ActionError::UnknownActor(id.to_string()))
    }

    /// Consume the action under the cursor and schedule the next one
    fn complete_action(&mut self) {
        self.in_flight = None;
        self.cursor.action += 1;
        self.delay_remaining = self.playback.action_delay;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Whether an action is still playing out
    pub fn is_executing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Fraction of actions consumed, in [0, 1]
    pub fn progress(&self) -> f32 {
        let Some(battle) = self.battle.as_ref() else {
            return 0.0;
        };
        if battle.turns.is_empty() {
            return 0.0;
        }

        let total = battle.total_actions();
        if total == 0 {
            return if self.is_finished() { 1.0 } else { 0.0 };
        }

        let completed: usize = battle
            .turns
            .iter()
            .take(self.cursor.turn)
            .map(|turn| turn.actions.len())
            .sum::<usize>()
            + battle
                .turns
                .get(self.cursor.turn)
                .map_or(0, |turn| self.cursor.action.min(turn.actions.len()));

        (completed as f32 / total as f32).min(1.0)
    }

    /// Where the orchestrator believes a participant stands
    pub fn cached_position(&self, id: &str) -> Option<AxialCoord> {
        self.positions.get(id).copied()
    }

    pub fn battle(&self) -> Option<&BattleData> {
        self.battle.as_ref()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn assets_mut(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    pub fn set_playback(&mut self, playback: PlaybackConfig) {
        self.playback = playback;
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<ReplayEvent> {
        std::mem::take(&mut self.events)
    }
}

/// `move`: walk the path if there is one, otherwise jump to the position
fn handle_move(ctx: &mut ActionContext<'_>, action: &BattleAction) -> Result<Vec<Step>, ActionError> {
    let from = ctx.require_actor(&action.actor)?;
    let step_duration = ctx.playback.move_step_duration;

    let destination = action
        .destination()
        .ok_or_else(|| ActionError::NoDestination(action.actor.clone()))?;

    let step = match &action.path {
        Some(path) if !path.is_empty() => Step::Walk {
            actor: action.actor.clone(),
            path: path.clone(),
            step_duration,
        },
        _ => Step::MoveTo {
            actor: action.actor.clone(),
            target: destination,
            duration: step_duration * from.distance(destination).max(1) as f32,
        },
    };

    if !ctx.arena.is_passable(destination) {
        log::warn!("'{}' ends a move on impassable terrain at {}", action.actor, destination);
    }

    ctx.positions.insert(action.actor.clone(), destination);
    Ok(vec![step])
}

/// `attack` and `skill`: face the target, swing, then the target reacts
fn handle_strike(
    ctx: &mut ActionContext<'_>,
    action: &BattleAction,
) -> Result<Vec<Step>, ActionError> {
    let actor_pos = ctx.require_actor(&action.actor)?;
    let mut steps = Vec::with_capacity(3);

    let target = match action.target.as_deref() {
        Some(id) => match ctx.require_actor(id) {
            Ok(pos) => Some((id, pos)),
            Err(e) => {
                log::warn!("{} by '{}': {}", action.kind.as_str(), action.actor, e);
                None
            }
        },
        None => None,
    };

    if let Some((_, target_pos)) = target {
        let facing = get_facing_direction(actor_pos, target_pos, ctx.facing_of(&action.actor));
        steps.push(Step::Face {
            actor: action.actor.clone(),
            facing,
        });
    }

    steps.push(Step::Attack {
        actor: action.actor.clone(),
    });

    if let Some((id, _)) = target {
        steps.push(Step::Hit {
            actor: id.to_string(),
        });
    }

    Ok(steps)
}

/// `effect`: hand off to the effects renderer
fn handle_effect(
    _ctx: &mut ActionContext<'_>,
    action: &BattleAction,
) -> Result<Vec<Step>, ActionError> {
    Ok(vec![Step::Emit(ReplayEvent::Effect {
        actor: action.actor.clone(),
        target: action.target.clone(),
        position: action.position,
        data: action.data.clone(),
    })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AtlasBuilder;
    use crate::game::battle::{BattleParticipant, BattleTurn};
    use crate::game::characters::CharacterState;
    use crate::game::config::ArenaConfig;

    fn assets() -> AssetManager {
        let mut builder = AtlasBuilder::new("default", 1024, 1024);
        for (name, looping) in [("idle", true), ("run", true), ("attack", false), ("hit", false)] {
            builder.add_animation_strip(name, 2, 16, 16, 10.0, looping);
        }
        let mut assets = AssetManager::new(".");
        assets.add_atlas(builder.build()).unwrap();
        assets
    }

    fn orchestrator(action_delay: f32) -> Orchestrator {
        Orchestrator::new(
            Arena::new(ArenaConfig::default()),
            assets(),
            PlaybackConfig {
                move_step_duration: 0.2,
                action_delay,
            },
        )
    }

    fn battle(participants: &[(&str, AxialCoord)], actions: Vec<BattleAction>) -> BattleData {
        BattleData {
            participants: participants
                .iter()
                .map(|(id, pos)| BattleParticipant::new(*id, *pos))
                .collect(),
            turns: vec![BattleTurn {
                id: "t1".into(),
                timestamp: 0.0,
                actions,
            }],
        }
    }

    #[test]
    fn test_nothing_loaded() {
        let mut o = orchestrator(0.0);
        assert_eq!(o.progress(), 0.0);
        o.set_playing(true);
        assert_eq!(o.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_no_turns_progress_zero() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(BattleData::default());
        assert_eq!(o.progress(), 0.0);
        o.set_playing(true);
        assert!(o.is_finished());
        assert_eq!(o.progress(), 0.0);
    }

    #[test]
    fn test_set_battle_data_seeds_cache() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::new(1, 1)), ("orc", AxialCoord::new(-2, 0))],
            vec![],
        ));
        assert_eq!(o.cached_position("orc"), Some(AxialCoord::new(-2, 0)));
        assert_eq!(o.arena().character_count(), 2);
        assert_eq!(o.cursor(), Cursor::default());
        assert_eq!(o.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_path_move_scenario() {
        let mut o = orchestrator(0.1);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::new(1, 1))],
            vec![BattleAction::move_along(
                "hero",
                vec![AxialCoord::new(1, 1), AxialCoord::new(0, 1)],
            )],
        ));

        o.set_playing(true);
        assert!(o.is_executing());
        assert!(o.run_until_finished(1.0 / 60.0, 600));

        assert_eq!(o.progress(), 1.0);
        assert_eq!(o.cached_position("hero"), Some(AxialCoord::new(0, 1)));
        let hero = o.arena().character("hero").unwrap();
        assert_eq!(hero.axial_position(), AxialCoord::new(0, 1));
        assert_eq!(hero.facing(), Facing::Left);
        assert!(!o.is_playing());
    }

    #[test]
    fn test_unknown_actor_skipped() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![
                BattleAction::move_to("ghost", AxialCoord::new(1, 0)),
                BattleAction::move_to("hero", AxialCoord::new(2, 0)),
            ],
        ));

        o.set_playing(true);
        assert!(o.run_until_finished(0.05, 200));
        assert_eq!(
            o.arena().character("hero").unwrap().axial_position(),
            AxialCoord::new(2, 0)
        );
        assert!(o
            .drain_events()
            .iter()
            .any(|e| matches!(e, ReplayEvent::ActionSkipped { cursor, .. } if cursor.action == 0)));
    }

    #[test]
    fn test_unknown_kind_and_bad_move_do_not_halt() {
        let mut o = orchestrator(0.0);
        let mut odd = BattleAction::move_to("hero", AxialCoord::ORIGIN);
        odd.kind = ActionKind::Unknown;
        let mut nowhere = BattleAction::move_to("hero", AxialCoord::ORIGIN);
        nowhere.position = None;

        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![odd, nowhere, BattleAction::move_to("hero", AxialCoord::new(0, 2))],
        ));
        o.set_playing(true);
        assert!(o.run_until_finished(0.05, 200));

        let events = o.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ReplayEvent::ActionFailed { .. })));
        assert_eq!(o.cached_position("hero"), Some(AxialCoord::new(0, 2)));
        assert_eq!(events.last(), Some(&ReplayEvent::Finished));
    }

    #[test]
    fn test_empty_path_falls_back_to_position() {
        let mut o = orchestrator(0.0);
        let mut action = BattleAction::move_to("hero", AxialCoord::new(1, -1));
        action.path = Some(Vec::new());

        o.set_battle_data(battle(&[("hero", AxialCoord::ORIGIN)], vec![action]));
        o.set_playing(true);
        assert!(o.run_until_finished(0.05, 200));
        assert_eq!(
            o.arena().character("hero").unwrap().axial_position(),
            AxialCoord::new(1, -1)
        );
    }

    #[test]
    fn test_attack_faces_target_and_hits() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN), ("orc", AxialCoord::new(-1, 0))],
            vec![BattleAction::attack("hero", "orc")],
        ));

        o.set_playing(true);
        let hero = o.arena().character("hero").unwrap();
        assert_eq!(hero.facing(), Facing::Left);
        assert_eq!(hero.current_animation(), CharacterState::Attack);
        assert_eq!(
            o.arena().character("orc").unwrap().current_animation(),
            CharacterState::Idle
        );

        // Attack clip: 2 frames at 10 fps
        o.update(0.25);
        assert_eq!(
            o.arena().character("orc").unwrap().current_animation(),
            CharacterState::Hit
        );

        assert!(o.run_until_finished(0.05, 100));
        assert_eq!(
            o.arena().character("orc").unwrap().current_animation(),
            CharacterState::Idle
        );
    }

    #[test]
    fn test_skill_handler_can_be_replaced() {
        let mut o = orchestrator(0.0);
        o.register_handler(ActionKind::Skill, |_, action| {
            Ok(vec![Step::Emit(ReplayEvent::Effect {
                actor: action.actor.clone(),
                target: None,
                position: None,
                data: Some(serde_json::json!({"skill": true})),
            })])
        });
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![BattleAction::skill("hero", None)],
        ));
        o.set_playing(true);

        assert!(o.is_finished());
        assert!(o
            .drain_events()
            .iter()
            .any(|e| matches!(e, ReplayEvent::Effect { data: Some(_), .. })));
    }

    #[test]
    fn test_effect_emits_event() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![BattleAction::effect("hero", Some(serde_json::json!({"name": "smoke"})))],
        ));
        o.set_playing(true);
        assert!(o.is_finished());

        let effects: Vec<_> = o
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, ReplayEvent::Effect { .. }))
            .collect();
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_pause_lets_in_flight_action_finish() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![
                BattleAction::move_to("hero", AxialCoord::new(1, 0)),
                BattleAction::move_to("hero", AxialCoord::new(2, 0)),
            ],
        ));

        o.set_playing(true);
        o.set_playing(false);
        assert_eq!(o.state(), PlaybackState::Paused);

        o.update(0.2);
        // First move done, second not started
        assert_eq!(o.cursor(), Cursor { turn: 0, action: 1 });
        assert!(!o.is_executing());
        assert_eq!(
            o.arena().character("hero").unwrap().axial_position(),
            AxialCoord::new(1, 0)
        );
        assert_eq!(o.progress(), 0.5);

        o.update(1.0);
        assert_eq!(o.cursor().action, 1);

        o.set_playing(true);
        assert!(o.run_until_finished(0.05, 100));
        assert_eq!(o.progress(), 1.0);
    }

    #[test]
    fn test_action_delay_spaces_actions() {
        let mut o = orchestrator(0.5);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![
                BattleAction::effect("hero", None),
                BattleAction::effect("hero", None),
            ],
        ));
        o.set_playing(true);
        assert_eq!(o.cursor().action, 1);

        o.update(0.25);
        assert_eq!(o.cursor().action, 1);
        o.update(0.25);
        assert_eq!(o.cursor().action, 2);
        assert!(!o.is_finished());

        o.update(0.5);
        assert!(o.is_finished());
    }

    #[test]
    fn test_reset_rewinds() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![BattleAction::move_to("hero", AxialCoord::new(-3, 0))],
        ));
        o.set_playing(true);
        assert!(o.run_until_finished(0.1, 100));

        o.reset();
        assert_eq!(o.state(), PlaybackState::Idle);
        assert_eq!(o.progress(), 0.0);
        assert_eq!(o.cached_position("hero"), Some(AxialCoord::ORIGIN));
        let hero = o.arena().character("hero").unwrap();
        assert_eq!(hero.axial_position(), AxialCoord::ORIGIN);
        assert_eq!(hero.facing(), Facing::Right);
        assert!(o.battle().is_some());
    }

    #[test]
    fn test_finished_replay_needs_reset() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(&[("hero", AxialCoord::ORIGIN)], vec![]));
        o.set_playing(true);
        assert!(o.is_finished());
        assert_eq!(o.progress(), 1.0);

        o.set_playing(true);
        assert!(o.is_finished());
    }

    #[test]
    fn test_bad_json_keeps_previous_battle() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(&[("hero", AxialCoord::ORIGIN)], vec![]));

        assert!(o.load_battle_json("{not json").is_err());
        assert!(o.battle().unwrap().participant("hero").is_some());
    }

    #[test]
    fn test_destroy_stops_scheduling() {
        let mut o = orchestrator(0.0);
        o.set_battle_data(battle(
            &[("hero", AxialCoord::ORIGIN)],
            vec![
                BattleAction::move_to("hero", AxialCoord::new(1, 0)),
                BattleAction::move_to("hero", AxialCoord::new(2, 0)),
            ],
        ));
        o.set_playing(true);
        o.destroy();
        assert!(o.battle().is_none());

        // The move already under way still lands
        o.update(0.2);
        assert_eq!(
            o.arena().character("hero").unwrap().axial_position(),
            AxialCoord::new(1, 0)
        );
        assert!(!o.is_executing());
        assert_eq!(o.progress(), 0.0);
    }
}
