// Character entity: hex position, facing, and animation bookkeeping

use std::collections::VecDeque;

use glam::Vec2;

use crate::core::facing::{get_facing_direction, Facing};
use crate::core::hex::{AxialCoord, HexLayout};
use crate::core::math::{ease_position, move_progress};
use crate::engine::assets::{AtlasHandle, ResolvedAnimations};

use super::animation::{AnimationClip, AnimationFrameData, AnimationPlayer};
use super::state::{CharacterState, CharacterStateMachine};

/// Participant id a character was created for
pub type CharacterId = String;

/// Errors raised while building a character
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("Character '{id}' cannot be drawn: atlas '{atlas}' has no '{animation}' animation")]
    MissingAnimation {
        id: CharacterId,
        atlas: String,
        animation: String,
    },
}

/// An interpolated move between two hex centres
#[derive(Debug, Clone)]
struct Motion {
    from: Vec2,
    to: Vec2,
    target: AxialCoord,
    elapsed: f32,
    duration: f32,
}

impl Motion {
    /// Fraction of the move completed, in [0, 1]
    fn progress(&self) -> f32 {
        move_progress(self.elapsed, self.duration)
    }
}

/// A battle participant standing on the hex grid
#[derive(Debug)]
pub struct Character {
    /// Participant id
    pub id: CharacterId,
    /// Display name
    pub name: String,
    /// Weapon shown by the renderer, if any
    pub weapon_id: Option<String>,
    /// Atlas the character is drawn from
    pub sprite: AtlasHandle,

    layout: HexLayout,
    axial_position: AxialCoord,
    pixel_position: Vec2,
    facing: Facing,

    state_machine: CharacterStateMachine,
    animation: AnimationPlayer,

    /// Move currently being interpolated
    motion: Option<Motion>,
    /// Remaining waypoints of a path move
    pending_path: VecDeque<AxialCoord>,
    /// Duration of each remaining waypoint step
    step_duration: f32,
}

impl Character {
    /// Create a character standing on `position`.
    ///
    /// Every animation in [`CharacterState::required_animations`] must be
    /// present in `animations`.
    pub fn new(
        id: impl Into<CharacterId>,
        name: &str,
        position: AxialCoord,
        layout: HexLayout,
        animations: &ResolvedAnimations,
    ) -> Result<Self, CharacterError> {
        let id = id.into();
        let mut player = AnimationPlayer::new();

        for state in CharacterState::ALL {
            let key = state.animation_name();
            let Some(anim) = animations.get(key).filter(|a| a.frame_count() > 0) else {
                return Err(CharacterError::MissingAnimation {
                    id,
                    atlas: animations.atlas_name.clone(),
                    animation: key.to_string(),
                });
            };
            player.insert(state, AnimationClip::from_atlas(key, anim, state.is_looping()));
        }
        player.play(CharacterState::Idle);

        Ok(Self {
            id,
            name: name.to_string(),
            weapon_id: None,
            sprite: animations.atlas,
            layout,
            axial_position: position,
            pixel_position: layout.to_pixel(position),
            facing: Facing::default(),
            state_machine: CharacterStateMachine::new(),
            animation: player,
            motion: None,
            pending_path: VecDeque::new(),
            step_duration: 0.0,
        })
    }

    pub fn with_weapon(mut self, weapon_id: Option<String>) -> Self {
        self.weapon_id = weapon_id;
        self
    }

    /// Move to a hex over `duration` seconds with an ease-out curve.
    ///
    /// Faces the direction of travel first. A zero duration lands
    /// immediately. Any path in progress is abandoned.
    pub fn move_to_axial_position(&mut self, target: AxialCoord, duration: f32) {
        self.pending_path.clear();
        self.begin_step(target, duration);
        self.settle_if_done();
    }

    /// Walk a path one waypoint at a time, each step taking `step_duration`.
    pub fn move_along_axial_path(&mut self, path: &[AxialCoord], step_duration: f32) {
        self.pending_path = path.iter().copied().collect();
        self.step_duration = step_duration;
        self.motion = None;
        self.advance_path();
        self.settle_if_done();
    }

    /// Play the attack one-shot
    pub fn attack(&mut self) {
        self.play_one_shot(CharacterState::Attack);
    }

    /// Play the hit-reaction one-shot
    pub fn hit(&mut self) {
        self.play_one_shot(CharacterState::Hit);
    }

    /// Turn to face a direction. Returns true if the facing changed.
    pub fn set_facing_direction(&mut self, direction: Facing) -> bool {
        if self.facing == direction {
            return false;
        }
        log::debug!(
            "{} turns {} -> {}",
            self.id,
            self.facing.as_str(),
            direction.as_str()
        );
        self.facing = direction;
        self.animation.set_flip_horizontal(direction.is_flipped());
        true
    }

    /// Snap to a hex, cancelling any move in progress
    pub fn teleport(&mut self, coord: AxialCoord) {
        self.motion = None;
        self.pending_path.clear();
        self.axial_position = coord;
        self.pixel_position = self.layout.to_pixel(coord);
        self.settle_if_done();
    }

    /// Advance interpolation and animation (called every frame)
    pub fn update(&mut self, dt: f32) {
        self.state_machine.update(dt);
        self.animation.update(dt);

        if let Some(motion) = self.motion.as_mut() {
            motion.elapsed += dt;
            let t = motion.progress();
            self.pixel_position = ease_position(motion.from, motion.to, t);

            if t >= 1.0 {
                let target = motion.target;
                self.finish_step(target);
                self.advance_path();
            }
        }

        if self.state_machine.state().is_one_shot() && self.animation.is_finished() {
            self.end_one_shot();
        }
        self.settle_if_done();
    }

    pub fn axial_position(&self) -> AxialCoord {
        self.axial_position
    }

    /// Pixel position (interpolated while moving)
    pub fn position(&self) -> Vec2 {
        self.pixel_position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn current_animation(&self) -> CharacterState {
        self.state_machine.state()
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    /// True while a move or one-shot is still playing
    pub fn is_busy(&self) -> bool {
        self.motion.is_some()
            || !self.pending_path.is_empty()
            || self.state_machine.state().is_one_shot()
    }

    /// Everything the renderer needs to draw the current frame
    pub fn frame_data(&self) -> AnimationFrameData {
        self.animation.frame_data()
    }

    fn begin_step(&mut self, target: AxialCoord, duration: f32) {
        let facing = get_facing_direction(self.axial_position, target, self.facing);
        self.set_facing_direction(facing);

        if duration <= 0.0 {
            self.motion = None;
            self.finish_step(target);
            return;
        }

        self.motion = Some(Motion {
            from: self.pixel_position,
            to: self.layout.to_pixel(target),
            target,
            elapsed: 0.0,
            duration,
        });
        if !self.state_machine.state().is_one_shot() {
            self.state_machine.start_run();
            self.animation.play(CharacterState::Run);
        }
    }

    fn finish_step(&mut self, target: AxialCoord) {
        self.motion = None;
        self.axial_position = target;
        self.pixel_position = self.layout.to_pixel(target);
    }

    /// Start waypoint steps until one needs time to play out
    fn advance_path(&mut self) {
        while self.motion.is_none() {
            let Some(next) = self.pending_path.pop_front() else {
                break;
            };
            self.begin_step(next, self.step_duration);
        }
    }

    fn play_one_shot(&mut self, state: CharacterState) {
        self.state_machine.start_one_shot(state);
        self.animation.restart(state);
    }

    fn end_one_shot(&mut self) {
        if self.motion.is_some() {
            self.state_machine.start_run();
            self.animation.play(CharacterState::Run);
        } else {
            self.state_machine.settle();
            self.animation.play(CharacterState::Idle);
        }
    }

    /// Return to idle once nothing is moving
    fn settle_if_done(&mut self) {
        if self.state_machine.state() == CharacterState::Run
            && self.motion.is_none()
            && self.pending_path.is_empty()
        {
            self.state_machine.settle();
            self.animation.play(CharacterState::Idle);
        }
    }
}
