// Character animation state machine

use serde::{Deserialize, Serialize};

/// What a character is currently doing on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterState {
    /// Standing on a hex
    #[default]
    Idle,
    /// Moving between hexes
    Run,
    /// Playing a one-shot attack
    Attack,
    /// Playing a one-shot hit reaction
    Hit,
}

impl CharacterState {
    /// Every state, in the order sprite sheets list them
    pub const ALL: [CharacterState; 4] = [Self::Idle, Self::Run, Self::Attack, Self::Hit];

    /// Get the animation name for this state
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Attack => "attack",
            Self::Hit => "hit",
        }
    }

    /// Animation names a sprite must provide
    pub fn required_animations() -> [&'static str; 4] {
        Self::ALL.map(|state| state.animation_name())
    }

    /// One-shot states play once and then return to idle
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Self::Attack | Self::Hit)
    }

    /// Whether the animation repeats until told otherwise
    pub fn is_looping(&self) -> bool {
        !self.is_one_shot()
    }
}

/// State machine that handles character state transitions.
///
/// Transitions are commanded; the machine never changes state on its own.
#[derive(Debug)]
pub struct CharacterStateMachine {
    current_state: CharacterState,
    previous_state: CharacterState,
    state_time: f32,
}

impl Default for CharacterStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: CharacterState::Idle,
            previous_state: CharacterState::Idle,
            state_time: 0.0,
        }
    }

    pub fn state(&self) -> CharacterState {
        self.current_state
    }

    pub fn previous_state(&self) -> CharacterState {
        self.previous_state
    }

    /// Get time spent in current state
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Transition to a new state
    pub fn transition(&mut self, new_state: CharacterState) {
        if self.current_state != new_state {
            self.previous_state = self.current_state;
            self.current_state = new_state;
            self.state_time = 0.0;
        }
    }

    /// Force transition even to the same state (resets state time)
    pub fn force_transition(&mut self, new_state: CharacterState) {
        self.previous_state = self.current_state;
        self.current_state = new_state;
        self.state_time = 0.0;
    }

    /// Advance state time (called every frame)
    pub fn update(&mut self, dt: f32) {
        self.state_time += dt;
    }

    /// Called when a move starts
    pub fn start_run(&mut self) {
        self.transition(CharacterState::Run);
    }

    /// Start a one-shot; restarts if the same one-shot is already playing
    pub fn start_one_shot(&mut self, state: CharacterState) {
        if state.is_one_shot() {
            self.force_transition(state);
        }
    }

    /// Called when a move or one-shot completes
    pub fn settle(&mut self) {
        self.transition(CharacterState::Idle);
    }
}
