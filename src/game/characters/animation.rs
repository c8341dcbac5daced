// Character animation playback over atlas frames

use std::collections::HashMap;

use crate::engine::assets::AtlasAnimation;

use super::state::CharacterState;

/// Frames of one animation and how fast to show them
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Atlas region names, one per frame
    pub frames: Vec<String>,
    /// Seconds per frame
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(name: &str, frames: Vec<String>, fps: f32, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            frames,
            frame_duration: 1.0 / fps.max(f32::EPSILON),
            looping,
        }
    }

    /// Build a clip from an atlas animation; the character decides whether it loops
    pub fn from_atlas(name: &str, animation: &AtlasAnimation, looping: bool) -> Self {
        Self::new(name, animation.frames.clone(), animation.fps, looping)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of one pass through the clip
    pub fn total_duration(&self) -> f32 {
        self.frame_count() as f32 * self.frame_duration
    }

    /// Frame shown `elapsed` seconds into the clip
    pub fn frame_at(&self, elapsed: f32) -> usize {
        let count = self.frame_count();
        if count == 0 {
            return 0;
        }
        let index = (elapsed.max(0.0) / self.frame_duration) as usize;
        if self.looping {
            index % count
        } else {
            index.min(count - 1)
        }
    }

    /// One-shot clips complete after a single pass; looping clips never do
    pub fn is_complete_at(&self, elapsed: f32) -> bool {
        !self.looping && elapsed >= self.total_duration()
    }
}

/// Plays one clip per character state
#[derive(Debug)]
pub struct AnimationPlayer {
    clips: HashMap<CharacterState, AnimationClip>,
    current: CharacterState,
    /// Seconds into the current clip (wrapped for looping clips)
    elapsed: f32,
    flip_horizontal: bool,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            clips: HashMap::new(),
            current: CharacterState::Idle,
            elapsed: 0.0,
            flip_horizontal: false,
        }
    }

    /// Set the clip played in `state`
    pub fn insert(&mut self, state: CharacterState, clip: AnimationClip) {
        self.clips.insert(state, clip);
    }

    /// Switch clips; keeps the current position if `state` is already playing
    pub fn play(&mut self, state: CharacterState) {
        if self.current != state {
            self.restart(state);
        }
    }

    /// Switch clips and start from the first frame
    pub fn restart(&mut self, state: CharacterState) {
        self.current = state;
        self.elapsed = 0.0;
    }

    pub fn set_flip_horizontal(&mut self, flip: bool) {
        self.flip_horizontal = flip;
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;

        if let Some(clip) = self.clips.get(&self.current) {
            let total = clip.total_duration();
            if clip.looping && total > 0.0 {
                self.elapsed = self.elapsed.rem_euclid(total);
            }
        }
    }

    pub fn current(&self) -> CharacterState {
        self.current
    }

    pub fn current_frame(&self) -> usize {
        self.clips
            .get(&self.current)
            .map_or(0, |clip| clip.frame_at(self.elapsed))
    }

    /// Whether a one-shot clip has played through. A state with no clip
    /// counts as finished.
    pub fn is_finished(&self) -> bool {
        self.clips
            .get(&self.current)
            .map_or(true, |clip| clip.is_complete_at(self.elapsed))
    }

    pub fn frame_data(&self) -> AnimationFrameData {
        let clip = self.clips.get(&self.current);
        let frame_index = self.current_frame();

        AnimationFrameData {
            animation_name: self.current.animation_name().to_string(),
            frame_index,
            region: clip.and_then(|clip| clip.frames.get(frame_index).cloned()),
            flip_horizontal: self.flip_horizontal,
        }
    }
}

/// What the renderer needs to draw the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrameData {
    pub animation_name: String,
    pub frame_index: usize,
    /// Atlas region to draw, if the clip has frames
    pub region: Option<String>,
    pub flip_horizontal: bool,
}
