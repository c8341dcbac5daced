/// Replay loop timing
///
/// Implements a fixed timestep loop over an injectable time source.
/// Replay logic advances in equal `dt` slices regardless of how often
/// the host polls, and tests can drive it with a manual clock instead
/// of sleeping.
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of fixed updates per frame to prevent spiral of death
const MAX_UPDATE_STEPS: u32 = 5;

/// Source of monotonic time, measured from an arbitrary epoch
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle while the
/// loop owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by a number of seconds
    pub fn advance_secs(&self, secs: f32) {
        self.advance(Duration::from_secs_f32(secs.max(0.0)));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Loop timing state
pub struct GameLoop<T: TimeSource = SystemClock> {
    clock: T,

    /// Length of one fixed update
    timestep: Duration,

    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Duration,

    /// Time when the loop started
    start_time: Duration,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,
}

impl GameLoop<SystemClock> {
    /// Create a loop driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for GameLoop<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> GameLoop<T> {
    /// Create a loop driven by the given clock
    pub fn with_clock(clock: T) -> Self {
        let now = clock.now();
        Self {
            clock,
            timestep: Duration::from_secs_f32(FIXED_TIMESTEP),
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Use a different update rate. Rates of zero fall back to the default.
    pub fn with_update_rate(mut self, updates_per_second: u32) -> Self {
        self.timestep = if updates_per_second == 0 {
            Duration::from_secs_f32(FIXED_TIMESTEP)
        } else {
            Duration::from_secs_f64(1.0 / updates_per_second as f64)
        };
        self
    }

    /// Begin a new frame, returns the number of fixed updates to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = self.clock.now();
        let frame_time = now.saturating_sub(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= self.timestep && updates < MAX_UPDATE_STEPS {
            self.accumulator -= self.timestep;
            updates += 1;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Begin a frame and call `update` once per fixed step that is due.
    ///
    /// Returns the number of steps run.
    pub fn run_frame<F: FnMut(f32)>(&mut self, mut update: F) -> u32 {
        let steps = self.begin_frame();
        let dt = self.fixed_timestep();
        for _ in 0..steps {
            update(dt);
        }
        steps
    }

    /// Length of one fixed update in seconds
    pub fn fixed_timestep(&self) -> f32 {
        self.timestep.as_secs_f32()
    }

    /// Total elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.start_time)
    }

    /// Get total number of frames begun
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}
