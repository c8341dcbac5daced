// Interpolation helpers for timed moves

use glam::Vec2;

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease-out cubic: fast start, slow finish. `t` is clamped to [0, 1].
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Fraction of a timed move completed, in [0, 1].
///
/// A move with no duration is already complete.
pub fn move_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Position `t` of the way through an eased move from `from` to `to`
pub fn ease_position(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from.lerp(to, ease_out_cubic(t))
}
