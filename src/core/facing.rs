// Left/right facing derived from movement on the hex grid

use super::hex::AxialCoord;
use serde::{Deserialize, Serialize};

/// Horizontal orientation of a character sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Whether the sprite should be mirrored (sprites are drawn facing right)
    pub fn is_flipped(&self) -> bool {
        matches!(self, Facing::Left)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

/// Facing needed to look from `from` towards `to`.
///
/// Only the `q` axis counts. With no lateral motion `current` is kept.
pub fn get_facing_direction(from: AxialCoord, to: AxialCoord, current: Facing) -> Facing {
    let delta_q = to.q - from.q;
    if delta_q > 0 {
        Facing::Right
    } else if delta_q < 0 {
        Facing::Left
    } else {
        current
    }
}
