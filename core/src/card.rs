use serde::{Deserialize, Serialize};

use crate::PairValue;

/// Player-visible state of a single card, as exposed to renderers.
///
/// Hidden pair values never leak through this type: a `Down` card carries no
/// value at all.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CardFace {
    Down,
    Up(PairValue),
    Solved(PairValue),
}

impl CardFace {
    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::Up(_) | Self::Solved(_))
    }

    pub const fn is_solved(self) -> bool {
        matches!(self, Self::Solved(_))
    }
}

impl Default for CardFace {
    fn default() -> Self {
        Self::Down
    }
}
