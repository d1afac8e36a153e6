use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod card;
mod engine;
mod error;
mod generator;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    size: Coord,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord) -> Self {
        Self { size }
    }

    /// A playable board is square with an even side of at least 2; anything
    /// else cannot satisfy the pairing invariant.
    pub fn new(size: Coord) -> Result<Self> {
        if size >= 2 && size % 2 == 0 {
            Ok(Self::new_unchecked(size))
        } else {
            Err(GameError::InvalidBoardSize(size))
        }
    }

    pub const fn size(&self) -> Coord {
        self.size
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }

    pub const fn pair_count(&self) -> PairValue {
        self.total_cells() / 2
    }
}

/// The hidden value assignment produced by a generator: one `PairValue` per
/// cell, each value on exactly two cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairLayout {
    values: Array2<PairValue>,
    config: GameConfig,
}

impl PairLayout {
    /// Builds a layout from raw values, checking the pairing invariant.
    /// Mostly useful for fixed boards in tests and puzzles; random boards
    /// come from a [`LayoutGenerator`].
    pub fn from_values(values: Array2<PairValue>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows != cols {
            return Err(GameError::InvalidBoardShape);
        }
        let size: Coord = rows.try_into().map_err(|_| GameError::InvalidBoardShape)?;
        let config = GameConfig::new(size)?;

        let mut occurrences: Vec<CellCount> = vec![0; config.pair_count() as usize];
        for &value in &values {
            let slot = occurrences
                .get_mut(value as usize)
                .ok_or(GameError::UnpairedValue)?;
            *slot += 1;
        }
        if occurrences.iter().any(|&count| count != 2) {
            return Err(GameError::UnpairedValue);
        }

        Ok(Self { values, config })
    }

    pub fn game_config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord {
        self.config.size()
    }

    pub fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    pub fn pair_count(&self) -> PairValue {
        self.config.pair_count()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

impl Index<Coord2> for PairLayout {
    type Output = PairValue;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.values[coords.to_nd_index()]
    }
}

/// Outcome of revealing a card
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    FirstUp,
    Matched,
    Mismatch(ClearToken),
    Won,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            FirstUp => true,
            Matched => true,
            Mismatch(_) => true,
            Won => true,
        }
    }
}

/// Outcome of clearing a shown mismatch
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClearOutcome {
    NoChange,
    Cleared,
}

impl ClearOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Cleared => true,
        }
    }
}
