use crate::Coord;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board size must be even and at least 2, got {0}")]
    InvalidBoardSize(Coord),
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Every pair value must appear on exactly two cells")]
    UnpairedValue,
}

pub type Result<T> = core::result::Result<T, GameError>;
