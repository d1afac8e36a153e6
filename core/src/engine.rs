use core::time::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// How long a mismatched pair stays face-up before the caller clears it.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Handle to the mismatch currently being shown. The caller that received it
/// from [`PlayEngine::reveal`] is expected to pass it back through
/// [`PlayEngine::clear_mismatch`] after [`MISMATCH_DELAY`]. The token is tied
/// to one board generation: after a `reset` it goes stale and clears nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClearToken {
    generation: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Selection {
    Empty,
    One(Coord2),
    MismatchPair(Coord2, Coord2),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayEngine {
    layout: PairLayout,
    solved: Array2<bool>,
    selection: Selection,
    solved_count: CellCount,
    state: EngineState,
    generation: u64,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl PlayEngine {
    pub fn new(layout: PairLayout) -> Self {
        let size = usize::from(layout.size());
        Self {
            layout,
            solved: Array2::default((size, size)),
            selection: Selection::Empty,
            solved_count: 0,
            state: Default::default(),
            generation: 0,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn size(&self) -> Coord {
        self.layout.size()
    }

    pub fn game_config(&self) -> GameConfig {
        self.layout.game_config()
    }

    pub fn pair_count(&self) -> PairValue {
        self.layout.pair_count()
    }

    pub fn solved_count(&self) -> CellCount {
        self.solved_count
    }

    pub fn is_won(&self) -> bool {
        self.solved_count == self.layout.total_cells()
    }

    pub fn mismatch_pending(&self) -> bool {
        matches!(self.selection, Selection::MismatchPair(..))
    }

    pub fn is_selected(&self, coords: Coord2) -> bool {
        match self.selection {
            Selection::Empty => false,
            Selection::One(first) => first == coords,
            Selection::MismatchPair(first, second) => first == coords || second == coords,
        }
    }

    pub fn face_at(&self, coords: Coord2) -> CardFace {
        if self.solved[coords.to_nd_index()] {
            CardFace::Solved(self.layout[coords])
        } else if self.is_selected(coords) {
            CardFace::Up(self.layout[coords])
        } else {
            CardFace::Down
        }
    }

    /// Read-only snapshot of the whole board for renderers. Face-down cards
    /// carry no value, so the snapshot cannot be used to peek.
    pub fn faces(&self) -> Array2<CardFace> {
        let size = usize::from(self.size());
        Array2::from_shape_fn((size, size), |(row, col)| {
            self.face_at((row as Coord, col as Coord))
        })
    }

    /// How many seconds have passed since the first card went up, frozen at
    /// the moment the board was won; 0 before the game started.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            let end = self.ended_at.unwrap_or_else(Instant::now);
            end.duration_since(started_at).as_secs() as u32
        } else {
            0
        }
    }

    /// Turn a card face-up. Revealing a solved or already-selected card, or
    /// any card while a mismatch is still being shown, changes nothing.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.layout.validate_coords(coords)?;

        if self.solved[coords.to_nd_index()] || self.is_selected(coords) {
            return Ok(NoChange);
        }

        Ok(match self.selection {
            Selection::MismatchPair(..) => NoChange,
            Selection::Empty => {
                self.selection = Selection::One(coords);
                self.mark_started();
                FirstUp
            }
            Selection::One(first) => {
                if self.layout[first] == self.layout[coords] {
                    self.solved[first.to_nd_index()] = true;
                    self.solved[coords.to_nd_index()] = true;
                    self.solved_count += 2;
                    self.selection = Selection::Empty;

                    if self.is_won() {
                        self.end_game();
                        Won
                    } else {
                        Matched
                    }
                } else {
                    self.selection = Selection::MismatchPair(first, coords);
                    Mismatch(ClearToken {
                        generation: self.generation,
                    })
                }
            }
        })
    }

    /// Puts a shown mismatch back face-down. Tokens minted before the last
    /// `reset` belong to a discarded board and are ignored.
    pub fn clear_mismatch(&mut self, token: ClearToken) -> ClearOutcome {
        use ClearOutcome::*;

        if token.generation != self.generation {
            log::debug!(
                "Ignoring clear token from board generation {}",
                token.generation
            );
            return NoChange;
        }

        match self.selection {
            Selection::MismatchPair(..) => {
                self.selection = Selection::Empty;
                Cleared
            }
            _ => NoChange,
        }
    }

    /// Replaces the board wholesale with a freshly generated layout. Bumping
    /// the generation makes every outstanding [`ClearToken`] stale, so a
    /// mismatch clear scheduled against the old board cannot touch this one.
    pub fn reset(&mut self, layout: PairLayout) {
        let size = usize::from(layout.size());
        self.generation += 1;
        self.layout = layout;
        self.solved = Array2::default((size, size));
        self.selection = Selection::Empty;
        self.solved_count = 0;
        self.state = EngineState::Ready;
        self.started_at = None;
        self.ended_at = None;
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            self.state = EngineState::Active;
            self.started_at = Some(Instant::now());
        }
    }

    fn end_game(&mut self) {
        self.state = EngineState::Won;
        self.ended_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord, values: &[PairValue]) -> PairLayout {
        let size = usize::from(size);
        let values = Array2::from_shape_vec((size, size), values.to_vec()).unwrap();
        PairLayout::from_values(values).unwrap()
    }

    #[test]
    fn first_reveal_turns_the_card_up() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::FirstUp);
        assert!(engine.is_selected((0, 0)));
        assert_eq!(engine.face_at((0, 0)), CardFace::Up(0));
        assert_eq!(engine.face_at((0, 1)), CardFace::Down);
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn matching_pair_solves_both_synchronously() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        engine.reveal((0, 0)).unwrap();
        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Matched);
        assert_eq!(engine.face_at((0, 0)), CardFace::Solved(0));
        assert_eq!(engine.face_at((1, 1)), CardFace::Solved(0));
        assert!(!engine.mismatch_pending());
        assert!(!engine.is_selected((0, 0)));
        assert!(!engine.is_selected((1, 1)));
        assert_eq!(engine.solved_count(), 2);
        assert!(!engine.is_won());
    }

    #[test]
    fn mismatch_stays_shown_until_cleared() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        engine.reveal((0, 0)).unwrap();
        let RevealOutcome::Mismatch(token) = engine.reveal((0, 1)).unwrap() else {
            panic!("expected a mismatch");
        };

        assert!(engine.mismatch_pending());
        assert_eq!(engine.face_at((0, 0)), CardFace::Up(0));
        assert_eq!(engine.face_at((0, 1)), CardFace::Up(1));

        // the board is frozen while the mismatch is shown
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::NoChange);
        assert!(!engine.is_selected((1, 0)));

        assert_eq!(engine.clear_mismatch(token), ClearOutcome::Cleared);
        assert!(!engine.mismatch_pending());
        assert_eq!(engine.face_at((0, 0)), CardFace::Down);
        assert_eq!(engine.face_at((0, 1)), CardFace::Down);
        assert_eq!(engine.solved_count(), 0);

        // and accepts reveals again afterwards
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::FirstUp);
    }

    #[test]
    fn reveal_on_solved_card_is_a_noop() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));
        engine.reveal((0, 0)).unwrap();
        engine.reveal((1, 1)).unwrap();

        let before = engine.clone();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
    }

    #[test]
    fn reveal_on_selected_card_is_a_noop() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));
        engine.reveal((0, 0)).unwrap();

        let before = engine.clone();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
        assert!(engine.is_selected((0, 0)));
    }

    #[test]
    fn solving_the_last_pair_wins() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Matched);
        engine.reveal((0, 1)).unwrap();
        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Won);

        assert!(engine.is_won());
        assert_eq!(engine.state(), EngineState::Won);

        // a won board has nothing left to reveal
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
    }

    #[test]
    fn is_won_requires_every_cell_solved() {
        let mut engine = PlayEngine::new(layout(4, &[
            0, 0, 1, 1, //
            2, 2, 3, 3, //
            4, 4, 5, 5, //
            6, 6, 7, 7,
        ]));

        for pair in 0..7u8 {
            let row = pair / 2;
            let col = (pair % 2) * 2;
            engine.reveal((row, col)).unwrap();
            engine.reveal((row, col + 1)).unwrap();
        }

        // one pair left unsolved
        assert!(!engine.is_won());
        engine.reveal((3, 2)).unwrap();
        assert_eq!(engine.reveal((3, 3)).unwrap(), RevealOutcome::Won);
        assert!(engine.is_won());
    }

    #[test]
    fn reset_invalidates_outstanding_clear_token() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        engine.reveal((0, 0)).unwrap();
        let RevealOutcome::Mismatch(stale) = engine.reveal((0, 1)).unwrap() else {
            panic!("expected a mismatch");
        };

        engine.reset(layout(2, &[1, 0, 0, 1]));
        assert!(!engine.mismatch_pending());
        assert_eq!(engine.state(), EngineState::Ready);

        // the stale timer firing against the new board changes nothing
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::FirstUp);
        assert_eq!(engine.clear_mismatch(stale), ClearOutcome::NoChange);
        assert!(engine.is_selected((0, 0)));
    }

    #[test]
    fn reset_replaces_the_board_wholesale() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));
        engine.reveal((0, 0)).unwrap();
        engine.reveal((1, 1)).unwrap();

        engine.reset(layout(4, &[
            0, 0, 1, 1, //
            2, 2, 3, 3, //
            4, 4, 5, 5, //
            6, 6, 7, 7,
        ]));

        assert_eq!(engine.size(), 4);
        assert_eq!(engine.solved_count(), 0);
        assert_eq!(engine.elapsed_secs(), 0);
        assert!(engine.faces().iter().all(|&face| face == CardFace::Down));
    }

    #[test]
    fn out_of_bounds_reveal_fails() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));

        assert_eq!(engine.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.reveal((0, 2)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn faces_serialize_for_renderers() {
        let mut engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));
        engine.reveal((0, 0)).unwrap();

        let row: Vec<CardFace> = engine.faces().row(0).to_vec();
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[{"Up":0},"Down"]"#);
    }

    #[test]
    fn elapsed_is_zero_before_the_first_reveal() {
        let engine = PlayEngine::new(layout(2, &[0, 1, 1, 0]));
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.elapsed_secs(), 0);
    }
}
