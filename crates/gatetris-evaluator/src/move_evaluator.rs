//! Move search: picking the best placement for the falling piece.
//!
//! # How It Works
//!
//! 1. **Rotate** - Try the four clockwise rotations of the piece at its spawn position,
//!    skipping rotations that collide there
//! 2. **Reach** - Walk left and right one column at a time until the piece is blocked
//! 3. **Drop** - Hard drop every reachable column, place the piece on a scratch board and
//!    score the result (or, with a preview piece, score the best follow-up placement)
//! 4. **Select** - Keep the highest score; on ties the first candidate wins
//!
//! Columns are visited nearest first (`0, +1, -1, +2, -2, ...`), so among equally scored
//! placements the one needing the fewest moves is kept.
//!
//! All trial placements happen on a scratch board owned by the caller. The board being
//! searched is only read.

use std::iter;

use gatetris_engine::{Board, Piece};

use crate::scoring::ScoringSystem;

/// A placement relative to the piece as it was given to the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    rotation_delta: u8,
    translation_delta: i32,
    score: f64,
}

impl Move {
    /// Number of clockwise quarter turns to apply at the spawn position (`0..4`).
    #[must_use]
    pub fn rotation_delta(&self) -> u8 {
        self.rotation_delta
    }

    /// Columns to shift after rotating; negative is left.
    #[must_use]
    pub fn translation_delta(&self) -> i32 {
        self.translation_delta
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the piece at its landing position after this move.
    #[must_use]
    pub fn landing_piece(&self, board: &Board, piece: Piece) -> Piece {
        let rotated = (0..self.rotation_delta).fold(piece, |p, _| p.rotated_clockwise());
        board.simulate_drop_position(rotated.shifted(self.translation_delta, 0))
    }
}

/// Result of a move search.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum SearchOutcome {
    Found(Move),
    /// The piece collides at its spawn position in every rotation.
    NoLegalPlacement,
}

impl SearchOutcome {
    #[must_use]
    pub fn found(self) -> Option<Move> {
        match self {
            Self::Found(mv) => Some(mv),
            Self::NoLegalPlacement => None,
        }
    }

    /// Score of the found move; `NoLegalPlacement` ranks below every placement.
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Self::Found(mv) => mv.score,
            Self::NoLegalPlacement => f64::NEG_INFINITY,
        }
    }
}

/// Searches all placements of a piece and returns the best one by [`ScoringSystem`].
///
/// # Example
///
/// ```
/// use gatetris_engine::{Board, Piece, Shape};
/// use gatetris_evaluator::{move_evaluator::MoveEvaluator, scoring::ScoringSystem};
///
/// let evaluator = MoveEvaluator::new(ScoringSystem::default());
/// let board = Board::standard();
/// let mut scratch = Board::default();
///
/// let piece = Piece::spawn(&board, Shape::O);
/// let mv = evaluator.next_move(&board, piece, None, &mut scratch).found().unwrap();
/// assert_eq!((mv.rotation_delta(), mv.translation_delta()), (0, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MoveEvaluator {
    scoring: ScoringSystem,
}

impl MoveEvaluator {
    #[must_use]
    pub fn new(scoring: ScoringSystem) -> Self {
        Self { scoring }
    }

    #[must_use]
    pub fn scoring(&self) -> &ScoringSystem {
        &self.scoring
    }

    /// Finds the best move for `piece`, optionally looking one piece ahead.
    ///
    /// `piece` and `preview` are expected at their spawn positions. With a preview, every
    /// placement of `piece` is scored by the best placement of `preview` on the board that
    /// results (full rows are left in place for that second search).
    ///
    /// `scratch` is overwritten with a copy of `board` and holds that copy again when the
    /// search returns; its buffer is reused across calls.
    pub fn next_move(
        &self,
        board: &Board,
        piece: Piece,
        preview: Option<Piece>,
        scratch: &mut Board,
    ) -> SearchOutcome {
        scratch.clone_from(board);
        self.search(scratch, piece, preview)
    }

    /// Like [`Self::next_move`], with a scratch board allocated for this call.
    #[must_use]
    pub fn best_move(&self, board: &Board, piece: Piece, preview: Option<Piece>) -> SearchOutcome {
        let mut scratch = Board::default();
        self.next_move(board, piece, preview, &mut scratch)
    }

    fn search(&self, board: &mut Board, piece: Piece, preview: Option<Piece>) -> SearchOutcome {
        let mut best: Option<Move> = None;

        for (tetromino, rotation_delta) in piece.tetromino().rotations().into_iter().zip(0u8..) {
            let rotated = Piece::new(tetromino, piece.position());
            if !board.can_place(rotated) {
                continue;
            }
            let right = reach(board, rotated, 1);
            let left = reach(board, rotated, -1);

            for translation_delta in nearest_first(left.max(right)) {
                if translation_delta < -left || translation_delta > right {
                    continue;
                }
                let landed = board.simulate_drop_position(rotated.shifted(translation_delta, 0));
                board.place(landed);
                let score = match preview {
                    Some(next) => self.search(board, next, None).score(),
                    None => self.scoring.score(board),
                };
                board.remove(landed);

                if best.is_none_or(|b| score > b.score) {
                    best = Some(Move {
                        rotation_delta,
                        translation_delta,
                        score,
                    });
                }
            }
        }

        best.map_or(SearchOutcome::NoLegalPlacement, SearchOutcome::Found)
    }
}

/// Number of free single-column steps from `piece` in direction `step`.
fn reach(board: &Board, piece: Piece, step: i32) -> i32 {
    let mut distance = 0;
    while board.can_place(piece.shifted(step * (distance + 1), 0)) {
        distance += 1;
    }
    distance
}

/// `0, 1, -1, 2, -2, ..., max, -max`
fn nearest_first(max: i32) -> impl Iterator<Item = i32> {
    iter::once(0).chain((1..=max).flat_map(|d| [d, -d]))
}
