//! Headless AI play of a whole game.

use std::num::NonZeroUsize;

use gatetris_engine::{ApplyMoveError, Board, GameField, Piece};
use rand::Rng;
use serde::Serialize;

use crate::move_evaluator::{MoveEvaluator, SearchOutcome};

/// Options for [`AutoPlayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoPlayConfig {
    /// Score placements by the best follow-up placement of the preview piece.
    pub lookahead: bool,
    /// Stop after this many locked pieces.
    pub max_pieces: Option<usize>,
    /// Push a junk row in from the bottom after every `n` locked pieces.
    pub junk_every: Option<NonZeroUsize>,
}

/// Why an auto-played game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum GameEnd {
    /// A new piece collided at its spawn position.
    ToppedOut,
    /// The search found no placement for the falling piece.
    NoLegalPlacement,
    /// The configured piece limit was reached.
    PieceLimit,
}

/// Plays a [`GameField`] move by move with a [`MoveEvaluator`].
///
/// # Example
///
/// ```
/// use gatetris_engine::{GameField, PieceSeed, ShuffleBagSelector};
/// use gatetris_evaluator::auto_player::{AutoPlayConfig, AutoPlayer};
/// use gatetris_evaluator::move_evaluator::MoveEvaluator;
///
/// let config = AutoPlayConfig {
///     max_pieces: Some(20),
///     ..AutoPlayConfig::default()
/// };
/// let mut player = AutoPlayer::new(MoveEvaluator::default(), config);
/// let selector = ShuffleBagSelector::with_seed(PieceSeed::from_bytes([1; 16]));
/// let mut field = GameField::new(10, 20, Box::new(selector));
///
/// let end = player.play(&mut field, &mut rand::rng());
/// println!("{end:?} after {} pieces", field.stats().completed_pieces());
/// ```
#[derive(Debug)]
pub struct AutoPlayer {
    evaluator: MoveEvaluator,
    config: AutoPlayConfig,
    scratch: Board,
}

impl AutoPlayer {
    #[must_use]
    pub fn new(evaluator: MoveEvaluator, config: AutoPlayConfig) -> Self {
        Self {
            evaluator,
            config,
            scratch: Board::default(),
        }
    }

    /// Plays until the game ends. `rng` generates the junk rows.
    ///
    /// The final statistics are left in `field`.
    pub fn play<R>(&mut self, field: &mut GameField, rng: &mut R) -> GameEnd
    where
        R: Rng + ?Sized,
    {
        loop {
            if let Some(end) = self.play_turn(field, rng) {
                return end;
            }
        }
    }

    /// Places one piece, then adds a junk row if one is due.
    ///
    /// Returns `Some` once the game has ended.
    pub fn play_turn<R>(&mut self, field: &mut GameField, rng: &mut R) -> Option<GameEnd>
    where
        R: Rng + ?Sized,
    {
        if field.is_game_over() {
            return Some(GameEnd::ToppedOut);
        }
        if self
            .config
            .max_pieces
            .is_some_and(|max| field.stats().completed_pieces() >= max)
        {
            return Some(GameEnd::PieceLimit);
        }

        let piece = field.falling_piece();
        let preview = self
            .config
            .lookahead
            .then(|| Piece::spawn(field.board(), field.preview_shape()));
        let SearchOutcome::Found(mv) =
            self.evaluator
                .next_move(field.board(), piece, preview, &mut self.scratch)
        else {
            return Some(GameEnd::NoLegalPlacement);
        };

        match field.apply_move(mv.rotation_delta(), mv.translation_delta()) {
            Ok(_) => {}
            Err(ApplyMoveError::GameOver(_)) => return Some(GameEnd::ToppedOut),
            // searched moves only use free columns, so this means the field changed
            Err(ApplyMoveError::Collision(_)) => return Some(GameEnd::NoLegalPlacement),
        }

        if let Some(every) = self.config.junk_every
            && field.stats().completed_pieces() % every.get() == 0
            && field.add_junk_row(rng).is_err()
        {
            return Some(GameEnd::ToppedOut);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use gatetris_engine::{Cell, PieceSeed, PieceSelector, Shape, ShuffleBagSelector};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::scoring::{ScoringSystem, Weights};

    fn evaluator() -> MoveEvaluator {
        MoveEvaluator::new(ScoringSystem::new(Weights::new([
            -0.5, -1.0, -0.5, 0.0, -4.0, -1.0, -1.0, 3.0,
        ])))
    }

    fn field(seed: u8) -> GameField {
        let selector = ShuffleBagSelector::with_seed(PieceSeed::from_bytes([seed; 16]));
        GameField::new(10, 20, Box::new(selector))
    }

    #[derive(Debug)]
    struct OnlyO;

    impl PieceSelector for OnlyO {
        fn next_shape(&mut self, _board: &Board) -> Shape {
            Shape::O
        }
    }

    #[test]
    fn test_stops_at_piece_limit() {
        let config = AutoPlayConfig {
            max_pieces: Some(12),
            ..AutoPlayConfig::default()
        };
        let mut player = AutoPlayer::new(evaluator(), config);
        let mut field = field(5);
        let end = player.play(&mut field, &mut Pcg32::seed_from_u64(0));
        assert_eq!(end, GameEnd::PieceLimit);
        assert_eq!(field.stats().completed_pieces(), 12);
    }

    #[test]
    fn test_play_is_deterministic() {
        let config = AutoPlayConfig {
            lookahead: true,
            max_pieces: Some(30),
            junk_every: NonZeroUsize::new(5),
        };
        let mut results = Vec::new();
        for _ in 0..2 {
            let mut player = AutoPlayer::new(evaluator(), config);
            let mut field = field(9);
            let end = player.play(&mut field, &mut Pcg32::seed_from_u64(7));
            results.push((end, field.stats().clone(), field.board().clone()));
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_junk_row_added_after_piece() {
        let config = AutoPlayConfig {
            max_pieces: Some(1),
            junk_every: NonZeroUsize::new(1),
            ..AutoPlayConfig::default()
        };
        let mut player = AutoPlayer::new(evaluator(), config);
        let mut field = GameField::new(4, 20, Box::new(OnlyO));
        let end = player.play(&mut field, &mut Pcg32::seed_from_u64(3));
        assert_eq!(end, GameEnd::PieceLimit);
        assert!(field.board().row(0).contains(&Cell::Junk));
        assert!(field.board().row(1).contains(&Cell::Piece(Shape::O)));
    }

    #[test]
    fn test_finished_field_reports_top_out() {
        let mut field = GameField::new(4, 3, Box::new(OnlyO));
        assert!(field.hard_drop().is_err());
        let mut player = AutoPlayer::new(evaluator(), AutoPlayConfig::default());
        let end = player.play(&mut field, &mut Pcg32::seed_from_u64(0));
        assert!(end.is_topped_out());
        assert_eq!(field.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_game_end_serialization() {
        let json = serde_json::to_string(&GameEnd::NoLegalPlacement).unwrap();
        assert_eq!(json, "\"no_legal_placement\"");
    }
}
