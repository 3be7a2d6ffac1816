//! Move search and board scoring for the gatetris AI.
//!
//! The evaluator is layered:
//!
//! ```text
//! AutoPlayer (play a whole game)
//!     ↓ uses
//! MoveEvaluator (search every placement of a piece)
//!     ↓ uses
//! ScoringSystem (score one board)
//! ```
//!
//! - [`scoring`] - The eight board features, [`Weights`](scoring::Weights) and
//!   [`ScoringSystem`](scoring::ScoringSystem)
//! - [`move_evaluator`] - Exhaustive rotation × column search with optional one-piece
//!   lookahead, returning a [`SearchOutcome`](move_evaluator::SearchOutcome)
//! - [`worst_piece`] - A piece selector that hands out the shape the evaluator likes least
//! - [`auto_player`] - Drives a [`GameField`](gatetris_engine::GameField) with the
//!   evaluator until the game ends
//!
//! # Example
//!
//! ```
//! use gatetris_engine::{Board, Piece, Shape};
//! use gatetris_evaluator::{
//!     move_evaluator::MoveEvaluator,
//!     scoring::{ScoringSystem, Weights},
//! };
//!
//! let board = Board::from_ascii(20, "#######.##");
//! let evaluator = MoveEvaluator::new(ScoringSystem::new(Weights::FIXED));
//!
//! let piece = Piece::spawn(&board, Shape::I);
//! let preview = Piece::spawn(&board, Shape::T);
//! if let Some(mv) = evaluator.best_move(&board, piece, Some(preview)).found() {
//!     println!(
//!         "rotate {} times, shift {} columns (score {})",
//!         mv.rotation_delta(),
//!         mv.translation_delta(),
//!         mv.score()
//!     );
//! }
//! ```

pub mod auto_player;
pub mod move_evaluator;
pub mod scoring;
pub mod worst_piece;
