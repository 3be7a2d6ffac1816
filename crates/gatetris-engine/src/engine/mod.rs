//! Game flow on top of the core data structures.
//!
//! - [`GameField`] - Board, falling piece, preview piece and statistics for one game
//! - [`GameStats`] - Lines cleared, score, level and pieces dropped
//! - [`PieceSelector`] - Source of the next shape ([`ShuffleBagSelector`],
//!   [`RandomSelector`], or a board-aware selector supplied by the caller)
//! - [`PieceSequence`] - Current and preview shapes drawn from a selector
//!
//! # Game Flow
//!
//! 1. Create a [`GameField`] with a selector; the first piece spawns at the top
//! 2. Rotate and shift the falling piece, or let an AI apply a whole move at once
//! 3. Hard drop: the piece locks, full rows clear, the preview piece spawns
//! 4. Repeat until the spawned piece collides with the stack (top-out)
//!
//! # Example
//!
//! ```
//! use gatetris_engine::{GameField, ShuffleBagSelector};
//!
//! let mut field = GameField::new(10, 20, Box::new(ShuffleBagSelector::new()));
//!
//! field.rotate_clockwise().ok();
//! field.shift(-2).ok();
//!
//! match field.hard_drop() {
//!     Ok(cleared_lines) => println!("cleared {cleared_lines} lines"),
//!     Err(_) => println!("Game over!"),
//! }
//! ```

pub use self::{game_field::*, game_stats::*, piece_selector::*};

mod game_field;
mod game_stats;
mod piece_selector;
