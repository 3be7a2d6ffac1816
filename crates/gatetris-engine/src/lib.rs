//! Board, tetromino and game-flow primitives for the gatetris AI.
//!
//! - [`core`] holds the data structures: the variable-size [`Board`], the seven
//!   [`Shape`]s with their precomputed rotation table, and [`Piece`] (a tetromino at a
//!   board position).
//! - [`engine`] drives a game on top of them: piece selection, the [`GameField`] that
//!   owns the falling piece, and [`GameStats`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when moving falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("new piece collides with the stack at its spawn position")]
pub struct GameOverError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("row has {actual} cells but the board is {expected} columns wide")]
pub struct RowWidthMismatchError {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum ApplyMoveError {
    #[display("piece colliding while applying move")]
    Collision(PieceCollisionError),
    #[display("game over while applying move")]
    GameOver(GameOverError),
}
