//! Adversarial piece selection.

use gatetris_engine::{Board, Piece, PieceSelector, Shape};

use crate::move_evaluator::MoveEvaluator;

/// Hands out the shape whose best placement scores lowest on the current board.
///
/// Every shape is searched at its spawn position with the wrapped evaluator. A shape
/// that cannot be placed at all counts as negative infinity, so it is chosen first. On
/// ties the shape listed first in [`Shape::ALL`] wins.
#[derive(Debug)]
pub struct WorstPieceSelector {
    evaluator: MoveEvaluator,
    scratch: Board,
}

impl WorstPieceSelector {
    #[must_use]
    pub fn new(evaluator: MoveEvaluator) -> Self {
        Self {
            evaluator,
            scratch: Board::default(),
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &MoveEvaluator {
        &self.evaluator
    }
}

impl PieceSelector for WorstPieceSelector {
    fn next_shape(&mut self, board: &Board) -> Shape {
        let mut worst = Shape::ALL[0];
        let mut worst_score = f64::INFINITY;
        for shape in Shape::ALL {
            let piece = Piece::spawn(board, shape);
            let score = self
                .evaluator
                .next_move(board, piece, None, &mut self.scratch)
                .score();
            if score < worst_score {
                worst = shape;
                worst_score = score;
            }
        }
        worst
    }
}
