use rand::{Rng, seq::index};

use crate::{
    ApplyMoveError, GameOverError, PieceCollisionError,
    core::{
        board::{Board, Cell},
        piece::{Piece, Shape},
    },
};

use super::{
    game_stats::GameStats,
    piece_selector::{PieceSelector, PieceSequence},
};

/// State of a single game: the board, the falling piece, the preview shape and the
/// running statistics.
#[derive(Debug)]
pub struct GameField {
    board: Board,
    falling_piece: Piece,
    sequence: PieceSequence,
    stats: GameStats,
    game_over: bool,
}

impl GameField {
    /// Creates an empty `width`×`height` board and spawns the first piece.
    #[must_use]
    pub fn new(width: usize, height: usize, selector: Box<dyn PieceSelector>) -> Self {
        let board = Board::new(width, height);
        let sequence = PieceSequence::new(selector, &board);
        let falling_piece = Piece::spawn(&board, sequence.current());
        let game_over = !board.can_place(falling_piece);
        Self {
            board,
            falling_piece,
            sequence,
            stats: GameStats::new(),
            game_over,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    #[must_use]
    pub fn preview_shape(&self) -> Shape {
        self.sequence.preview()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.game_over || !self.board.can_place(piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn rotate_clockwise(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated_clockwise())
    }

    pub fn rotate_counter_clockwise(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated_counter_clockwise())
    }

    /// Moves the falling piece `dx` columns, one column at a time.
    ///
    /// Stops at the first blocked column; the piece keeps the last free position.
    pub fn shift(&mut self, dx: i32) -> Result<(), PieceCollisionError> {
        let step = dx.signum();
        for _ in 0..dx.abs() {
            self.set_falling_piece(self.falling_piece.shifted(step, 0))?;
        }
        Ok(())
    }

    pub fn soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.down())
    }

    /// Drops the falling piece, locks it, clears full rows and spawns the next piece.
    ///
    /// Returns the number of cleared lines, or [`GameOverError`] when the next piece
    /// does not fit at its spawn position.
    pub fn hard_drop(&mut self) -> Result<usize, GameOverError> {
        if self.game_over {
            return Err(GameOverError);
        }
        let landed = self.board.simulate_drop_position(self.falling_piece);
        self.board.place(landed);
        let cleared_lines = self.board.clear_lines();
        self.stats.complete_piece_drop(cleared_lines);
        self.spawn_next()?;
        Ok(cleared_lines)
    }

    /// Applies an AI move to the freshly spawned piece.
    ///
    /// The piece is turned clockwise `rotation_delta` times in place, shifted
    /// `translation_delta` columns, then hard dropped.
    pub fn apply_move(
        &mut self,
        rotation_delta: u8,
        translation_delta: i32,
    ) -> Result<usize, ApplyMoveError> {
        let rotated = (0..rotation_delta).fold(self.falling_piece, |piece, _| {
            piece.rotated_clockwise()
        });
        self.set_falling_piece(rotated)
            .map_err(ApplyMoveError::Collision)?;
        self.shift(translation_delta)
            .map_err(ApplyMoveError::Collision)?;
        self.hard_drop().map_err(ApplyMoveError::GameOver)
    }

    /// Pushes a junk row with random gaps in from the bottom.
    ///
    /// A falling piece that already rests on the stack is locked first so the stack
    /// does not rise into it. The row has between 1 and `width - 1` empty cells. If the
    /// falling piece overlaps the raised stack afterwards, the game is over.
    pub fn add_junk_row<R>(&mut self, rng: &mut R) -> Result<(), GameOverError>
    where
        R: Rng + ?Sized,
    {
        if self.game_over {
            return Err(GameOverError);
        }
        if self.board.is_resting(self.falling_piece) {
            self.hard_drop()?;
        }

        let width = self.board.width();
        let holes = rng.random_range(1..width.max(2));
        let mut row = vec![Cell::Junk; width];
        for x in index::sample(rng, width, holes.min(width)) {
            row[x] = Cell::Empty;
        }
        self.board.insert_row(0, &row).map_err(|_| GameOverError)?;

        if !self.board.can_place(self.falling_piece) {
            self.game_over = true;
            return Err(GameOverError);
        }
        Ok(())
    }

    fn spawn_next(&mut self) -> Result<(), GameOverError> {
        let shape = self.sequence.advance(&self.board);
        self.falling_piece = Piece::spawn(&self.board, shape);
        if !self.board.can_place(self.falling_piece) {
            self.game_over = true;
            return Err(GameOverError);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{PieceSeed, Position, ShuffleBagSelector};

    /// Hands out the given shapes in a loop.
    #[derive(Debug)]
    struct FixedSelector(Vec<Shape>, usize);

    impl PieceSelector for FixedSelector {
        fn next_shape(&mut self, _board: &Board) -> Shape {
            let shape = self.0[self.1 % self.0.len()];
            self.1 += 1;
            shape
        }
    }

    fn field_with(width: usize, height: usize, shapes: &[Shape]) -> GameField {
        GameField::new(width, height, Box::new(FixedSelector(shapes.to_vec(), 0)))
    }

    #[test]
    fn test_new_field_spawns_first_piece() {
        let field = field_with(10, 20, &[Shape::T, Shape::O]);
        assert_eq!(field.falling_piece().shape(), Shape::T);
        assert_eq!(field.preview_shape(), Shape::O);
        assert!(!field.is_game_over());
        let spawn = Piece::spawn(field.board(), Shape::T);
        assert_eq!(field.falling_piece(), spawn);
    }

    #[test]
    fn test_shift_stops_at_wall() {
        let mut field = field_with(10, 20, &[Shape::O]);
        assert!(field.shift(-4).is_ok());
        assert_eq!(field.falling_piece().position(), Position::new(0, 18));
        assert!(field.shift(-1).is_err());
        assert_eq!(field.falling_piece().position(), Position::new(0, 18));
    }

    #[test]
    fn test_hard_drop_clears_line_and_spawns_preview() {
        let mut field = field_with(4, 6, &[Shape::I, Shape::O]);
        // horizontal I fills the whole bottom row of a 4-wide board
        let cleared = field.hard_drop().unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(field.board(), &Board::new(4, 6));
        assert_eq!(field.falling_piece().shape(), Shape::O);
        assert_eq!(field.preview_shape(), Shape::I);
        assert_eq!(field.stats().total_cleared_lines(), 1);
        assert_eq!(field.stats().score(), 40);
        assert_eq!(field.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_apply_move_rotates_then_shifts() {
        let mut field = field_with(10, 20, &[Shape::I]);
        field.apply_move(1, 3).unwrap();
        let mut heights = vec![0; 10];
        heights[7] = 4;
        assert_eq!(field.board().column_heights(), heights);
    }

    #[test]
    fn test_apply_move_reports_collision() {
        let mut field = field_with(10, 20, &[Shape::O]);
        let err = field.apply_move(0, -6).unwrap_err();
        assert!(err.is_collision());
        assert_eq!(field.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_game_over_when_stack_reaches_spawn() {
        let mut field = field_with(4, 3, &[Shape::O]);
        let mut result = Ok(0);
        for _ in 0..4 {
            result = field.hard_drop();
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
        assert!(field.is_game_over());
        assert!(field.hard_drop().is_err());
        assert!(field.rotate_clockwise().is_err());
    }

    #[test]
    fn test_add_junk_row_raises_stack() {
        let mut field = GameField::new(
            10,
            20,
            Box::new(ShuffleBagSelector::with_seed(PieceSeed::from_bytes([7; 16]))),
        );
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..3 {
            field.add_junk_row(&mut rng).unwrap();
        }
        for y in 0..3 {
            let row = field.board().row(y);
            let holes = row.iter().filter(|c| c.is_empty()).count();
            assert!((1..10).contains(&holes), "row {y} has {holes} holes");
            assert!(row.iter().all(|c| matches!(c, Cell::Empty | Cell::Junk)));
        }
        assert!(field.board().row(3).iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_add_junk_row_locks_resting_piece() {
        let mut field = field_with(4, 6, &[Shape::O, Shape::T]);
        while field.soft_drop().is_ok() {}
        let mut rng = Pcg32::seed_from_u64(1);
        field.add_junk_row(&mut rng).unwrap();
        assert_eq!(field.stats().completed_pieces(), 1);
        assert_eq!(field.falling_piece().shape(), Shape::T);
        // the locked O now sits on top of the junk row
        assert_eq!(field.board().cell(1, 1), Cell::Piece(Shape::O));
        assert_eq!(field.board().cell(1, 2), Cell::Piece(Shape::O));
    }
}
