use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RowWidthMismatchError;

use super::piece::{Piece, Position, Shape, Tetromino};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Garbage inserted from below by a junk row.
    Junk,
    /// Locked block of a specific shape.
    Piece(Shape),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Junk => '#',
            Cell::Piece(shape) => shape.as_char(),
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            '#' => Some(Cell::Junk),
            _ => match Shape::from_char(c) {
                Some(shape) => Some(Cell::Piece(shape)),
                None => None,
            },
        }
    }
}

/// Rectangular playfield of [`Cell`]s.
///
/// # Coordinate System
///
/// - Column `x` grows rightwards from `0` to `width - 1`
/// - Row `y` grows upwards; row `0` is the bottom row
/// - Pieces may extend above the top row (the spawn area) but never past the
///   side walls or the floor
///
/// Cells are stored row-major starting from the bottom row, so row operations are
/// contiguous slice copies.
///
/// Cloning into an existing board with [`Clone::clone_from`] reuses its buffer when the
/// dimensions match, which makes a long-lived board a cheap scratch area for speculative
/// placements.
#[derive(PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.width = source.width;
        self.height = source.height;
        self.cells.clone_from(&source.cells);
    }
}

/// An empty 0×0 board, useful as a not-yet-sized scratch buffer.
impl Default for Board {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{}", self.width, self.height)?;
        fmt::Display::fmt(self, f)
    }
}

/// Renders the board top row first, one character per cell.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for cell in self.row(y) {
                write!(f, "{}", cell.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub const STANDARD_WIDTH: usize = 10;
    pub const STANDARD_HEIGHT: usize = 20;

    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must not be empty");
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Creates an empty 10×20 board.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Self::STANDARD_WIDTH, Self::STANDARD_HEIGHT)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Converts signed piece coordinates to a cell index, if they are on the board.
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(self.index(x, y))
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        let index = self.index(x, y);
        self.cells[index] = cell;
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..][..self.width]
    }

    fn row_mut(&mut self, y: usize) -> &mut [Cell] {
        &mut self.cells[y * self.width..][..self.width]
    }

    /// Checks whether the piece fits: every block is between the side walls, on or
    /// above the floor, and either above the top row or on an empty cell.
    #[must_use]
    pub fn can_place(&self, piece: Piece) -> bool {
        piece.cells().all(|(x, y)| {
            let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
                return false;
            };
            col < self.width && (row >= self.height || self.cell(col, row).is_empty())
        })
    }

    /// Returns the piece moved straight down as far as it goes.
    ///
    /// `piece` itself must fit; the result is the lowest collision-free position
    /// reachable without passing through occupied cells.
    #[must_use]
    pub fn simulate_drop_position(&self, piece: Piece) -> Piece {
        let mut dropped = piece;
        while self.can_place(dropped.down()) {
            dropped = dropped.down();
        }
        dropped
    }

    /// Checks if the piece cannot move down any further.
    #[must_use]
    pub fn is_resting(&self, piece: Piece) -> bool {
        !self.can_place(piece.down())
    }

    /// Locks a piece onto the board. Blocks above the top row are discarded.
    pub fn place(&mut self, piece: Piece) {
        let cell = Cell::Piece(piece.shape());
        for (x, y) in piece.cells() {
            if let Some(index) = self.cell_index(x, y) {
                self.cells[index] = cell;
            }
        }
    }

    /// Empties the cells covered by the piece; undoes [`Self::place`].
    pub fn remove(&mut self, piece: Piece) {
        for (x, y) in piece.cells() {
            if let Some(index) = self.cell_index(x, y) {
                self.cells[index] = Cell::Empty;
            }
        }
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y).iter().all(|cell| !cell.is_empty())
    }

    /// Counts rows with no empty cell.
    #[must_use]
    pub fn full_rows(&self) -> usize {
        (0..self.height).filter(|&y| self.is_row_full(y)).count()
    }

    /// Inserts `cells` as row `y`, pushing the rows at and above it up by one.
    /// The top row falls off the board.
    ///
    /// # Panics
    ///
    /// Panics if `y` is not below the board height.
    pub fn insert_row(&mut self, y: usize, cells: &[Cell]) -> Result<(), RowWidthMismatchError> {
        if cells.len() != self.width {
            return Err(RowWidthMismatchError {
                expected: self.width,
                actual: cells.len(),
            });
        }
        let w = self.width;
        self.cells.copy_within(y * w..(self.height - 1) * w, (y + 1) * w);
        self.row_mut(y).copy_from_slice(cells);
        Ok(())
    }

    /// Removes row `y`; rows above it move down and an empty row appears at the top.
    ///
    /// # Panics
    ///
    /// Panics if `y` is not below the board height.
    pub fn remove_row(&mut self, y: usize) {
        let w = self.width;
        self.cells.copy_within((y + 1) * w.., y * w);
        let top = self.height - 1;
        self.row_mut(top).fill(Cell::Empty);
    }

    /// Removes all full rows and returns how many were removed.
    pub fn clear_lines(&mut self) -> usize {
        let w = self.width;
        let mut count = 0;
        for y in 0..self.height {
            if self.is_row_full(y) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.cells.copy_within(y * w..(y + 1) * w, (y - count) * w);
            }
        }
        self.cells[(self.height - count) * w..].fill(Cell::Empty);
        count
    }

    /// Returns a copy of the board with every full row removed.
    #[must_use]
    pub fn without_full_rows(&self) -> Self {
        let mut board = self.clone();
        board.clear_lines();
        board
    }

    /// Height of column `x`: index of its topmost occupied cell plus one, or `0`.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        (0..self.height)
            .rev()
            .find(|&y| !self.cell(x, y).is_empty())
            .map_or(0, |y| y + 1)
    }

    #[must_use]
    pub fn column_heights(&self) -> Vec<usize> {
        (0..self.width).map(|x| self.column_height(x)).collect()
    }

    /// Returns where a tetromino enters the board: horizontally centred, with its
    /// top block on the top row.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn spawn_position(&self, tetromino: Tetromino) -> Position {
        let width = self.width as i32;
        let height = self.height as i32;
        Position::new(
            (width - tetromino.width()) / 2 - tetromino.min_dx(),
            height - 1 - tetromino.max_dy(),
        )
    }

    /// Creates a board from ASCII art for tests and fixtures.
    ///
    /// Rows are listed top to bottom and fill the bottom of a board `height` rows
    /// tall; the width is taken from the rows. `.` is empty, `#` is junk and a shape
    /// letter is a locked block of that shape. Blank lines and surrounding whitespace
    /// are ignored.
    ///
    /// # Panics
    ///
    /// Panics on unknown characters, ragged rows, or more rows than `height`.
    #[must_use]
    pub fn from_ascii(height: usize, art: &str) -> Self {
        let rows: Vec<Vec<Cell>> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|c| {
                        Cell::from_char(c).unwrap_or_else(|| panic!("invalid board cell {c:?}"))
                    })
                    .collect()
            })
            .collect();
        assert!(
            rows.len() <= height,
            "{} rows do not fit a board {height} rows tall",
            rows.len()
        );
        let width = rows.first().map_or(0, Vec::len);
        let mut board = Self::new(width, height);
        for (y, row) in rows.iter().rev().enumerate() {
            assert_eq!(
                row.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {y}",
                row.len()
            );
            board.row_mut(y).copy_from_slice(row);
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::Rotation;

    fn piece(shape: Shape, rotation: u8, x: i32, y: i32) -> Piece {
        Piece::new(
            Tetromino::with_rotation(shape, Rotation::new(rotation)),
            Position::new(x, y),
        )
    }

    #[test]
    fn test_from_ascii_places_rows_at_bottom() {
        let board = Board::from_ascii(
            5,
            r"
            T....
            ##.#I
            ",
        );
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 5);
        assert_eq!(board.cell(0, 1), Cell::Piece(Shape::T));
        assert_eq!(board.cell(0, 0), Cell::Junk);
        assert_eq!(board.cell(2, 0), Cell::Empty);
        assert_eq!(board.cell(4, 0), Cell::Piece(Shape::I));
        assert!(board.row(4).iter().all(|c| c.is_empty()));
        assert_eq!(board.to_string(), ".....\n.....\n.....\nT....\n##.#I\n");
    }

    #[test]
    fn test_can_place_walls_and_floor() {
        let board = Board::standard();
        let cases = [
            ("inside", piece(Shape::O, 0, 4, 0), true),
            ("past the left wall", piece(Shape::O, 0, -1, 0), false),
            ("past the right wall", piece(Shape::O, 0, 9, 0), false),
            ("below the floor", piece(Shape::O, 0, 4, -1), false),
            ("above the top row", piece(Shape::I, 1, 0, 22), true),
            ("partly above the top", piece(Shape::I, 1, 0, 19), true),
        ];
        for (name, piece, expected) in cases {
            assert_eq!(board.can_place(piece), expected, "{name}");
        }
    }

    #[test]
    fn test_can_place_detects_overlap() {
        let board = Board::from_ascii(
            4,
            r"
            ....
            .#..
            ",
        );
        assert!(!board.can_place(piece(Shape::O, 0, 0, 0)));
        // O covers the same cells in every rotation
        assert!(!board.can_place(piece(Shape::O, 2, 0, 0)));
        assert!(board.can_place(piece(Shape::O, 0, 2, 0)));
        assert!(board.can_place(piece(Shape::O, 2, 2, 0)));
        assert!(board.can_place(piece(Shape::O, 0, 1, 1)));
    }

    #[test]
    fn test_simulate_drop_position() {
        let board = Board::from_ascii(
            6,
            r"
            ......
            ..#...
            ..#...
            ",
        );
        let start = piece(Shape::O, 0, 1, 4);
        assert_eq!(board.simulate_drop_position(start).position(), Position::new(1, 2));
        let start = piece(Shape::O, 0, 3, 4);
        assert_eq!(board.simulate_drop_position(start).position(), Position::new(3, 0));
        assert!(board.is_resting(board.simulate_drop_position(start)));
        assert!(!board.is_resting(start));
    }

    #[test]
    fn test_place_and_remove_restore_board() {
        let original = Board::from_ascii(
            4,
            r"
            #...
            ##..
            ",
        );
        let mut board = original.clone();
        let t = piece(Shape::T, 0, 2, 1);
        board.place(t);
        assert_eq!(board.cell(0, 1), Cell::Junk);
        assert_eq!(board.cell(1, 1), Cell::Piece(Shape::T));
        assert_eq!(board.cell(3, 1), Cell::Piece(Shape::T));
        assert_eq!(board.cell(2, 2), Cell::Piece(Shape::T));
        board.remove(t);
        assert_eq!(board, original);
    }

    #[test]
    fn test_place_ignores_blocks_above_top() {
        let mut board = Board::new(4, 2);
        board.place(piece(Shape::I, 1, 0, 2));
        assert_eq!(board.column_height(0), 2);
        board.remove(piece(Shape::I, 1, 0, 2));
        assert_eq!(board, Board::new(4, 2));
    }

    #[test]
    fn test_clear_lines_collapses_rows() {
        let mut board = Board::from_ascii(
            5,
            r"
            .#...
            #####
            #.#..
            #####
            ",
        );
        assert_eq!(board.full_rows(), 2);
        assert_eq!(board.clear_lines(), 2);
        let expected = Board::from_ascii(
            5,
            r"
            .#...
            #.#..
            ",
        );
        assert_eq!(board, expected);
        assert_eq!(board.clear_lines(), 0);
    }

    #[test]
    fn test_clear_lines_whole_board() {
        let mut board = Board::from_ascii(
            2,
            r"
            ###
            ###
            ",
        );
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board, Board::new(3, 2));
    }

    #[test]
    fn test_without_full_rows_leaves_original() {
        let board = Board::from_ascii(
            3,
            r"
            #..
            ###
            ",
        );
        let collapsed = board.without_full_rows();
        assert_eq!(board.full_rows(), 1);
        assert_eq!(collapsed, Board::from_ascii(3, "#.."));
    }

    #[test]
    fn test_insert_row_pushes_stack_up() {
        let mut board = Board::from_ascii(
            3,
            r"
            I..
            .O.
            ..T
            ",
        );
        let junk = [Cell::Junk, Cell::Empty, Cell::Junk];
        board.insert_row(0, &junk).unwrap();
        let expected = Board::from_ascii(
            3,
            r"
            .O.
            ..T
            #.#
            ",
        );
        assert_eq!(board, expected);

        let err = board.insert_row(0, &[Cell::Junk]).unwrap_err();
        assert_eq!((err.expected, err.actual), (3, 1));
    }

    #[test]
    fn test_remove_row_empties_top() {
        let mut board = Board::from_ascii(
            3,
            r"
            ##.
            .##
            #..
            ",
        );
        board.remove_row(1);
        let expected = Board::from_ascii(
            3,
            r"
            ...
            ##.
            #..
            ",
        );
        assert_eq!(board, expected);
    }

    #[test]
    fn test_column_heights() {
        let board = Board::standard();
        assert_eq!(board.column_heights(), vec![0; 10]);

        let mut board = Board::standard();
        for y in 0..=5 {
            board.set_cell(3, y, Cell::Junk);
        }
        let mut expected = vec![0; 10];
        expected[3] = 6;
        assert_eq!(board.column_heights(), expected);

        let board = Board::from_ascii(
            4,
            r"
            .#..
            ....
            #..#
            ",
        );
        assert_eq!(board.column_heights(), vec![1, 3, 0, 1]);
    }

    #[test]
    fn test_spawn_position_is_centred_at_top() {
        let board = Board::standard();
        for shape in Shape::ALL {
            let spawned = Piece::spawn(&board, shape);
            assert!(board.can_place(spawned), "{shape:?}");
            let top = spawned.cells().map(|(_, y)| y).max().unwrap();
            assert_eq!(top, 19, "{shape:?}");
        }
        let o = Piece::spawn(&board, Shape::O);
        let columns: Vec<_> = o.cells().map(|(x, _)| x).collect();
        assert_eq!(columns, [4, 5, 4, 5]);
        let i = Piece::spawn(&board, Shape::I);
        let columns: Vec<_> = i.cells().map(|(x, _)| x).collect();
        assert_eq!(columns, [3, 4, 5, 6]);
    }

    #[test]
    fn test_clone_from_reuses_and_resizes() {
        let source = Board::from_ascii(3, "#.#");
        let mut scratch = Board::default();
        scratch.clone_from(&source);
        assert_eq!(scratch, source);

        scratch.set_cell(1, 0, Cell::Junk);
        scratch.clone_from(&source);
        assert_eq!(scratch, source);
    }

    #[test]
    #[should_panic]
    fn test_insert_row_above_top_panics() {
        let mut board = Board::new(3, 4);
        board.insert_row(4, &[Cell::Junk; 3]).ok();
    }

    #[test]
    #[should_panic]
    fn test_remove_row_above_top_panics() {
        let mut board = Board::new(3, 4);
        board.remove_row(4);
    }
}
