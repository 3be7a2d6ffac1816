use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::board::Board;

/// Offset of a block from the piece pivot as `(dx, dy)`, with `dy` pointing up.
pub type BlockOffset = (i32, i32);

/// A tetromino placed at a position on a [`Board`].
///
/// Pieces are immutable values: movement and rotation return new instances. Rotation
/// turns the blocks around the pivot without wall kicks, so a rotated piece may need a
/// collision check before use.
///
/// # Example
///
/// ```
/// use gatetris_engine::{Board, Piece, Shape};
///
/// let board = Board::standard();
/// let piece = Piece::spawn(&board, Shape::T);
/// assert!(board.can_place(piece));
///
/// let moved = piece.shifted(-1, 0).rotated_clockwise();
/// assert!(board.can_place(moved));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    tetromino: Tetromino,
    position: Position,
}

impl Piece {
    #[must_use]
    pub const fn new(tetromino: Tetromino, position: Position) -> Self {
        Self {
            tetromino,
            position,
        }
    }

    /// Creates a piece of `shape` in spawn orientation at the board's spawn position.
    #[must_use]
    pub fn spawn(board: &Board, shape: Shape) -> Self {
        let tetromino = Tetromino::new(shape);
        Self::new(tetromino, board.spawn_position(tetromino))
    }

    #[must_use]
    pub const fn tetromino(&self) -> Tetromino {
        self.tetromino
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.tetromino.shape()
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the board coordinates `(x, y)` of the four blocks.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let Position { x, y } = self.position;
        self.tetromino
            .blocks()
            .iter()
            .map(move |&(dx, dy)| (x + dx, y + dy))
    }

    #[must_use]
    pub const fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.tetromino, self.position.shifted(dx, dy))
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        self.shifted(0, -1)
    }

    #[must_use]
    pub const fn rotated_clockwise(&self) -> Self {
        Self::new(self.tetromino.rotated_clockwise(), self.position)
    }

    #[must_use]
    pub const fn rotated_counter_clockwise(&self) -> Self {
        Self::new(self.tetromino.rotated_counter_clockwise(), self.position)
    }
}

/// Board position of a piece pivot.
///
/// `x` counts columns from the left edge, `y` counts rows from the bottom. Either may
/// fall outside the board while a move is being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotation state of a tetromino.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// Number of clockwise quarter turns from the spawn orientation.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_counter_clockwise(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A shape in one of its rotation states.
///
/// Block offsets come from a table built at compile time, so tetrominoes are plain
/// `Copy` values and two equal tetrominoes always share the same blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    shape: Shape,
    rotation: Rotation,
}

impl Tetromino {
    /// Creates a tetromino in spawn orientation.
    #[must_use]
    pub const fn new(shape: Shape) -> Self {
        Self::with_rotation(shape, Rotation::SPAWN)
    }

    #[must_use]
    pub const fn with_rotation(shape: Shape, rotation: Rotation) -> Self {
        Self { shape, rotation }
    }

    #[must_use]
    pub const fn shape(self) -> Shape {
        self.shape
    }

    #[must_use]
    pub const fn rotation(self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn blocks(self) -> &'static [BlockOffset; 4] {
        &BLOCK_TABLE[self.shape as usize][self.rotation.as_usize()]
    }

    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        Self::with_rotation(self.shape, self.rotation.rotated_clockwise())
    }

    #[must_use]
    pub const fn rotated_counter_clockwise(self) -> Self {
        Self::with_rotation(self.shape, self.rotation.rotated_counter_clockwise())
    }

    /// Returns this tetromino followed by its clockwise successors, stopping at the
    /// first state whose blocks repeat an earlier one.
    ///
    /// The `n`-th entry is reached with `n` clockwise turns; `O` yields one state.
    #[must_use]
    pub fn rotations(self) -> ArrayVec<Self, 4> {
        let mut rotations: ArrayVec<Self, 4> = ArrayVec::new();
        let mut current = self;
        while !rotations.iter().any(|seen| seen.blocks() == current.blocks()) {
            rotations.push(current);
            current = current.rotated_clockwise();
        }
        rotations
    }

    #[must_use]
    pub fn min_dx(self) -> i32 {
        self.blocks().iter().map(|&(dx, _)| dx).min().unwrap_or(0)
    }

    #[must_use]
    pub fn max_dx(self) -> i32 {
        self.blocks().iter().map(|&(dx, _)| dx).max().unwrap_or(0)
    }

    #[must_use]
    pub fn min_dy(self) -> i32 {
        self.blocks().iter().map(|&(_, dy)| dy).min().unwrap_or(0)
    }

    #[must_use]
    pub fn max_dy(self) -> i32 {
        self.blocks().iter().map(|&(_, dy)| dy).max().unwrap_or(0)
    }

    /// Number of columns spanned by the blocks.
    #[must_use]
    pub fn width(self) -> i32 {
        self.max_dx() - self.min_dx() + 1
    }

    /// Number of rows spanned by the blocks.
    #[must_use]
    pub fn height(self) -> i32 {
        self.max_dy() - self.min_dy() + 1
    }
}

/// The seven tetromino shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum Shape {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        Shape::ALL[rng.random_range(0..Shape::LEN)]
    }
}

impl Shape {
    /// Number of shapes (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Returns the single character representation of this shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatetris_engine::Shape;
    ///
    /// assert_eq!(Shape::I.as_char(), 'I');
    /// assert_eq!(Shape::Z.as_char(), 'Z');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::J => 'J',
            Self::L => 'L',
            Self::O => 'O',
            Self::S => 'S',
            Self::T => 'T',
            Self::Z => 'Z',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            'O' => Some(Self::O),
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }
}

/// Generates the four rotation states of a shape by turning it 90° clockwise.
///
/// With `dy` pointing up, a clockwise quarter turn maps `(dx, dy)` to `(dy, -dx)`.
/// Shapes that look the same in every orientation (the O piece) keep their spawn
/// offsets so they do not drift around the pivot.
const fn rotations(spawn: [BlockOffset; 4], rotates: bool) -> [[BlockOffset; 4]; 4] {
    let mut table = [spawn; 4];
    if !rotates {
        return table;
    }
    let mut r = 1;
    while r < 4 {
        let mut i = 0;
        while i < 4 {
            let (dx, dy) = table[r - 1][i];
            table[r][i] = (dy, -dx);
            i += 1;
        }
        r += 1;
    }
    table
}

const BLOCK_TABLE: [[[BlockOffset; 4]; 4]; Shape::LEN] = [
    // I: ####
    rotations([(-1, 0), (0, 0), (1, 0), (2, 0)], true),
    // J: #..
    //    ###
    rotations([(-1, 1), (-1, 0), (0, 0), (1, 0)], true),
    // L: ..#
    //    ###
    rotations([(-1, 0), (0, 0), (1, 0), (1, 1)], true),
    // O: ##
    //    ##
    rotations([(0, 0), (1, 0), (0, 1), (1, 1)], false),
    // S: .##
    //    ##.
    rotations([(-1, 0), (0, 0), (0, 1), (1, 1)], true),
    // T: .#.
    //    ###
    rotations([(-1, 0), (0, 0), (1, 0), (0, 1)], true),
    // Z: ##.
    //    .##
    rotations([(-1, 1), (0, 1), (0, 0), (1, 0)], true),
];
