use std::fmt::{self, Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Board, Shape};

/// Source of the shapes that enter a game.
///
/// Selectors receive the board at the moment the shape is drawn, so adversarial
/// selectors can pick the shape that fits worst.
pub trait PieceSelector: fmt::Debug {
    fn next_shape(&mut self, board: &Board) -> Shape;
}

/// Seed for deterministic piece generation.
///
/// A 128-bit (16-byte) seed for the PCG generator behind the built-in selectors. The
/// same seed always produces the same shape sequence. Serialized as a 32 character
/// hex string.
///
/// # Example
///
/// ```
/// use gatetris_engine::{Board, PieceSeed, PieceSelector as _, ShuffleBagSelector};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let board = Board::standard();
///
/// let mut a = ShuffleBagSelector::with_seed(seed);
/// let mut b = ShuffleBagSelector::with_seed(seed);
/// assert_eq!(a.next_shape(&board), b.next_shape(&board));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns a fresh generator seeded with this seed.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// 7-bag randomizer.
///
/// 1. Put one of each of the 7 shapes into a bag
/// 2. Shuffle the bag
/// 3. Hand shapes out in order until the bag is empty, then start over
///
/// Every run of 7 consecutive draws aligned to a bag contains each shape once, which
/// rules out long droughts.
#[derive(Debug, Clone)]
pub struct ShuffleBagSelector {
    rng: Pcg32,
    bag: Vec<Shape>,
}

impl Default for ShuffleBagSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleBagSelector {
    /// Creates a selector with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: seed.rng(),
            bag: Vec::with_capacity(Shape::LEN),
        }
    }
}

impl PieceSelector for ShuffleBagSelector {
    fn next_shape(&mut self, _board: &Board) -> Shape {
        if self.bag.is_empty() {
            let mut new_bag = Shape::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
        self.bag.pop().expect("Piece bag should never be empty")
    }
}

/// Independent uniform draws over the 7 shapes.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: Pcg32,
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self { rng: seed.rng() }
    }
}

impl PieceSelector for RandomSelector {
    fn next_shape(&mut self, _board: &Board) -> Shape {
        self.rng.random()
    }
}

/// The falling shape and the one previewed after it.
#[derive(Debug)]
pub struct PieceSequence {
    selector: Box<dyn PieceSelector>,
    current: Shape,
    preview: Shape,
}

impl PieceSequence {
    /// Draws the first two shapes from `selector`.
    #[must_use]
    pub fn new(mut selector: Box<dyn PieceSelector>, board: &Board) -> Self {
        let current = selector.next_shape(board);
        let preview = selector.next_shape(board);
        Self {
            selector,
            current,
            preview,
        }
    }

    #[must_use]
    pub fn current(&self) -> Shape {
        self.current
    }

    #[must_use]
    pub fn preview(&self) -> Shape {
        self.preview
    }

    /// Promotes the preview shape to current and draws a new preview.
    pub fn advance(&mut self, board: &Board) -> Shape {
        self.current = self.preview;
        self.preview = self.selector.next_shape(board);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: PieceSeed = PieceSeed::from_bytes([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    #[test]
    fn test_shuffle_bag_yields_each_shape_once_per_bag() {
        let board = Board::standard();
        let mut selector = ShuffleBagSelector::with_seed(SEED);
        for _ in 0..5 {
            let mut bag: Vec<Shape> = (0..Shape::LEN)
                .map(|_| selector.next_shape(&board))
                .collect();
            bag.sort_by_key(|shape| *shape as u8);
            assert_eq!(bag, Shape::ALL);
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let board = Board::standard();
        let mut a = ShuffleBagSelector::with_seed(SEED);
        let mut b = ShuffleBagSelector::with_seed(SEED);
        for _ in 0..20 {
            assert_eq!(a.next_shape(&board), b.next_shape(&board));
        }

        let mut a = RandomSelector::with_seed(SEED);
        let mut b = RandomSelector::with_seed(SEED);
        for _ in 0..20 {
            assert_eq!(a.next_shape(&board), b.next_shape(&board));
        }
    }

    #[test]
    fn test_piece_sequence_advances_preview() {
        let board = Board::standard();
        let mut reference = ShuffleBagSelector::with_seed(SEED);
        let expected: Vec<Shape> = (0..10).map(|_| reference.next_shape(&board)).collect();

        let selector = Box::new(ShuffleBagSelector::with_seed(SEED));
        let mut sequence = PieceSequence::new(selector, &board);
        assert_eq!(sequence.current(), expected[0]);
        assert_eq!(sequence.preview(), expected[1]);
        for i in 1..9 {
            assert_eq!(sequence.advance(&board), expected[i]);
            assert_eq!(sequence.preview(), expected[i + 1]);
        }
    }

    #[test]
    fn test_seed_serialization() {
        let seed = PieceSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

        let deserialized: PieceSeed =
            serde_json::from_str("\"0123456789ABCDEFFEDCBA9876543210\"").unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_deserialization_errors() {
        let cases = [
            ("not hex", "\"ghijklmnopqrstuvwxyzghijklmnopqr\""),
            ("too short", "\"0123456789abcdef0123456789abcde\""),
            ("too long", "\"0123456789abcdef0123456789abcdef0\""),
            ("empty", "\"\""),
        ];
        for (name, json) in cases {
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("invalid hex"), "{name}: {err}");
        }
    }
}
