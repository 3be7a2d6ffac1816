//! Board scoring: a weighted sum of eight board features.
//!
//! # Features
//!
//! | Id          | Measures                                              |
//! |-------------|-------------------------------------------------------|
//! | `sum_height`| Sum of all column heights                             |
//! | `max_height`| Tallest column                                        |
//! | `rel_height`| Tallest column minus shortest column                  |
//! | `avg_height`| `sum_height / width`                                  |
//! | `holes`     | Empty cells below a column's top block                |
//! | `wells`     | Depth of columns sunk at least `min_well_depth` below both neighbours |
//! | `blockades` | Filled cells above at least one hole in their column  |
//! | `clears`    | Full rows                                             |
//!
//! Full rows are counted on the board as given; every other feature is measured as if
//! those rows had already been cleared. The board passed in is never modified.
//!
//! ```text
//! score = w₀·sum_height + w₁·max_height + w₂·rel_height + w₃·avg_height
//!       + w₄·holes + w₅·wells + w₆·blockades + w₇·clears
//! ```

use std::{
    borrow::Cow,
    fmt,
    num::ParseFloatError,
    ops::{Index, IndexMut},
    str::FromStr,
};

use gatetris_engine::Board;

/// One of the eight scored board features, in weight-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardFeature {
    SumHeight,
    MaxHeight,
    RelHeight,
    AvgHeight,
    Holes,
    Wells,
    Blockades,
    Clears,
}

impl BoardFeature {
    pub const LEN: usize = 8;

    pub const ALL: [Self; Self::LEN] = [
        Self::SumHeight,
        Self::MaxHeight,
        Self::RelHeight,
        Self::AvgHeight,
        Self::Holes,
        Self::Wells,
        Self::Blockades,
        Self::Clears,
    ];

    /// Stable identifier used in model files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::SumHeight => "sum_height",
            Self::MaxHeight => "max_height",
            Self::RelHeight => "rel_height",
            Self::AvgHeight => "avg_height",
            Self::Holes => "holes",
            Self::Wells => "wells",
            Self::Blockades => "blockades",
            Self::Clears => "clears",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SumHeight => "Sum of Heights",
            Self::MaxHeight => "Max Height",
            Self::RelHeight => "Relative Height",
            Self::AvgHeight => "Average Height",
            Self::Holes => "Holes",
            Self::Wells => "Wells",
            Self::Blockades => "Blockades",
            Self::Clears => "Cleared Lines",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.id() == id)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Coefficients of the scoring function, one per [`BoardFeature`].
///
/// `Display` writes the values separated by single spaces and `FromStr` reads them
/// back, so the text form round-trips. A precision (`{:.2}`) is applied to every value,
/// which is handy for progress output.
///
/// # Example
///
/// ```
/// use gatetris_evaluator::scoring::{BoardFeature, Weights};
///
/// let weights: Weights = "2 -3 -3 -3 -3 -5 0 -10".parse().unwrap();
/// assert_eq!(weights, Weights::FIXED);
/// assert_eq!(weights[BoardFeature::Clears], -10.0);
/// assert_eq!(format!("{weights:.1}"), "2.0 -3.0 -3.0 -3.0 -3.0 -5.0 0.0 -10.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights([f64; BoardFeature::LEN]);

impl Default for Weights {
    fn default() -> Self {
        Self::FIXED
    }
}

impl Weights {
    /// Hand-tuned weights used when no trained weights are supplied.
    pub const FIXED: Self = Self([2.0, -3.0, -3.0, -3.0, -3.0, -5.0, 0.0, -10.0]);

    #[must_use]
    pub const fn new(values: [f64; BoardFeature::LEN]) -> Self {
        Self(values)
    }

    /// Builds weights from a slice, or returns `None` if it does not hold exactly eight
    /// values.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        values.try_into().ok().map(Self)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[f64; BoardFeature::LEN] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoardFeature, f64)> + '_ {
        BoardFeature::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<BoardFeature> for Weights {
    type Output = f64;

    fn index(&self, feature: BoardFeature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl IndexMut<BoardFeature> for Weights {
    fn index_mut(&mut self, feature: BoardFeature) -> &mut f64 {
        &mut self.0[feature.index()]
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match f.precision() {
                Some(precision) => write!(f, "{value:.precision$}")?,
                None => write!(f, "{value}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseWeightsError {
    #[display("invalid weight {value:?}")]
    InvalidNumber {
        value: String,
        source: ParseFloatError,
    },
    #[display("expected {} weights, found {found}", BoardFeature::LEN)]
    WrongArity { found: usize },
}

impl FromStr for Weights {
    type Err = ParseWeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|value| {
                value
                    .parse::<f64>()
                    .map_err(|source| ParseWeightsError::InvalidNumber {
                        value: value.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slice(&values).ok_or(ParseWeightsError::WrongArity {
            found: values.len(),
        })
    }
}

/// Raw feature values of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardMetrics {
    width: usize,
    sum_height: usize,
    max_height: usize,
    min_height: usize,
    holes: usize,
    wells: usize,
    blockades: usize,
    clears: usize,
}

impl BoardMetrics {
    /// Measures `board` without modifying it.
    ///
    /// Full rows are counted first. If there are any, the other features are measured
    /// on a copy with those rows removed.
    #[must_use]
    pub fn measure(board: &Board, min_well_depth: usize) -> Self {
        let clears = board.full_rows();
        let board = if clears > 0 {
            Cow::Owned(board.without_full_rows())
        } else {
            Cow::Borrowed(board)
        };

        let heights = board.column_heights();
        let (holes, blockades) = holes_and_blockades(&board, &heights);
        Self {
            width: board.width(),
            sum_height: heights.iter().sum(),
            max_height: heights.iter().copied().max().unwrap_or(0),
            min_height: heights.iter().copied().min().unwrap_or(0),
            holes,
            wells: wells(&heights, min_well_depth),
            blockades,
            clears,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn value(&self, feature: BoardFeature) -> f64 {
        match feature {
            BoardFeature::SumHeight => self.sum_height as f64,
            BoardFeature::MaxHeight => self.max_height as f64,
            BoardFeature::RelHeight => (self.max_height - self.min_height) as f64,
            BoardFeature::AvgHeight => self.sum_height as f64 / self.width as f64,
            BoardFeature::Holes => self.holes as f64,
            BoardFeature::Wells => self.wells as f64,
            BoardFeature::Blockades => self.blockades as f64,
            BoardFeature::Clears => self.clears as f64,
        }
    }

    #[must_use]
    pub fn sum_height(&self) -> usize {
        self.sum_height
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    #[must_use]
    pub fn min_height(&self) -> usize {
        self.min_height
    }

    #[must_use]
    pub fn holes(&self) -> usize {
        self.holes
    }

    #[must_use]
    pub fn wells(&self) -> usize {
        self.wells
    }

    #[must_use]
    pub fn blockades(&self) -> usize {
        self.blockades
    }

    #[must_use]
    pub fn clears(&self) -> usize {
        self.clears
    }
}

/// Counts holes and blockades column by column, scanning up from the floor to the
/// column height.
fn holes_and_blockades(board: &Board, heights: &[usize]) -> (usize, usize) {
    let mut holes = 0;
    let mut blockades = 0;
    for (x, &height) in heights.iter().enumerate() {
        let mut column_holes = 0;
        for y in 0..height {
            if board.cell(x, y).is_empty() {
                column_holes += 1;
            } else if column_holes > 0 {
                blockades += 1;
            }
        }
        holes += column_holes;
    }
    (holes, blockades)
}

/// Sums the depth of every well.
///
/// A column is a well when it is lower than both neighbours and the shorter neighbour
/// rises at least `min_depth` above it. Board edges count as infinitely tall, so an edge
/// column compares against its single neighbour.
#[must_use]
pub fn wells(heights: &[usize], min_depth: usize) -> usize {
    let neighbour = |i: Option<usize>| {
        i.and_then(|i| heights.get(i))
            .copied()
            .unwrap_or(usize::MAX)
    };
    heights
        .iter()
        .enumerate()
        .filter_map(|(x, &height)| {
            let left = neighbour(x.checked_sub(1));
            let right = neighbour(Some(x + 1));
            let rim = left.min(right);
            (rim != usize::MAX && height < rim).then(|| rim - height)
        })
        .filter(|&depth| depth >= min_depth)
        .sum()
}

/// Scores boards as a weighted sum of [`BoardMetrics`].
///
/// # Example
///
/// ```
/// use gatetris_engine::Board;
/// use gatetris_evaluator::scoring::{ScoringSystem, Weights};
///
/// let scoring = ScoringSystem::new(Weights::FIXED);
/// assert_eq!(scoring.score(&Board::standard()), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSystem {
    weights: Weights,
    min_well_depth: usize,
}

impl Default for ScoringSystem {
    fn default() -> Self {
        Self::new(Weights::FIXED)
    }
}

impl ScoringSystem {
    pub const DEFAULT_MIN_WELL_DEPTH: usize = 3;

    #[must_use]
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            min_well_depth: Self::DEFAULT_MIN_WELL_DEPTH,
        }
    }

    #[must_use]
    pub fn with_min_well_depth(mut self, min_well_depth: usize) -> Self {
        self.min_well_depth = min_well_depth;
        self
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: Weights) {
        self.weights = weights;
    }

    #[must_use]
    pub fn measure(&self, board: &Board) -> BoardMetrics {
        BoardMetrics::measure(board, self.min_well_depth)
    }

    /// Scores `board`; higher is better.
    #[must_use]
    pub fn score(&self, board: &Board) -> f64 {
        self.score_metrics(&self.measure(board))
    }

    #[must_use]
    pub fn score_metrics(&self, metrics: &BoardMetrics) -> f64 {
        self.weights
            .iter()
            .map(|(feature, weight)| weight * metrics.value(feature))
            .sum()
    }
}
