use serde::{Deserialize, Serialize};

/// Highest level reachable through line clears.
pub const MAX_LEVEL: usize = 10;

/// Points for clearing `lines` rows with a single piece: 40, 120, 360, 1080.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub const fn line_clear_points(lines: usize) -> usize {
    match lines {
        0 => 0,
        n => 40 * 3usize.pow(n as u32 - 1),
    }
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: each drop that clears `n` lines earns `40 × 3ⁿ⁻¹` points
/// - **Level**: starts at 1, rises every 10 lines, capped at [`MAX_LEVEL`]
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of drops by number of lines cleared
///
/// # Example
///
/// ```
/// use gatetris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.score(), 1080);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the level: 1 until the 11th line, then one more per 10 lines.
    #[must_use]
    pub fn level(&self) -> usize {
        (self.total_cleared_lines.saturating_sub(1) / 10 + 1).min(MAX_LEVEL)
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of drops by lines cleared: `[0]` counts drops that
    /// cleared nothing, `[4]` counts four-line clears.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece locks.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
        self.score += line_clear_points(cleared_lines);
    }
}
