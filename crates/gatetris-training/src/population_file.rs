//! Plain-text population file.
//!
//! One individual per line, its eight weights separated by spaces. Values are written
//! with enough digits to be read back exactly. Blank lines are skipped.
//!
//! ```text
//! 2 -3 -3 -3 -3 -5 0 -10
//! -0.4127801 -1.95 0.0031 -2.5 -4.75 -1 0.25 3.125
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gatetris_evaluator::scoring::{ParseWeightsError, Weights};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PopulationFileError {
    #[display("failed to read population file {path:?}")]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to write population file {path:?}")]
    Write { path: PathBuf, source: io::Error },
    #[display("invalid individual on line {line}")]
    InvalidLine {
        line: usize,
        source: ParseWeightsError,
    },
}

/// Parses a population; `line` numbers in errors start at 1.
pub fn parse(text: &str) -> Result<Vec<Weights>, PopulationFileError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.parse()
                .map_err(|source| PopulationFileError::InvalidLine {
                    line: i + 1,
                    source,
                })
        })
        .collect()
}

#[must_use]
pub fn format<'a, I>(individuals: I) -> String
where
    I: IntoIterator<Item = &'a Weights>,
{
    let mut text = String::new();
    for weights in individuals {
        text.push_str(&weights.to_string());
        text.push('\n');
    }
    text
}

/// Reads the population at `path`. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<Vec<Weights>>, PopulationFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PopulationFileError::Read {
                path: path.to_owned(),
                source,
            });
        }
    };
    parse(&text).map(Some)
}

/// Replaces the file at `path` with the given population.
pub fn save<'a, I>(path: &Path, individuals: I) -> Result<(), PopulationFileError>
where
    I: IntoIterator<Item = &'a Weights>,
{
    fs::write(path, format(individuals)).map_err(|source| PopulationFileError::Write {
        path: path.to_owned(),
        source,
    })
}
