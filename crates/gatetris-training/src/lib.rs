//! Evolutionary tuning of the evaluator's scoring weights.
//!
//! # How Training Works
//!
//! 1. **Population** - Start from a saved population file, or from random weights
//! 2. **Evaluation** - Each individual plays one game; the lines it clears are its fitness
//! 3. **Selection** - The fittest quarter survives unchanged
//! 4. **Reproduction** - The rest of the next generation is bred from the top half by
//!    uniform crossover and mutation
//! 5. **Persistence** - The population is written back after every generation, so a
//!    later run continues where this one stopped
//!
//! # Modules
//!
//! - [`evolution`] - Population state machine and breeding
//! - [`weights`] - Genetic operators on single weight vectors
//! - [`population_file`] - Reading and writing the plain-text population file

pub mod evolution;
pub mod population_file;
pub mod weights;
