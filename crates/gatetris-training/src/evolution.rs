//! Generational genetic algorithm over weight vectors.
//!
//! An [`Evolution`] holds a population of [`Weights`] and hands them out one game at a
//! time:
//!
//! 1. **Install** - [`Evolution::update_scoring`] puts the current individual's weights
//!    into a [`ScoringSystem`]
//! 2. **Play** - The caller plays a game with that scoring system
//! 3. **Submit** - [`Evolution::submit`] records the number of cleared lines as fitness
//!    and moves to the next individual
//! 4. **Breed** - After the last individual, the population is sorted by fitness and
//!    the next generation is built
//!
//! # Breeding
//!
//! - The best `ceil(size × elite_fraction)` individuals survive unchanged
//! - Every other child takes each weight from one of two parents drawn uniformly from
//!   the top half, see [`weights::uniform_crossover`]
//! - Each child weight is then replaced by a fresh value from the gene range with
//!   probability `mutation_rate`, see [`weights::mutate`]
//!
//! # State
//!
//! ```text
//! Idle → Evaluating(0) → ... → Evaluating(size - 1) → (breed) → Evaluating(0) → ...
//! ```

use std::{cmp::Reverse, ops::Range, path::Path};

use gatetris_evaluator::scoring::{ScoringSystem, Weights};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    population_file::{self, PopulationFileError},
    weights,
};

/// Tunables of the genetic algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionParams {
    /// Individuals per generation
    pub population_size: usize,
    /// Share of the population copied unchanged into the next generation
    pub elite_fraction: f64,
    /// Per-weight probability of replacement by a random value
    pub mutation_rate: f64,
    /// Range for random and mutated weights
    pub gene_range: Range<f64>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 16,
            elite_fraction: 0.25,
            mutation_rate: 0.10,
            gene_range: -5.0..5.0,
        }
    }
}

impl EvolutionParams {
    /// Number of individuals kept unchanged: `ceil(size × elite_fraction)`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn elite_count(&self) -> usize {
        let count = (self.population_size as f64 * self.elite_fraction).ceil();
        (count.max(0.0) as usize).min(self.population_size)
    }

    /// Number of top individuals parents are drawn from.
    #[must_use]
    pub fn parent_pool_size(&self) -> usize {
        (self.population_size / 2).max(1)
    }
}

/// A candidate weight vector and the fitness of its last game.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    weights: Weights,
    fitness: Option<u64>,
}

impl Individual {
    #[must_use]
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            fitness: None,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Lines cleared in this generation's game, or `None` if not yet played.
    #[must_use]
    pub fn fitness(&self) -> Option<u64> {
        self.fitness
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EvolutionState {
    /// No weights have been handed out yet.
    Idle,
    /// The individual at this index is being played.
    Evaluating(usize),
}

/// Fitness of a finished generation, taken after sorting best first.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub generation: u32,
    pub max: u64,
    pub median: u64,
    pub min: u64,
    /// Weights of the fittest individual
    pub best: Weights,
}

/// Population-based search for scoring weights.
///
/// # Example
///
/// ```
/// use gatetris_evaluator::scoring::ScoringSystem;
/// use gatetris_training::evolution::{Evolution, EvolutionParams};
/// use rand::SeedableRng as _;
///
/// let params = EvolutionParams {
///     population_size: 4,
///     ..EvolutionParams::default()
/// };
/// let mut evolution = Evolution::random(params, &mut rand_pcg::Pcg32::seed_from_u64(0));
/// let mut scoring = ScoringSystem::default();
///
/// for fitness in [3, 1, 4, 1] {
///     evolution.update_scoring(&mut scoring);
///     // play a game with `scoring` here
///     if let Some(summary) = evolution.submit(fitness) {
///         assert_eq!((summary.max, summary.median, summary.min), (4, 1, 1));
///     }
/// }
/// assert_eq!(evolution.generation(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Evolution {
    params: EvolutionParams,
    individuals: Vec<Individual>,
    state: EvolutionState,
    generation: u32,
    rng: Pcg32,
}

impl Evolution {
    /// Creates a population of random weights.
    ///
    /// # Panics
    ///
    /// Panics if `params.population_size` is zero.
    #[must_use]
    pub fn random<R>(params: EvolutionParams, rng: &mut R) -> Self
    where
        R: Rng,
    {
        Self::from_population(params, Vec::new(), rng)
    }

    /// Starts from saved weights.
    ///
    /// The population is cut to `params.population_size`, or filled up with random
    /// weights when fewer are given.
    ///
    /// # Panics
    ///
    /// Panics if `params.population_size` is zero.
    #[must_use]
    pub fn from_population<R>(
        params: EvolutionParams,
        population: Vec<Weights>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng,
    {
        assert!(params.population_size > 0, "population must not be empty");
        let mut individuals: Vec<_> = population
            .into_iter()
            .take(params.population_size)
            .map(Individual::new)
            .collect();
        while individuals.len() < params.population_size {
            individuals.push(Individual::new(weights::random(rng, &params.gene_range)));
        }
        Self {
            params,
            individuals,
            state: EvolutionState::Idle,
            generation: 1,
            rng: Pcg32::from_rng(rng),
        }
    }

    /// Loads the population from `path`, or starts a random one if the file is missing.
    pub fn load_or_random<R>(
        path: &Path,
        params: EvolutionParams,
        rng: &mut R,
    ) -> Result<Self, PopulationFileError>
    where
        R: Rng,
    {
        let population = population_file::load(path)?.unwrap_or_default();
        Ok(Self::from_population(params, population, rng))
    }

    /// Writes the current population to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PopulationFileError> {
        population_file::save(path, self.individuals.iter().map(Individual::weights))
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Current generation, starting at 1.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> EvolutionState {
        self.state
    }

    /// Index of the individual being played (0 while idle).
    #[must_use]
    pub fn current_index(&self) -> usize {
        match self.state {
            EvolutionState::Idle => 0,
            EvolutionState::Evaluating(index) => index,
        }
    }

    #[must_use]
    pub fn current_weights(&self) -> &Weights {
        &self.individuals[self.current_index()].weights
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Installs the current individual's weights, leaving the idle state.
    pub fn update_scoring(&mut self, scoring: &mut ScoringSystem) {
        self.state = EvolutionState::Evaluating(self.current_index());
        scoring.set_weights(*self.current_weights());
    }

    /// Records the fitness of the current individual and moves on.
    ///
    /// After the last individual of a generation, the next generation is bred and its
    /// summary returned.
    pub fn submit(&mut self, fitness: u64) -> Option<GenerationSummary> {
        let index = self.current_index();
        self.individuals[index].fitness = Some(fitness);
        if index + 1 < self.individuals.len() {
            self.state = EvolutionState::Evaluating(index + 1);
            return None;
        }
        Some(self.breed())
    }

    fn breed(&mut self) -> GenerationSummary {
        self.individuals
            .sort_by_key(|individual| Reverse(individual.fitness.unwrap_or(0)));

        let fitness = |i: usize| self.individuals[i].fitness.unwrap_or(0);
        let len = self.individuals.len();
        let summary = GenerationSummary {
            generation: self.generation,
            max: fitness(0),
            median: fitness(len / 2),
            min: fitness(len - 1),
            best: self.individuals[0].weights,
        };

        let pool = &self.individuals[..self.params.parent_pool_size().min(len)];
        let mut next: Vec<_> = self.individuals[..self.params.elite_count()]
            .iter()
            .map(|elite| Individual::new(elite.weights))
            .collect();
        while next.len() < len {
            let p1 = &pool[self.rng.random_range(0..pool.len())];
            let p2 = &pool[self.rng.random_range(0..pool.len())];
            let mut child = weights::uniform_crossover(&p1.weights, &p2.weights, &mut self.rng);
            weights::mutate(
                &mut child,
                self.params.mutation_rate,
                &self.params.gene_range,
                &mut self.rng,
            );
            next.push(Individual::new(child));
        }

        self.individuals = next;
        self.generation += 1;
        self.state = EvolutionState::Evaluating(0);
        summary
    }
}
