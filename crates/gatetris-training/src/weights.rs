//! Genetic operators on weight vectors.
//!
//! - **Initialization**: [`random`] draws every weight uniformly from a range
//! - **Crossover**: [`uniform_crossover`] copies each weight from one of two parents
//! - **Mutation**: [`mutate`] replaces weights with fresh random values
//!
//! Mutation resamples instead of perturbing, so a weight can jump anywhere in the gene
//! range in a single generation.

use std::ops::Range;

use gatetris_evaluator::scoring::{BoardFeature, Weights};
use rand::Rng;

/// Creates weights by calling `f` for every feature in order.
///
/// # Examples
///
/// ```
/// use gatetris_evaluator::scoring::{BoardFeature, Weights};
/// use gatetris_training::weights;
///
/// let weights = weights::from_fn(|feature| match feature {
///     BoardFeature::Clears => 1.0,
///     _ => -1.0,
/// });
/// assert_eq!(weights[BoardFeature::Holes], -1.0);
/// assert_eq!(weights[BoardFeature::Clears], 1.0);
/// ```
pub fn from_fn<F>(f: F) -> Weights
where
    F: FnMut(BoardFeature) -> f64,
{
    Weights::new(BoardFeature::ALL.map(f))
}

/// Draws every weight uniformly from `range`.
///
/// # Panics
///
/// Panics if `range` is empty.
pub fn random<R>(rng: &mut R, range: &Range<f64>) -> Weights
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(range.clone()))
}

/// Builds a child that takes each weight from `p1` or `p2` with equal probability.
pub fn uniform_crossover<R>(p1: &Weights, p2: &Weights, rng: &mut R) -> Weights
where
    R: Rng + ?Sized,
{
    from_fn(|feature| {
        if rng.random_bool(0.5) {
            p1[feature]
        } else {
            p2[feature]
        }
    })
}

/// Replaces each weight with a fresh value from `range` with probability `rate`.
///
/// # Panics
///
/// Panics if `rate` is outside `[0.0, 1.0]` or `range` is empty.
pub fn mutate<R>(weights: &mut Weights, rate: f64, range: &Range<f64>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for feature in BoardFeature::ALL {
        if rng.random_bool(rate) {
            weights[feature] = rng.random_range(range.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let range = -5.0..5.0;
        for _ in 0..100 {
            let weights = random(&mut rng, &range);
            assert!(weights.as_array().iter().all(|w| range.contains(w)));
        }
    }

    #[test]
    fn test_crossover_takes_genes_from_parents() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = Weights::new([1.0; BoardFeature::LEN]);
        let p2 = Weights::new([2.0; BoardFeature::LEN]);
        let mut seen = [false; 2];
        for _ in 0..20 {
            let child = uniform_crossover(&p1, &p2, &mut rng);
            for &w in child.as_array() {
                assert!(w == 1.0 || w == 2.0);
                seen[usize::from(w == 2.0)] = true;
            }
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_mutate_rate_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let range = 10.0..11.0;

        let mut weights = Weights::FIXED;
        mutate(&mut weights, 0.0, &range, &mut rng);
        assert_eq!(weights, Weights::FIXED);

        mutate(&mut weights, 1.0, &range, &mut rng);
        assert!(weights.as_array().iter().all(|w| range.contains(w)));
    }
}
