use std::{path::PathBuf, thread};

use anyhow::Context as _;
use gatetris_evaluator::{
    move_evaluator::MoveEvaluator,
    scoring::{ScoringSystem, Weights},
};
use gatetris_training::evolution::{Evolution, EvolutionParams, GenerationSummary};

use super::{GameArg, GameSeed};
use crate::{model::AiModel, util};

/// Piece limit for training games when `--max-pieces` is not given.
const DEFAULT_PIECE_LIMIT: usize = 1000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    game: GameArg,
    /// Population file, read at startup and rewritten after every generation
    #[arg(long, default_value = "aiscores.txt")]
    population: PathBuf,
    /// Number of generations to evolve
    #[arg(long, default_value_t = 10)]
    generations: u32,
    /// Individuals per generation
    #[arg(long, default_value_t = EvolutionParams::default().population_size)]
    population_size: usize,
    /// Name stored in the model file
    #[arg(long, default_value = "evolved")]
    name: String,
    /// Output file path for the trained model (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        game,
        population,
        generations,
        population_size,
        name,
        output,
    } = arg;
    game.validate()?;
    anyhow::ensure!(*population_size > 0, "Population size must be positive");

    let mut game = game.clone();
    game.max_pieces = game.max_pieces.or(Some(DEFAULT_PIECE_LIMIT));

    let params = EvolutionParams {
        population_size: *population_size,
        ..EvolutionParams::default()
    };
    let mut rng = game.master_rng();
    let mut evolution = Evolution::load_or_random(population, params, &mut rng)?;
    eprintln!(
        "Population of {} loaded from {}",
        evolution.individuals().len(),
        population.display()
    );

    let mut scoring = ScoringSystem::default();
    let mut best: Option<GenerationSummary> = None;
    for _ in 0..*generations {
        // every individual of a generation plays the same piece sequence
        let seed = GameSeed::draw(&mut rng);
        let candidates: Vec<Weights> = evolution
            .individuals()
            .iter()
            .map(|individual| *individual.weights())
            .collect();
        let fitness = play_generation(&game, &candidates, seed)?;

        let generation = evolution.generation();
        let summary = submit_generation(&mut evolution, &mut scoring, &fitness)
            .context("Fitness count does not match the population")?;
        eprintln!(
            "Generation #{}: max = {}, median = {}, min = {}",
            summary.generation, summary.max, summary.median, summary.min
        );
        eprintln!("  best: [{:.2}]", summary.best);
        if best.as_ref().is_none_or(|best| summary.max > best.max) {
            best = Some(summary);
        }

        evolution
            .save(population)
            .with_context(|| format!("Failed to save generation {generation} population"))?;
    }

    let Some(best) = best else {
        eprintln!("No generations were run");
        return Ok(());
    };
    let model = AiModel::new(name.clone(), best.max, &best.best);
    util::write_json(&model, output.as_deref())?;

    eprintln!();
    eprintln!("Training complete");
    eprintln!("  Best fitness: {} (generation #{})", best.max, best.generation);
    eprintln!("  Weights: [{}]", best.best);
    if let Some(path) = output {
        eprintln!("  Model saved to {}", path.display());
    }
    Ok(())
}

/// Records `fitness` for each individual in order, installing its weights into
/// `scoring` first. Returns the summary once the generation is complete.
fn submit_generation(
    evolution: &mut Evolution,
    scoring: &mut ScoringSystem,
    fitness: &[u64],
) -> Option<GenerationSummary> {
    let generation = evolution.generation();
    let mut summary = None;
    for (i, &fitness) in fitness.iter().enumerate() {
        evolution.update_scoring(scoring);
        eprintln!("{}", candidate_line(generation, i, scoring.weights(), fitness));
        summary = evolution.submit(fitness);
    }
    summary
}

fn candidate_line(generation: u32, index: usize, weights: &Weights, fitness: u64) -> String {
    format!(
        "Generation {generation} - Candidate {}: [{weights:.2}] score = {fitness}",
        index + 1
    )
}

/// Plays one game per candidate in parallel; fitness is the number of cleared lines.
fn play_generation(
    game: &GameArg,
    candidates: &[Weights],
    seed: GameSeed,
) -> anyhow::Result<Vec<u64>> {
    thread::scope(|s| {
        let handles: Vec<_> = candidates
            .iter()
            .map(|weights| {
                let evaluator = MoveEvaluator::new(ScoringSystem::new(*weights));
                s.spawn(move || {
                    let (_end, stats) = game.play(evaluator, seed);
                    u64::try_from(stats.total_cleared_lines()).unwrap_or(u64::MAX)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("Game thread panicked"))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_submit_generation_installs_each_candidate() {
        let other = Weights::new([1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 4.0]);
        let params = EvolutionParams {
            population_size: 2,
            ..EvolutionParams::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut evolution =
            Evolution::from_population(params, vec![Weights::FIXED, other], &mut rng);
        let mut scoring = ScoringSystem::default();

        assert!(submit_generation(&mut evolution, &mut scoring, &[3]).is_none());
        assert_eq!(*scoring.weights(), Weights::FIXED);
        assert!(evolution.state().is_evaluating());

        let summary = submit_generation(&mut evolution, &mut scoring, &[5]).unwrap();
        assert_eq!(*scoring.weights(), other);
        assert_eq!((summary.generation, summary.max, summary.min), (1, 5, 3));
        assert_eq!(summary.best, other);
        assert_eq!(evolution.generation(), 2);
    }

    #[test]
    fn test_candidate_numbers_start_at_one() {
        let line = candidate_line(3, 0, &Weights::FIXED, 12);
        assert_eq!(
            line,
            "Generation 3 - Candidate 1: [2.00 -3.00 -3.00 -3.00 -3.00 -5.00 0.00 -10.00] score = 12"
        );
    }
}
