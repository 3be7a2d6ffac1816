use std::{collections::BTreeMap, path::PathBuf};

use gatetris_engine::{GameStats, PieceSeed};
use gatetris_evaluator::{
    auto_player::GameEnd,
    move_evaluator::MoveEvaluator,
    scoring::{BoardFeature, ScoringSystem, Weights},
};
use serde::Serialize;

use super::{GameArg, GameSeed, SelectorKind};
use crate::{model::AiModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    game: GameArg,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Load weights from a trained model file
    #[arg(long, conflicts_with = "weights")]
    model: Option<PathBuf>,
    /// Eight space-separated weights, in feature order
    #[arg(long, allow_hyphen_values = true)]
    weights: Option<Weights>,
    /// Write a JSON report of every game to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AutoPlayReport {
    selector: SelectorKind,
    lookahead: bool,
    weights: BTreeMap<&'static str, f64>,
    games: Vec<GameReport>,
}

#[derive(Debug, Serialize)]
struct GameReport {
    piece_seed: PieceSeed,
    end: GameEnd,
    stats: GameStats,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        game,
        games,
        model,
        weights,
        output,
    } = arg;
    game.validate()?;

    let weights = match (model, weights) {
        (Some(path), _) => {
            let model = AiModel::open(path)?;
            eprintln!("Using model '{}' ({})", model.name, path.display());
            model.to_weights()?
        }
        (None, Some(weights)) => *weights,
        (None, None) => Weights::FIXED,
    };
    eprintln!("Weights:");
    for feature in BoardFeature::ALL {
        eprintln!("  {:<16} {:>8.3}", feature.name(), weights[feature]);
    }

    let evaluator = MoveEvaluator::new(ScoringSystem::new(weights));
    let mut rng = game.master_rng();
    let mut reports = Vec::with_capacity(*games);
    for i in 0..*games {
        let seed = GameSeed::draw(&mut rng);
        let (end, stats) = game.play(evaluator.clone(), seed);
        eprintln!(
            "Game #{}: {end:?} after {} pieces, lines = {}, score = {}, level = {}",
            i + 1,
            stats.completed_pieces(),
            stats.total_cleared_lines(),
            stats.score(),
            stats.level(),
        );
        reports.push(GameReport {
            piece_seed: seed.pieces,
            end,
            stats,
        });
    }

    if !reports.is_empty() {
        let lines: Vec<_> = reports
            .iter()
            .map(|report| report.stats.total_cleared_lines())
            .collect();
        #[expect(clippy::cast_precision_loss)]
        let mean = lines.iter().sum::<usize>() as f64 / lines.len() as f64;
        eprintln!();
        eprintln!(
            "Lines over {} games: mean = {mean:.1}, max = {}, min = {}",
            lines.len(),
            lines.iter().max().copied().unwrap_or(0),
            lines.iter().min().copied().unwrap_or(0),
        );
    }

    if let Some(path) = output {
        let report = AutoPlayReport {
            selector: game.selector,
            lookahead: game.lookahead,
            weights: BoardFeature::ALL
                .iter()
                .map(|feature| (feature.id(), weights[*feature]))
                .collect(),
            games: reports,
        };
        util::write_json(&report, Some(path.as_path()))?;
        eprintln!("Report written to {}", path.display());
    }

    Ok(())
}
