use std::num::NonZeroUsize;

use clap::{Parser, Subcommand};
use gatetris_engine::{
    Board, GameField, GameStats, PieceSeed, PieceSelector, RandomSelector, ShuffleBagSelector,
};
use gatetris_evaluator::{
    auto_player::{AutoPlayConfig, AutoPlayer, GameEnd},
    move_evaluator::MoveEvaluator,
    worst_piece::WorstPieceSelector,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use self::{auto_play::AutoPlayArg, train::TrainArg};

mod auto_play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the AI play games and report their statistics
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Evolve scoring weights with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}

/// Where the next pieces come from.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, derive_more::FromStr)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SelectorKind {
    /// Seven-bag randomizer
    #[default]
    Shuffle,
    /// Independent uniform draws
    Random,
    /// Always the piece the AI handles worst
    Worst,
}

impl SelectorKind {
    fn build(self, seed: PieceSeed, evaluator: &MoveEvaluator) -> Box<dyn PieceSelector> {
        match self {
            SelectorKind::Shuffle => Box::new(ShuffleBagSelector::with_seed(seed)),
            SelectorKind::Random => Box::new(RandomSelector::with_seed(seed)),
            SelectorKind::Worst => Box::new(WorstPieceSelector::new(evaluator.clone())),
        }
    }
}

/// Options shared by every command that plays games.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Board width in columns
    #[arg(long, default_value_t = Board::STANDARD_WIDTH)]
    width: usize,
    /// Board height in rows
    #[arg(long, default_value_t = Board::STANDARD_HEIGHT)]
    height: usize,
    /// Piece selection strategy (shuffle, random, worst)
    #[arg(long, default_value = "shuffle")]
    selector: SelectorKind,
    /// Score each placement by the best placement of the preview piece
    #[arg(long)]
    lookahead: bool,
    /// Push a junk row in from the bottom after every N pieces
    #[arg(long, value_name = "N")]
    junk_every: Option<NonZeroUsize>,
    /// Stop each game after this many pieces
    #[arg(long)]
    max_pieces: Option<usize>,
    /// Seed for piece sequences and junk rows
    #[arg(long)]
    seed: Option<u64>,
}

/// Seeds for one game, drawn from the command's master generator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GameSeed {
    pieces: PieceSeed,
    junk: u64,
}

impl GameArg {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.width >= 4 && self.height >= 4,
            "Board must be at least 4x4, got {}x{}",
            self.width,
            self.height
        );
        Ok(())
    }

    fn master_rng(&self) -> Pcg32 {
        match self.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        }
    }

    fn auto_play_config(&self) -> AutoPlayConfig {
        AutoPlayConfig {
            lookahead: self.lookahead,
            max_pieces: self.max_pieces,
            junk_every: self.junk_every,
        }
    }

    /// Plays one game to its end with `evaluator`.
    fn play(&self, evaluator: MoveEvaluator, seed: GameSeed) -> (GameEnd, GameStats) {
        let selector = self.selector.build(seed.pieces, &evaluator);
        let mut field = GameField::new(self.width, self.height, selector);
        let mut player = AutoPlayer::new(evaluator, self.auto_play_config());
        let end = player.play(&mut field, &mut Pcg32::seed_from_u64(seed.junk));
        (end, field.stats().clone())
    }
}

impl GameSeed {
    fn draw(rng: &mut Pcg32) -> Self {
        Self {
            pieces: rng.random(),
            junk: rng.random(),
        }
    }
}
