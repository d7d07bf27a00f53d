use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use sweeper_core::*;

use config::*;

mod config;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DifficultyArg {
    Classic,
    Beginner,
    Intermediate,
    Expert,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Classic => Difficulty::Classic,
            DifficultyArg::Beginner => Difficulty::Beginner,
            DifficultyArg::Intermediate => Difficulty::Intermediate,
            DifficultyArg::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SafetyRuleArg {
    AnyFlag,
    Saturated,
}

impl From<SafetyRuleArg> for SafetyRule {
    fn from(arg: SafetyRuleArg) -> Self {
        match arg {
            SafetyRuleArg::AnyFlag => SafetyRule::AnyFlag,
            SafetyRuleArg::Saturated => SafetyRule::Saturated,
        }
    }
}

/// Let the solver play many rounds unattended and report how it did.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file with default settings, flags given here take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board preset
    #[arg(short, long, value_enum)]
    difficulty: Option<DifficultyArg>,

    #[arg(long)]
    rows: Option<Coord>,

    #[arg(long)]
    cols: Option<Coord>,

    #[arg(short, long)]
    mines: Option<CellCount>,

    /// How many rounds to play
    #[arg(short = 'n', long)]
    trials: Option<usize>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Never lose on the first reveal of a round
    #[arg(long)]
    first_move_safe: bool,

    #[arg(long, value_enum)]
    safety_rule: Option<SafetyRuleArg>,

    /// Flag all hidden cells when they can only be mines instead of guessing
    #[arg(long)]
    flag_when_exhausted: bool,

    /// Pause between moves, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print records and summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the final board of the last round
    #[arg(long)]
    show_board: bool,
}

impl Args {
    fn overrides(&self) -> FileConfig {
        FileConfig {
            difficulty: self.difficulty.map(Into::into),
            rows: self.rows,
            cols: self.cols,
            mines: self.mines,
            trials: self.trials,
            seed: self.seed,
            first_move_safe: self.first_move_safe.then_some(true),
            safety_rule: self.safety_rule.map(Into::into),
            flag_when_exhausted: self.flag_when_exhausted.then_some(true),
            delay_ms: self.delay_ms,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
    records: &'a [TrialRecord],
    summary: TrialSummary,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let run = RunConfig::try_from(args.overrides().or(file))?;
    log::debug!("Run config: {:?}", run);

    let (mut session, mut solver) = match run.seed {
        Some(seed) => (Session::new(run.game, seed)?, Solver::new(run.solver.clone(), seed)),
        None => (
            Session::from_entropy(run.game)?,
            Solver::from_entropy(run.solver.clone()),
        ),
    };
    session = session.with_first_move_safe(run.first_move_safe);

    let records = solver.run_batch(&mut session, run.trials)?;
    let summary = TrialSummary::from_records(&records);

    if args.json {
        let report = Report {
            rows: run.game.size.0,
            cols: run.game.size.1,
            mines: run.game.mines,
            records: &records,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for record in &records {
            println!(
                "trial {:>4}  {}  score {:>5}",
                record.trial_index,
                if record.won { "won " } else { "lost" },
                record.score
            );
        }
        println!(
            "{}x{} with {} mines: {}/{} won ({:.1}%), mean score {:.1} of {}, best {}",
            run.game.size.0,
            run.game.size.1,
            run.game.mines,
            summary.wins,
            summary.trials,
            summary.win_rate * 100.0,
            summary.mean_score,
            run.game.safe_cells(),
            summary.best_score
        );
    }

    if args.show_board {
        print!("{}", session);
    }

    Ok(())
}
