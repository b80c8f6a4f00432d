//! CLI command implementations for Chainfall.

pub(crate) mod run;
pub(crate) mod tournament;

mod output;

use chainfall::ai::{AiConfig, Difficulty, Strategy};
use chainfall::game::Mode;
use chainfall::tournament::{MatchConfig, MatchError};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Game variant flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Last player on the board wins.
    Classic,
    /// Defend your headquarters; power-ups appear.
    Base,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Classic => Self::Classic,
            ModeArg::Base => Self::Base,
        }
    }
}

/// AI strategy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StrategyArg {
    /// One-ply heuristic scoring.
    Heuristic,
    /// Minimax with alpha-beta pruning.
    Search,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Heuristic => Self::Heuristic,
            StrategyArg::Search => Self::Search,
        }
    }
}

/// AI difficulty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DifficultyArg {
    /// Picks from the top half.
    Easy,
    /// Picks from the top quarter.
    Medium,
    /// Always the best move.
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

/// Match setup flags shared by `run` and `tournament`.
///
/// Flags override values loaded with `--config`.
#[derive(Args, Debug, Clone)]
pub(crate) struct MatchArgs {
    /// JSON match configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Game variant
    #[arg(short, long)]
    mode: Option<ModeArg>,

    /// Number of players (2-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(2..=4))]
    players: Option<u8>,

    /// Board rows
    #[arg(long)]
    rows: Option<u16>,

    /// Board columns
    #[arg(long)]
    cols: Option<u16>,

    /// AI strategy per seat (repeat for each seat; the last one fills the rest)
    #[arg(long)]
    strategy: Vec<StrategyArg>,

    /// AI difficulty per seat (repeat for each seat; the last one fills the rest)
    #[arg(long)]
    difficulty: Vec<DifficultyArg>,

    /// Search depth in plies for search AIs
    #[arg(long)]
    depth: Option<u32>,

    /// Search time budget per move in milliseconds
    #[arg(long)]
    time_budget: Option<u64>,

    /// Moves before a match is called off
    #[arg(long)]
    max_moves: Option<u32>,

    /// Score AI candidate moves in parallel
    #[arg(long)]
    parallel_ai: bool,
}

impl MatchArgs {
    /// Build the match configuration: file (or defaults) first, then flags.
    pub(crate) fn to_config(&self) -> Result<MatchConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::from_json_file(path)?,
            None => MatchConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(players) = self.players {
            config.players = usize::from(players);
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(max_moves) = self.max_moves {
            config.max_moves = max_moves;
        }

        let seats = config
            .players
            .max(self.strategy.len())
            .max(self.difficulty.len());
        config.ai = (0..seats)
            .map(|seat| {
                let mut ai = config.ai_for(seat);
                if let Some(&strategy) = self.strategy.get(seat).or(self.strategy.last()) {
                    ai.strategy = strategy.into();
                }
                if let Some(&difficulty) = self.difficulty.get(seat).or(self.difficulty.last()) {
                    ai.difficulty = difficulty.into();
                }
                if let Some(depth) = self.depth {
                    ai.search_depth = depth;
                }
                if self.time_budget.is_some() {
                    ai.time_budget_ms = self.time_budget;
                }
                ai.parallel |= self.parallel_ai;
                ai
            })
            .collect::<Vec<AiConfig>>();

        Ok(config)
    }
}

/// Seed from the clock when none was given.
pub(crate) fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// CLI error type.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Match setup or execution failed.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// Output serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
