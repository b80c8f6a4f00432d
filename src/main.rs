//! Chainfall CLI - run AI-vs-AI chain-reaction matches from the command line.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Chainfall - a deterministic chain-reaction territory game
#[derive(Parser, Debug)]
#[command(name = "chainfall")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single AI-vs-AI match
    Run {
        #[command(flatten)]
        setup: cli::MatchArgs,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Print the final board
        #[arg(long)]
        show_board: bool,

        /// Suppress the header lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many matches in parallel and aggregate statistics
    Tournament {
        #[command(flatten)]
        setup: cli::MatchArgs,

        /// Number of matches to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each match)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "chainfall=debug" } else { "warn" })
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Commands::Run {
            setup,
            seed,
            format,
            show_board,
            quiet,
        } => cli::run::execute(&setup, seed, format, show_board, quiet),

        Commands::Tournament {
            setup,
            games,
            seed,
            threads,
            format,
            progress,
        } => cli::tournament::execute(&setup, games, seed, threads, format, progress),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
