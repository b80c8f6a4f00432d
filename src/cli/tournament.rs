//! Tournament command implementation.

// Rates over game counts
#![allow(clippy::cast_precision_loss)]

use super::output::{format_tournament_csv, format_tournament_text, JsonTournamentResult, TournamentStats};
use super::run::seat_labels;
use super::{seed_or_clock, CliError, MatchArgs, TournamentFormat};
use chainfall::tournament::run_match;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::warn;

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or output fails.
pub(crate) fn execute(
    setup: &MatchArgs,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    format: TournamentFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = setup.to_config()?;
    let labels = seat_labels(&config);

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!("thread pool already initialized: {e}");
        }
    }

    let base_seed = seed_or_clock(seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let num_players = config.players;

    // Each thread accumulates into its own TournamentStats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || TournamentStats::new(num_players),
            |mut local_stats, i| {
                let game_seed = base_seed.wrapping_add(i);
                match run_match(game_seed, &config) {
                    Ok(result) => local_stats.add_result(&result),
                    Err(e) => {
                        warn!(seed = game_seed, "match failed: {e}");
                        local_stats.errors += 1;
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local_stats
            },
        )
        .reduce(
            || TournamentStats::new(num_players),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        TournamentFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&stats, &labels));
            println!();
            println!("Duration: {:.2}s ({games_per_sec:.0} games/sec)", duration.as_secs_f64());
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonTournamentResult::from_stats(&stats, &labels))?;
            println!("{json}");
        }
        TournamentFormat::Csv => {
            print!("{}", format_tournament_csv(&stats, &labels));
        }
    }

    Ok(())
}
