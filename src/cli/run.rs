//! Run command implementation.

use super::output::{format_text, JsonMatchResult};
use super::{seed_or_clock, CliError, MatchArgs, OutputFormat};
use chainfall::tournament::{run_match, MatchConfig};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the match fails.
pub(crate) fn execute(
    setup: &MatchArgs,
    seed: Option<u64>,
    format: OutputFormat,
    show_board: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = setup.to_config()?;
    let seed = seed_or_clock(seed);
    let labels = seat_labels(&config);

    if !quiet && format == OutputFormat::Text {
        println!("Running {:?} match with seed {seed}...", config.mode);
        println!("Players: {}", labels.join(", "));
        println!();
    }

    let result = run_match(seed, &config)?;

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &labels));
            if show_board {
                println!();
                print!("{}", result.final_state.board);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonMatchResult::from_match_result(&result))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// "strategy/difficulty" for each seat.
pub(super) fn seat_labels(config: &MatchConfig) -> Vec<String> {
    (0..config.players)
        .map(|seat| {
            let ai = config.ai_for(seat);
            format!("{:?}/{:?}", ai.strategy, ai.difficulty).to_lowercase()
        })
        .collect()
}
