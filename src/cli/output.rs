//! Output formatting utilities for CLI.

// Averages over game counts
#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;

use chainfall::tournament::MatchResult;
use chainfall::PlayerId;
use serde::Serialize;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatchResult<'a> {
    /// Random seed used.
    seed: u64,
    /// Winner player ID (null if draw or called off).
    winner: Option<PlayerId>,
    /// Moves played, passes included.
    moves_played: u32,
    /// Whether the move limit ended the match.
    hit_move_limit: bool,
    /// Per-player results.
    players: &'a [chainfall::tournament::PlayerStats],
    /// Elimination order.
    elimination_order: &'a [PlayerId],
}

impl<'a> JsonMatchResult<'a> {
    /// Create from a `MatchResult`.
    pub(super) fn from_match_result(result: &'a MatchResult) -> Self {
        Self {
            seed: result.seed,
            winner: result.winner,
            moves_played: result.moves_played,
            hit_move_limit: result.hit_move_limit,
            players: &result.player_stats,
            elimination_order: &result.elimination_order,
        }
    }
}

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult, labels: &[String]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Match Result (seed: {})", result.seed);
    match result.winner {
        Some(winner) => {
            let name = label(labels, usize::from(winner) - 1);
            let _ = writeln!(output, "  Winner: Player {winner} ({name})");
        }
        None if result.hit_move_limit => output.push_str("  Winner: none (move limit)\n"),
        None => output.push_str("  Winner: Draw\n"),
    }
    let _ = writeln!(output, "  Moves: {}\n", result.moves_played);

    for (i, stats) in result.player_stats.iter().enumerate() {
        let _ = write!(
            output,
            "  Player {} ({}): {} cells, {} units, {} explosions, longest chain {}",
            stats.player_id,
            label(labels, i),
            stats.final_cells,
            stats.final_units,
            stats.explosions,
            stats.longest_chain
        );
        if let Some(health) = stats.hq_health {
            let _ = write!(output, ", HQ {health}");
        }
        if let Some(at) = stats.eliminated_at {
            let _ = write!(output, " [eliminated move {at}]");
        }
        output.push('\n');
    }
    if result.cascade_truncated {
        output.push_str("  (a cascade hit the explosion budget)\n");
    }

    output
}

fn label(labels: &[String], seat: usize) -> &str {
    labels.get(seat).map_or("Unknown", String::as_str)
}

/// Tournament statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct TournamentStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games that failed to run.
    pub(super) errors: u64,
    /// Win count per seat.
    pub(super) wins: Vec<u64>,
    /// Draws (base mode, every HQ destroyed at once).
    pub(super) draws: u64,
    /// Games that hit the move limit.
    pub(super) unfinished: u64,
    /// Total moves across all games.
    total_moves: u64,
    /// Total explosions per seat.
    explosions: Vec<u64>,
    /// Longest chain seen in any game.
    pub(super) longest_chain: u32,
}

impl TournamentStats {
    /// Create new stats for n seats.
    pub(super) fn new(num_players: usize) -> Self {
        Self {
            wins: vec![0; num_players],
            explosions: vec![0; num_players],
            ..Self::default()
        }
    }

    /// Add a match result to the stats.
    pub(super) fn add_result(&mut self, result: &MatchResult) {
        self.games_played += 1;
        self.total_moves += u64::from(result.moves_played);

        match result.winner {
            Some(winner) => {
                if let Some(wins) = self.wins.get_mut(usize::from(winner) - 1) {
                    *wins += 1;
                }
            }
            None if result.hit_move_limit => self.unfinished += 1,
            None => self.draws += 1,
        }

        for (i, stats) in result.player_stats.iter().enumerate() {
            if let Some(total) = self.explosions.get_mut(i) {
                *total += stats.explosions;
            }
            self.longest_chain = self.longest_chain.max(stats.longest_chain);
        }
    }

    /// Merge another thread's stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.errors += other.errors;
        self.draws += other.draws;
        self.unfinished += other.unfinished;
        self.total_moves += other.total_moves;
        self.longest_chain = self.longest_chain.max(other.longest_chain);
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.explosions.iter_mut().zip(&other.explosions) {
            *a += b;
        }
    }

    /// Get win rate for a seat (0.0-1.0).
    pub(super) fn win_rate(&self, seat: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(seat).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Get average explosions per game for a seat.
    pub(super) fn avg_explosions(&self, seat: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.explosions.get(seat).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Get average game length.
    pub(super) fn avg_moves(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_moves as f64 / self.games_played as f64
    }
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total games played.
    games_played: u64,
    /// Games that failed to run.
    errors: u64,
    /// Per-seat statistics.
    players: Vec<JsonTournamentPlayer>,
    /// Number of draws.
    draws: u64,
    /// Games called off at the move limit.
    unfinished: u64,
    /// Average game length in moves.
    avg_moves: f64,
    /// Longest chain seen.
    longest_chain: u32,
}

/// JSON-serializable per-seat tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentPlayer {
    /// Player ID.
    player: usize,
    /// Seat label (strategy/difficulty).
    ai: String,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average explosions per game.
    avg_explosions: f64,
}

impl JsonTournamentResult {
    /// Create from stats and seat labels.
    pub(super) fn from_stats(stats: &TournamentStats, labels: &[String]) -> Self {
        let players = (0..labels.len())
            .map(|i| JsonTournamentPlayer {
                player: i + 1,
                ai: label(labels, i).to_string(),
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                avg_explosions: stats.avg_explosions(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            errors: stats.errors,
            players,
            draws: stats.draws,
            unfinished: stats.unfinished,
            avg_moves: stats.avg_moves(),
            longest_chain: stats.longest_chain,
        }
    }
}

/// Format tournament stats as human-readable text.
pub(super) fn format_tournament_text(stats: &TournamentStats, labels: &[String]) -> String {
    let mut output = String::new();
    let games = stats.games_played.max(1) as f64;

    let _ = writeln!(output, "Tournament Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for (i, name) in labels.iter().enumerate() {
        let wins = stats.wins.get(i).copied().unwrap_or(0);
        let rate = stats.win_rate(i) * 100.0;
        let _ = writeln!(output, "  Player {} ({name}): {rate:.1}% ({wins} wins)", i + 1);
    }
    let _ = writeln!(
        output,
        "  Draws: {} ({:.1}%)",
        stats.draws,
        stats.draws as f64 / games * 100.0
    );
    let _ = writeln!(
        output,
        "  Unfinished: {} ({:.1}%)\n",
        stats.unfinished,
        stats.unfinished as f64 / games * 100.0
    );

    output.push_str("Average Explosions per Game:\n");
    for (i, name) in labels.iter().enumerate() {
        let _ = writeln!(output, "  Player {} ({name}): {:.1}", i + 1, stats.avg_explosions(i));
    }

    let _ = writeln!(output, "\nAverage Game Length: {:.0} moves", stats.avg_moves());
    let _ = writeln!(output, "Longest Chain: {}", stats.longest_chain);
    if stats.errors > 0 {
        let _ = writeln!(output, "Failed Games: {}", stats.errors);
    }

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats, labels: &[String]) -> String {
    let mut output = String::from("player,ai,wins,win_rate,avg_explosions\n");

    for (i, name) in labels.iter().enumerate() {
        let _ = writeln!(
            output,
            "{},{},{},{:.4},{:.2}",
            i + 1,
            name,
            stats.wins.get(i).copied().unwrap_or(0),
            stats.win_rate(i),
            stats.avg_explosions(i)
        );
    }

    output
}
