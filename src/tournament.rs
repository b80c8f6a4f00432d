//! Match runner for Chainfall games.
//!
//! Provides a pure function interface: `(seed, config) -> MatchResult`
//!
//! The runner handles:
//! - Game setup from a [`MatchConfig`]
//! - One [`AiContext`] per match, seeded from the match seed
//! - Passing the turn when a player has no legal move
//! - Per-player statistics and elimination order

mod config;

pub use config::MatchConfig;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::ai::AiContext;
use crate::error::{MoveError, SetupError};
use crate::game::{assert_invariants, GameState, HqEvent, Mode, PlayerId, MAX_PLAYERS};

/// Salt mixed into the match seed for the AI stream, so AI decisions and
/// power-up spawns draw from unrelated sequences.
const AI_SEED_SALT: u64 = 0xA1A1_5EED_0000_0001;

/// Error type for match operations.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The game could not be set up.
    #[error("invalid match setup: {0}")]
    Setup(#[from] SetupError),
    /// A move chosen by the AI was rejected.
    #[error("move rejected: {0}")]
    Move(#[from] MoveError),
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration could not be parsed.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Statistics for a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Moves placed.
    pub moves: u32,
    /// Turns passed for lack of a legal move.
    pub passes: u32,
    /// Explosions set off by this player's moves.
    pub explosions: u64,
    /// Deepest chain this player triggered.
    pub longest_chain: u32,
    /// Damage dealt to enemy headquarters.
    pub hq_damage_dealt: u32,
    /// Power-ups collected.
    pub power_ups: u32,
    /// Cells owned at the end.
    pub final_cells: u32,
    /// Units owned at the end.
    pub final_units: u32,
    /// HQ health at the end (base mode only).
    pub hq_health: Option<u8>,
    /// Move count at which the player was knocked out (None if survived).
    pub eliminated_at: Option<u32>,
}

impl PlayerStats {
    fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            moves: 0,
            passes: 0,
            explosions: 0,
            longest_chain: 0,
            hq_damage_dealt: 0,
            power_ups: 0,
            final_cells: 0,
            final_units: 0,
            hq_health: None,
            eliminated_at: None,
        }
    }
}

/// Final result of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The winning player (None if draw or called off).
    pub winner: Option<PlayerId>,
    /// Moves played, passes included.
    pub moves_played: u32,
    /// Whether the match hit the move limit before finishing.
    pub hit_move_limit: bool,
    /// Whether any cascade was cut off by the explosion budget.
    pub cascade_truncated: bool,
    /// Per-player statistics in seating order.
    pub player_stats: Vec<PlayerStats>,
    /// Elimination order (first eliminated is index 0).
    pub elimination_order: Vec<PlayerId>,
    /// The seed used for this match.
    pub seed: u64,
    /// Final state.
    #[serde(skip)]
    pub final_state: GameState,
}

/// Run a complete AI-vs-AI match.
///
/// Given the same seed and configuration, this function always produces
/// the same [`MatchResult`] (unless a search time budget is configured).
///
/// # Errors
///
/// Returns an error if the configuration does not describe a valid game.
pub fn run_match(seed: u64, config: &MatchConfig) -> Result<MatchResult, MatchError> {
    if !(2..=MAX_PLAYERS).contains(&config.players) {
        return Err(SetupError::PlayerCount(config.players).into());
    }
    let state = GameState::new(&config.setup(seed))?;
    MatchRunner::new(seed, config, state).run()
}

/// Drives one match from setup to result.
struct MatchRunner<'a> {
    config: &'a MatchConfig,
    state: GameState,
    ai: AiContext,
    stats: Vec<PlayerStats>,
    elimination_order: Vec<PlayerId>,
    cascade_truncated: bool,
    seed: u64,
}

impl<'a> MatchRunner<'a> {
    fn new(seed: u64, config: &'a MatchConfig, state: GameState) -> Self {
        let ai = AiContext::new(seed ^ AI_SEED_SALT, &state);
        let stats = state.players.iter().map(|&p| PlayerStats::new(p)).collect();
        Self {
            config,
            state,
            ai,
            stats,
            elimination_order: Vec::new(),
            cascade_truncated: false,
            seed,
        }
    }

    fn run(mut self) -> Result<MatchResult, MatchError> {
        debug!(seed = self.seed, mode = ?self.config.mode, players = self.config.players, "match started");

        while !self.state.is_over && self.state.move_count < self.config.max_moves {
            self.play_turn()?;
            assert_invariants(&self.state);
            self.track_eliminations();
        }

        Ok(self.finish())
    }

    fn play_turn(&mut self) -> Result<(), MatchError> {
        let player = self.state.active_player;
        let Some(seat) = self.state.seat_of(player) else {
            unreachable!("active player {player} is not seated");
        };
        let ai_config = self.config.ai_for(seat);

        match self.ai.choose_move(&self.state, player, &ai_config) {
            Some(coord) => {
                let outcome = self.state.apply_move(coord, player)?;
                let log = outcome.log;
                let stats = &mut self.stats[seat];
                stats.moves += 1;
                stats.explosions += log.explosions.len() as u64;
                stats.longest_chain = stats.longest_chain.max(log.max_depth);
                stats.power_ups += u32::from(log.power_up.is_some());
                stats.hq_damage_dealt += log
                    .hq_events
                    .iter()
                    .filter(|event| matches!(event, HqEvent::Damaged { by, .. } if *by == player))
                    .map(|_| 1)
                    .sum::<u32>();
                self.cascade_truncated |= log.truncated;
                self.state = outcome.state;
            }
            None => {
                self.stats[seat].passes += 1;
                self.state = self.state.pass_turn(player)?;
            }
        }
        Ok(())
    }

    fn track_eliminations(&mut self) {
        let state = &self.state;
        for stats in &mut self.stats {
            if stats.eliminated_at.is_some() {
                continue;
            }
            let out = match state.mode {
                Mode::Base => !state.is_alive(stats.player_id),
                Mode::Classic => {
                    state.everyone_has_moved() && state.board.count_cells(stats.player_id) == 0
                }
            };
            if out {
                stats.eliminated_at = Some(state.move_count);
                self.elimination_order.push(stats.player_id);
                debug!(player = stats.player_id, at = state.move_count, "player eliminated");
            }
        }
    }

    fn finish(mut self) -> MatchResult {
        for stats in &mut self.stats {
            stats.final_cells = self.state.board.count_cells(stats.player_id);
            stats.final_units = self.state.board.total_units_of(stats.player_id);
            stats.hq_health = self.state.hq_of(stats.player_id).map(|hq| hq.health);
        }

        let hit_move_limit = !self.state.is_over;
        debug!(
            seed = self.seed,
            winner = ?self.state.winner,
            moves = self.state.move_count,
            hit_move_limit,
            "match finished"
        );

        MatchResult {
            winner: self.state.winner,
            moves_played: self.state.move_count,
            hit_move_limit,
            cascade_truncated: self.cascade_truncated,
            player_stats: self.stats,
            elimination_order: self.elimination_order,
            seed: self.seed,
            final_state: self.state,
        }
    }
}
