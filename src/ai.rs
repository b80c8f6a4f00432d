//! AI decision engine.
//!
//! Given a state and the player to act, the engine enumerates legal moves,
//! scores them with an [`Evaluator`] and picks one according to the
//! configured [`Difficulty`]. Two evaluators exist:
//!
//! - [`HeuristicEvaluator`]: one-ply simulation plus weighted sub-scores
//! - [`SearchEvaluator`]: minimax with alpha-beta pruning
//!
//! Both are driven by a per-player [`Personality`] held in an [`AiContext`]
//! that lives for one game.

mod heuristic;
mod personality;
mod search;
mod select;

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::{
    finish_turn, is_legal_move, legal_moves, Coord, GameState, MoveOutcome, PlayerId,
};

pub use heuristic::{score_move, HeuristicEvaluator};
pub use personality::{Personality, MAX_WEIGHT, MIN_WEIGHT};
pub use search::{evaluate, SearchEvaluator, WIN_SCORE};
pub use select::{pick_move, rank_moves};

/// How moves are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One-ply simulation with weighted heuristics.
    #[default]
    Heuristic,
    /// Bounded minimax with alpha-beta pruning.
    Search,
}

/// How far down the ranking the AI may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Any move from the top half.
    Easy,
    /// Any move from the top quarter.
    #[default]
    Medium,
    /// Always the best-ranked move.
    Hard,
}

impl Difficulty {
    /// Share of the ranking the pick is drawn from (0 means best only).
    #[must_use]
    pub const fn top_fraction(self) -> f64 {
        match self {
            Self::Easy => 0.5,
            Self::Medium => 0.25,
            Self::Hard => 0.0,
        }
    }
}

/// Per-player AI settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Scoring strategy.
    pub strategy: Strategy,
    /// Pick policy.
    pub difficulty: Difficulty,
    /// Search depth in plies.
    pub search_depth: u32,
    /// Children kept per search node after ordering.
    pub max_branching: usize,
    /// Wall-clock budget for one search decision.
    pub time_budget_ms: Option<u64>,
    /// Uniform noise amplitude added to final scores.
    pub noise: f64,
    /// Score root moves on the rayon pool.
    pub parallel: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Heuristic,
            difficulty: Difficulty::Medium,
            search_depth: 3,
            max_branching: 12,
            time_budget_ms: None,
            noise: 2.0,
            parallel: false,
        }
    }
}

impl AiConfig {
    /// Build the evaluator this configuration asks for.
    #[must_use]
    pub fn evaluator(&self) -> Box<dyn Evaluator> {
        match self.strategy {
            Strategy::Heuristic => Box::new(HeuristicEvaluator {
                parallel: self.parallel,
            }),
            Strategy::Search => Box::new(SearchEvaluator {
                depth: self.search_depth.max(1),
                max_branching: self.max_branching.max(1),
                time_budget: self.time_budget_ms.map(Duration::from_millis),
                parallel: self.parallel,
            }),
        }
    }
}

/// Scores candidate moves for a player.
///
/// Higher is better. The returned vector is parallel to `moves`.
pub trait Evaluator: Send + Sync {
    /// Score every move in `moves` for `player`.
    fn score_moves(
        &self,
        state: &GameState,
        player: PlayerId,
        moves: &[Coord],
        personality: &Personality,
    ) -> Vec<f64>;
}

/// Play `coord` for `player` on a copy of `state` without side effects
/// beyond the copy: the cascade resolves and the turn rotates, but no
/// power-up spawns and no history is recorded.
///
/// Returns `None` if the game is over or the move is illegal. The turn
/// order is not checked, so opponents' replies can be simulated.
#[must_use]
pub fn simulate(state: &GameState, coord: Coord, player: PlayerId) -> Option<MoveOutcome> {
    if state.is_over || !is_legal_move(state, coord, player) {
        return None;
    }

    let mut next = state.clone();
    next.active_player = player;
    let log = next.resolve_move(coord, player);
    finish_turn(&mut next, player);
    Some(MoveOutcome { state: next, log })
}

/// Per-game AI state: one personality per player and the decision RNG.
#[derive(Debug, Clone)]
pub struct AiContext {
    rng: SmallRng,
    personalities: BTreeMap<PlayerId, Personality>,
}

impl AiContext {
    /// Build the context for a game. Personalities are rolled once here and
    /// kept for the whole game.
    #[must_use]
    pub fn new(seed: u64, state: &GameState) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let personalities = state
            .players
            .iter()
            .map(|&player| {
                let opponents: Vec<PlayerId> = state.opponents(player).collect();
                (player, Personality::random(&mut rng, &opponents))
            })
            .collect();
        Self { rng, personalities }
    }

    /// The personality of `player` (neutral for players not in the game).
    #[must_use]
    pub fn personality(&self, player: PlayerId) -> Personality {
        self.personalities
            .get(&player)
            .copied()
            .unwrap_or(Personality::NEUTRAL)
    }

    /// Pick a move for `player`, or `None` if it has no legal move.
    pub fn choose_move(&mut self, state: &GameState, player: PlayerId, config: &AiConfig) -> Option<Coord> {
        if state.is_over {
            return None;
        }
        let moves = legal_moves(state, player);
        if moves.is_empty() {
            debug!(player, "no legal move");
            return None;
        }

        let personality = self.personality(player);
        let scores = config
            .evaluator()
            .score_moves(state, player, &moves, &personality);
        let ranked = rank_moves(&moves, &scores, config.noise, &mut self.rng);
        let choice = pick_move(&ranked, config.difficulty, &mut self.rng);

        if let Some(coord) = choice {
            debug!(
                player,
                strategy = ?config.strategy,
                difficulty = ?config.difficulty,
                candidates = moves.len(),
                at = %coord,
                "ai move chosen"
            );
        }
        choice
    }
}

/// Pick a move for `player` using `ctx`.
pub fn choose_move(ctx: &mut AiContext, state: &GameState, player: PlayerId, config: &AiConfig) -> Option<Coord> {
    ctx.choose_move(state, player, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_game, Cell, GameSetup, Mode};

    fn config(strategy: Strategy) -> AiConfig {
        AiConfig {
            strategy,
            search_depth: 2,
            max_branching: 6,
            ..AiConfig::default()
        }
    }

    /// Player 1 wins by exploding the loaded corner: player 2's only cell
    /// is captured.
    fn winning_position() -> GameState {
        let mut state = GameState::new(&GameSetup {
            rows: 3,
            cols: 3,
            ..GameSetup::default()
        })
        .unwrap();
        state.board.set(Coord::new(0, 0), Cell::owned(1, 1));
        state.board.set(Coord::new(0, 1), Cell::owned(2, 1));
        state.move_count = 2;
        state.turns_taken = vec![1, 1];
        state
    }

    #[test]
    fn test_simulate_leaves_input_untouched() {
        let state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        let before = state.clone();
        let outcome = simulate(&state, Coord::new(0, 0), 1).unwrap();
        assert_eq!(state, before);
        assert_eq!(outcome.state.move_count, 1);
        assert!(outcome.state.power_ups.is_empty());
        assert!(simulate(&state, Coord::new(4, 4), 1).is_none());
    }

    #[test]
    fn test_ai_returns_legal_moves() {
        for strategy in [Strategy::Heuristic, Strategy::Search] {
            for mode in [Mode::Classic, Mode::Base] {
                let state = new_game(mode, 3, &[1, 2, 3]).unwrap();
                let mut ctx = AiContext::new(11, &state);
                let coord = ctx.choose_move(&state, 1, &config(strategy)).unwrap();
                assert!(is_legal_move(&state, coord, 1), "{strategy:?} {mode:?} {coord}");
            }
        }
    }

    #[test]
    fn test_ai_is_deterministic_per_seed() {
        let state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        let mut cfg = config(Strategy::Heuristic);
        cfg.difficulty = Difficulty::Easy;

        let picks = |seed| {
            let mut ctx = AiContext::new(seed, &state);
            (0..5)
                .map(|_| ctx.choose_move(&state, 1, &cfg))
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(3), picks(3));
    }

    #[test]
    fn test_parallel_scoring_matches_sequential() {
        let state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        let outcome = state.apply_move(Coord::new(0, 0), 1).unwrap();
        let next = outcome.state;
        let moves = legal_moves(&next, 2);
        let personality = Personality::NEUTRAL;

        for strategy in [Strategy::Heuristic, Strategy::Search] {
            let mut cfg = config(strategy);
            let sequential = cfg.evaluator().score_moves(&next, 2, &moves, &personality);
            cfg.parallel = true;
            let parallel = cfg.evaluator().score_moves(&next, 2, &moves, &personality);
            assert_eq!(sequential, parallel, "{strategy:?}");
        }
    }

    #[test]
    fn test_both_strategies_take_immediate_win() {
        let state = winning_position();
        for strategy in [Strategy::Heuristic, Strategy::Search] {
            let mut cfg = config(strategy);
            cfg.difficulty = Difficulty::Hard;
            cfg.noise = 0.0;
            let mut ctx = AiContext::new(5, &state);
            assert_eq!(
                ctx.choose_move(&state, 1, &cfg),
                Some(Coord::new(0, 0)),
                "{strategy:?}"
            );
        }
    }

    #[test]
    fn test_no_moves_returns_none() {
        let mut state = GameState::new(&GameSetup {
            rows: 2,
            cols: 2,
            ..GameSetup::default()
        })
        .unwrap();
        for (coord, _) in state.board.clone().iter() {
            state.board.set(coord, Cell::owned(2, 1));
        }
        let mut ctx = AiContext::new(1, &state);
        assert_eq!(ctx.choose_move(&state, 1, &AiConfig::default()), None);

        state.is_over = true;
        assert_eq!(choose_move(&mut ctx, &state, 2, &AiConfig::default()), None);
    }

    #[test]
    fn test_personalities_fixed_for_game() {
        let state = new_game(Mode::Classic, 4, &[1, 2, 3, 4]).unwrap();
        let mut ctx = AiContext::new(9, &state);
        let before: Vec<_> = (1..=4).map(|p| ctx.personality(p)).collect();
        let _ = ctx.choose_move(&state, 1, &AiConfig::default());
        let after: Vec<_> = (1..=4).map(|p| ctx.personality(p)).collect();
        assert_eq!(before, after);
        assert_eq!(ctx.personality(9), Personality::NEUTRAL);
    }
}
