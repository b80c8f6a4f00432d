//! Bounded minimax search with alpha-beta pruning.
//!
//! The side to move at each node is whoever the arbiter handed the turn to,
//! so three- and four-player games search the real rotation: nodes where
//! the searching player moves maximise, all others minimise. Children are
//! ordered by a cheap pre-simulation key and capped at `max_branching`.

// Cell and unit counts are small; f64 conversion is exact
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::ai::{simulate, Evaluator, Personality};
use crate::game::{
    critical_mass, is_corner, is_edge, legal_moves, neighbors, Coord, GameState, Mode, PlayerId,
};

/// Score of a won position (lost positions score its negation).
///
/// Adjusted by ply so that faster wins and slower losses rank higher.
pub const WIN_SCORE: f64 = 1_000_000.0;

/// Scores root moves by searching the game tree below them.
#[derive(Debug, Clone, Copy)]
pub struct SearchEvaluator {
    /// Plies searched, root move included.
    pub depth: u32,
    /// Children kept per node after ordering.
    pub max_branching: usize,
    /// Wall-clock budget for the whole decision.
    pub time_budget: Option<Duration>,
    /// Search root moves on the rayon pool.
    pub parallel: bool,
}

impl Evaluator for SearchEvaluator {
    fn score_moves(
        &self,
        state: &GameState,
        player: PlayerId,
        moves: &[Coord],
        personality: &Personality,
    ) -> Vec<f64> {
        let search = Search {
            root: player,
            personality: *personality,
            max_branching: self.max_branching,
            deadline: self.time_budget.map(|budget| Instant::now() + budget),
        };
        let depth = self.depth;

        // Every root move gets a full window so scores are exact and do not
        // depend on evaluation order.
        let score_root = |coord: Coord| match simulate(state, coord, player) {
            Some(outcome) if search.expired() => evaluate(&outcome.state, player, personality),
            Some(outcome) => search.minimax(
                &outcome.state,
                depth.saturating_sub(1),
                1,
                f64::NEG_INFINITY,
                f64::INFINITY,
            ),
            None => f64::NEG_INFINITY,
        };

        if self.parallel {
            moves.par_iter().map(|&coord| score_root(coord)).collect()
        } else {
            moves.iter().map(|&coord| score_root(coord)).collect()
        }
    }
}

struct Search {
    root: PlayerId,
    personality: Personality,
    max_branching: usize,
    deadline: Option<Instant>,
}

impl Search {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn minimax(&self, state: &GameState, depth: u32, ply: u32, mut alpha: f64, mut beta: f64) -> f64 {
        if state.is_over {
            return match state.winner {
                Some(winner) if winner == self.root => WIN_SCORE - f64::from(ply),
                Some(_) => -WIN_SCORE + f64::from(ply),
                None => 0.0,
            };
        }
        if depth == 0 || self.expired() {
            return evaluate(state, self.root, &self.personality);
        }

        let mover = state.active_player;
        let maximizing = mover == self.root;
        let moves = ordered_moves(state, mover, self.max_branching);

        if moves.is_empty() {
            // Nothing to play: the turn passes.
            return match state.pass_turn(mover) {
                Ok(next) => self.minimax(&next, depth - 1, ply + 1, alpha, beta),
                Err(_) => evaluate(state, self.root, &self.personality),
            };
        }

        let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };
        for coord in moves {
            let Some(outcome) = simulate(state, coord, mover) else {
                continue;
            };
            let score = self.minimax(&outcome.state, depth - 1, ply + 1, alpha, beta);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

/// Legal moves for `mover`, most promising first, capped at `limit`.
///
/// The key is cheap: cells about to explode (more so next to enemies),
/// then fuller cells, then empty ones. Ties keep row-major order.
fn ordered_moves(state: &GameState, mover: PlayerId, limit: usize) -> Vec<Coord> {
    let mut keyed: Vec<(f64, Coord)> = legal_moves(state, mover)
        .into_iter()
        .map(|coord| (order_key(state, coord, mover), coord))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.truncate(limit);
    keyed.into_iter().map(|(_, coord)| coord).collect()
}

fn order_key(state: &GameState, coord: Coord, mover: PlayerId) -> f64 {
    let board = &state.board;
    let rows = board.rows();
    let cols = board.cols();
    let Some(cell) = board.get(coord) else {
        return f64::NEG_INFINITY;
    };
    let mass = critical_mass(coord.row, coord.col, rows, cols);

    let (around, count) = neighbors(coord.row, coord.col, rows, cols);
    let enemies = around[..usize::from(count)]
        .iter()
        .filter(|&&near| {
            board
                .get(near)
                .and_then(|c| c.owner)
                .is_some_and(|owner| owner != mover)
        })
        .count() as f64;

    let power_up = if state.power_up_at(coord).is_some() { 3.0 } else { 0.0 };
    if cell.units + 1 >= mass {
        10.0 + 2.0 * enemies + power_up
    } else {
        f64::from(cell.units + 1) / f64::from(mass) + 0.25 * enemies + power_up
    }
}

/// Static evaluation of `state` from `player`'s point of view.
///
/// Sums material (units and cells), position (corners and edges held),
/// mobility, safety (own cells exposed to loaded enemy cells) and tempo
/// (own loaded cells), each measured against all opponents. Base games add
/// HQ health.
///
/// `personality` scales material by `tactical`, position by `positional`,
/// tempo by `chain` and safety by `risk`. An own cell exposed to the rival
/// counts [`Personality::threat_weight`] times. Own HQ health is scaled by
/// `base_defense`, enemy HQ health by `base_threat`.
#[must_use]
pub fn evaluate(state: &GameState, player: PlayerId, personality: &Personality) -> f64 {
    if state.is_over {
        return match state.winner {
            Some(winner) if winner == player => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0.0,
        };
    }

    let mine = Tally::of(state, player, |owner| personality.threat_weight(owner));
    let theirs = state
        .opponents(player)
        .map(|opponent| Tally::of(state, opponent, |_| 1.0))
        .fold(Tally::default(), Tally::plus);

    let material = (mine.units - theirs.units) + 2.0 * (mine.cells - theirs.cells);
    let position = 1.5 * (mine.corners - theirs.corners) + 0.5 * (mine.edges - theirs.edges);
    let safety = -1.5 * (mine.exposed - theirs.exposed);
    let tempo = mine.loaded - theirs.loaded;
    let mobility = 0.1 * legal_moves(state, player).len() as f64;

    let mut score = personality.tactical * material
        + personality.positional * position
        + personality.risk * safety
        + personality.chain * tempo
        + mobility;
    if state.mode == Mode::Base {
        let own = state.hq_of(player).map_or(0.0, |hq| f64::from(hq.health));
        let enemy: f64 = state
            .hqs
            .iter()
            .filter(|hq| hq.owner != player)
            .map(|hq| f64::from(hq.health))
            .sum();
        score += 25.0 * (personality.base_defense * own - personality.base_threat * enemy);
    }
    score
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    units: f64,
    cells: f64,
    corners: f64,
    edges: f64,
    loaded: f64,
    exposed: f64,
}

impl Tally {
    /// `threat` weighs an exposure by the owner of the loaded enemy cell;
    /// the heaviest adjacent threat counts.
    fn of(state: &GameState, player: PlayerId, threat: impl Fn(PlayerId) -> f64) -> Self {
        let board = &state.board;
        let rows = board.rows();
        let cols = board.cols();
        let is_loaded = |coord: Coord, units: u32| units + 1 >= critical_mass(coord.row, coord.col, rows, cols);

        let mut tally = Self::default();
        for (coord, cell) in board.cells_owned_by(player) {
            tally.units += f64::from(cell.units);
            tally.cells += 1.0;
            if is_corner(coord, rows, cols) {
                tally.corners += 1.0;
            } else if is_edge(coord, rows, cols) {
                tally.edges += 1.0;
            }
            if is_loaded(coord, cell.units) {
                tally.loaded += 1.0;
            }

            let (around, count) = neighbors(coord.row, coord.col, rows, cols);
            let exposure = around[..usize::from(count)]
                .iter()
                .filter_map(|&near| {
                    let c = board.get(near)?;
                    let owner = c.owner.filter(|&owner| owner != player)?;
                    is_loaded(near, c.units).then(|| threat(owner))
                })
                .fold(0.0, f64::max);
            tally.exposed += exposure;
        }
        tally
    }

    fn plus(self, other: Self) -> Self {
        Self {
            units: self.units + other.units,
            cells: self.cells + other.cells,
            corners: self.corners + other.corners,
            edges: self.edges + other.edges,
            loaded: self.loaded + other.loaded,
            exposed: self.exposed + other.exposed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_game, Cell, GameSetup};

    fn evaluator(depth: u32) -> SearchEvaluator {
        SearchEvaluator {
            depth,
            max_branching: 8,
            time_budget: None,
            parallel: false,
        }
    }

    #[test]
    fn test_evaluate_is_zero_sum_in_duel_material() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(4, 4), Cell::owned(1, 2));
        state.board.set(Coord::new(2, 2), Cell::owned(2, 1));
        let neutral = Personality::NEUTRAL;
        assert!(evaluate(&state, 1, &neutral) > evaluate(&state, 2, &neutral));
    }

    #[test]
    fn test_evaluate_weighs_rival_threats() {
        // Player 1's cell at (4, 4) sits next to a loaded cell of player 3.
        let mut state = new_game(Mode::Classic, 3, &[1, 2, 3]).unwrap();
        state.board.set(Coord::new(4, 4), Cell::owned(1, 1));
        state.board.set(Coord::new(4, 5), Cell::owned(3, 3));
        state.board.set(Coord::new(0, 0), Cell::owned(2, 1));

        let neutral = Personality::NEUTRAL;
        let wary_of_three = Personality {
            rival: Some(3),
            ..Personality::NEUTRAL
        };
        let wary_of_two = Personality {
            rival: Some(2),
            ..Personality::NEUTRAL
        };
        let base = evaluate(&state, 1, &neutral);
        assert!(evaluate(&state, 1, &wary_of_three) < base);
        assert_eq!(evaluate(&state, 1, &wary_of_two), base);
    }

    #[test]
    fn test_personality_changes_search_ranking() {
        // Grabbing the corner against blowing up the loaded centre cell:
        // the positional player takes the corner, the tactical one the
        // explosion.
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(4, 4), Cell::owned(1, 3));
        state.board.set(Coord::new(2, 2), Cell::owned(2, 1));
        state.move_count = 2;
        state.turns_taken = vec![1, 1];
        let moves = vec![Coord::new(0, 0), Coord::new(4, 4)];

        let positional = Personality {
            positional: 1.4,
            tactical: 0.6,
            ..Personality::NEUTRAL
        };
        let tactical = Personality {
            positional: 0.6,
            tactical: 1.4,
            ..Personality::NEUTRAL
        };
        let search = evaluator(1);
        let for_positional = search.score_moves(&state, 1, &moves, &positional);
        let for_tactical = search.score_moves(&state, 1, &moves, &tactical);
        assert!(for_positional[0] > for_positional[1], "{for_positional:?}");
        assert!(for_tactical[0] < for_tactical[1], "{for_tactical:?}");
    }

    #[test]
    fn test_ordering_puts_loaded_cells_first() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(4, 4), Cell::owned(1, 3));
        let moves = ordered_moves(&state, 1, 5);
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[0], Coord::new(4, 4));
    }

    #[test]
    fn test_search_avoids_handing_over_a_win() {
        // 3x3 classic. Player 2's loaded corner at (0, 0) sits next to
        // player 1's only cell. Loading that cell further lets player 2's
        // explosion chain through it and wipe player 1 out.
        let mut state = GameState::new(&GameSetup {
            rows: 3,
            cols: 3,
            ..GameSetup::default()
        })
        .unwrap();
        state.board.set(Coord::new(0, 0), Cell::owned(2, 1));
        state.board.set(Coord::new(0, 1), Cell::owned(1, 1));
        state.move_count = 2;
        state.turns_taken = vec![1, 1];

        let moves = vec![Coord::new(0, 1), Coord::new(2, 2)];
        let scores = evaluator(2).score_moves(&state, 1, &moves, &Personality::NEUTRAL);
        assert!(scores[0] < -WIN_SCORE / 2.0, "{scores:?}");
        assert!(scores[1] > scores[0], "{scores:?}");
    }

    #[test]
    fn test_time_budget_still_scores_every_move() {
        let state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        let moves = legal_moves(&state, 1);
        let search = SearchEvaluator {
            time_budget: Some(Duration::ZERO),
            ..evaluator(4)
        };
        let scores = search.score_moves(&state, 1, &moves, &Personality::NEUTRAL);
        assert_eq!(scores.len(), moves.len());
        assert!(scores.iter().all(|s| s.is_finite()));
    }
}
