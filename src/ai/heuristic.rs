//! One-ply heuristic scoring.
//!
//! Each candidate is simulated once; the successor state and the cascade log
//! feed five sub-scores which the personality weighs:
//!
//! | category   | rewards                                              |
//! |------------|------------------------------------------------------|
//! | tactical   | captured cells, loading own cells, empty placements  |
//! | positional | corners and edges early, the centre later            |
//! | chain      | number and depth of explosions                       |
//! | risk       | (subtracted) cells lost to each opponent's best reply |
//! | base       | damage to and proximity of enemy HQs, own HQ care    |

// Cell and unit counts are small; f64 conversion is exact
#![allow(clippy::cast_precision_loss)]

use rayon::prelude::*;

use crate::ai::{simulate, Evaluator, Personality, WIN_SCORE};
use crate::game::{
    chebyshev_distance, critical_mass, is_corner, is_edge, CascadeLog, Coord, GameState, HqEvent,
    Mode, PlayerId, MAX_HQ_HEALTH,
};

/// Cells a player must own before the opening phase ends.
const OPENING_CELLS: u32 = 4;

/// Scores moves by simulating them once.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator {
    /// Score moves on the rayon pool.
    pub parallel: bool,
}

impl Evaluator for HeuristicEvaluator {
    fn score_moves(
        &self,
        state: &GameState,
        player: PlayerId,
        moves: &[Coord],
        personality: &Personality,
    ) -> Vec<f64> {
        if self.parallel {
            moves
                .par_iter()
                .map(|&coord| score_move(state, coord, player, personality))
                .collect()
        } else {
            moves
                .iter()
                .map(|&coord| score_move(state, coord, player, personality))
                .collect()
        }
    }
}

/// Heuristic value of `player` playing `coord`. Illegal moves score
/// negative infinity; a move that wins outright scores [`WIN_SCORE`].
#[must_use]
pub fn score_move(state: &GameState, coord: Coord, player: PlayerId, personality: &Personality) -> f64 {
    let Some(outcome) = simulate(state, coord, player) else {
        return f64::NEG_INFINITY;
    };
    let after = &outcome.state;
    if after.is_over {
        return match after.winner {
            Some(winner) if winner == player => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0.0,
        };
    }

    let mut score = personality.tactical * tactical(state, after, coord, player)
        + personality.positional * positional(state, coord, player)
        + personality.chain * chain(&outcome.log)
        - personality.risk * risk(after, player, personality);

    if state.mode == Mode::Base {
        score += personality.base_threat * base_threat(state, &outcome.log, coord, player)
            + personality.base_defense * base_defense(state, &outcome.log, coord, player);
    }
    score
}

/// Captures, building towards critical mass and empty-cell expansion.
fn tactical(before: &GameState, after: &GameState, coord: Coord, player: PlayerId) -> f64 {
    let board = &before.board;
    let gained = f64::from(after.board.count_cells(player)) - f64::from(board.count_cells(player));
    let captured = opponent_cells(before, player) - opponent_cells(after, player);

    let Some(cell) = board.get(coord) else {
        return 0.0;
    };
    let placement = if cell.is_empty() {
        1.0
    } else {
        let mass = critical_mass(coord.row, coord.col, board.rows(), board.cols());
        if cell.units + 1 >= mass {
            4.0
        } else {
            2.0 * f64::from(cell.units + 1) / f64::from(mass)
        }
    };

    placement + 0.5 * gained + 3.0 * captured
}

/// Corners and edges while opening, centre control afterwards.
fn positional(state: &GameState, coord: Coord, player: PlayerId) -> f64 {
    let rows = state.board.rows();
    let cols = state.board.cols();
    let opening = state.board.count_cells(player) < OPENING_CELLS;

    if is_corner(coord, rows, cols) {
        if opening { 3.0 } else { 1.0 }
    } else if is_edge(coord, rows, cols) {
        if opening { 1.5 } else { 0.5 }
    } else {
        let centre = Coord::new(rows / 2, cols / 2);
        let span = f64::from(rows.max(cols));
        let closeness = 1.0 - f64::from(chebyshev_distance(coord, centre)) / span;
        if opening { 0.5 * closeness } else { 1.5 * closeness }
    }
}

/// Explosion count and depth.
fn chain(log: &CascadeLog) -> f64 {
    1.5 * log.explosions.len() as f64 + f64::from(log.max_depth)
}

/// Cells `player` would lose to each opponent's best immediate capture.
///
/// Only loaded enemy cells (one unit short of exploding) are tried as
/// replies; the rival's threat counts extra.
fn risk(after: &GameState, player: PlayerId, personality: &Personality) -> f64 {
    let mine = f64::from(after.board.count_cells(player));
    let rows = after.board.rows();
    let cols = after.board.cols();

    after
        .opponents(player)
        .filter(|&opponent| after.is_alive(opponent))
        .map(|opponent| {
            let worst = after
                .board
                .cells_owned_by(opponent)
                .filter(|(coord, cell)| {
                    cell.units + 1 >= critical_mass(coord.row, coord.col, rows, cols)
                })
                .filter_map(|(coord, _)| simulate(after, coord, opponent))
                .map(|reply| mine - f64::from(reply.state.board.count_cells(player)))
                .fold(0.0, f64::max);
            worst * personality.threat_weight(opponent)
        })
        .sum()
}

/// Pressure on enemy headquarters.
fn base_threat(state: &GameState, log: &CascadeLog, coord: Coord, player: PlayerId) -> f64 {
    let span = f64::from(state.board.rows().max(state.board.cols()));
    let damage = log
        .hq_events
        .iter()
        .filter(|event| matches!(event, HqEvent::Damaged { by, .. } if *by == player))
        .count() as f64;

    let proximity: f64 = state
        .hqs
        .iter()
        .filter(|hq| hq.owner != player && hq.is_alive())
        .map(|hq| {
            let closeness = 1.0 - f64::from(chebyshev_distance(coord, hq.position)) / span;
            let weakness = 1.0 + f64::from(MAX_HQ_HEALTH - hq.health) / f64::from(MAX_HQ_HEALTH);
            closeness * weakness
        })
        .sum();

    6.0 * damage + proximity
}

/// Care for the own headquarters: stay close when it is hurt, value heals.
fn base_defense(state: &GameState, log: &CascadeLog, coord: Coord, player: PlayerId) -> f64 {
    let Some(hq) = state.hq_of(player) else {
        return 0.0;
    };
    let span = f64::from(state.board.rows().max(state.board.cols()));
    let closeness = 1.0 - f64::from(chebyshev_distance(coord, hq.position)) / span;
    let missing = f64::from(MAX_HQ_HEALTH - hq.health);
    let heals = log
        .hq_events
        .iter()
        .filter(|event| matches!(event, HqEvent::Healed { owner, .. } if *owner == player))
        .count() as f64;

    0.5 * closeness * (1.0 + missing) + 4.0 * heals
}

fn opponent_cells(state: &GameState, player: PlayerId) -> f64 {
    state
        .opponents(player)
        .map(|opponent| f64::from(state.board.count_cells(opponent)))
        .sum()
}
