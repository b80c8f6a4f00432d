//! Turn rotation and win detection.

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Mode, PlayerId};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A single player is left standing.
    Winner(PlayerId),
    /// Nobody is left standing.
    Draw,
}

/// Decide whether the game has ended.
///
/// Base mode: the game ends when at most one HQ still stands; the survivor
/// wins, no survivor is a draw. Classic mode: once two moves have been made
/// and every player has had a turn, a player who is the only one left on the
/// board wins.
#[must_use]
pub fn detect_outcome(state: &GameState) -> Option<Outcome> {
    match state.mode {
        Mode::Base => {
            let mut standing = state.hqs.iter().filter(|hq| hq.is_alive());
            match (standing.next(), standing.next()) {
                (None, _) => Some(Outcome::Draw),
                (Some(hq), None) => Some(Outcome::Winner(hq.owner)),
                _ => None,
            }
        }
        Mode::Classic => {
            if state.move_count < 2 || !state.everyone_has_moved() {
                return None;
            }
            let mut present = state
                .players
                .iter()
                .copied()
                .filter(|&p| state.board.count_cells(p) > 0);
            match (present.next(), present.next()) {
                (Some(only), None) => Some(Outcome::Winner(only)),
                _ => None,
            }
        }
    }
}

/// Check if `player` may be handed the turn.
///
/// Players whose HQ has fallen are out. Once everyone has had a turn,
/// players without a single cell are skipped as well.
#[must_use]
pub fn is_eligible(state: &GameState, player: PlayerId) -> bool {
    if state.mode == Mode::Base && !state.is_alive(player) {
        return false;
    }
    !(state.everyone_has_moved() && state.board.count_cells(player) == 0)
}

/// The player who moves after the current one.
///
/// Walks the seating order at most once round the table; if nobody is
/// eligible the current player keeps the turn.
#[must_use]
pub fn next_player(state: &GameState) -> PlayerId {
    let seats = state.players.len();
    let Some(current) = state.seat_of(state.active_player) else {
        return state.active_player;
    };

    (1..=seats)
        .map(|offset| state.players[(current + offset) % seats])
        .find(|&candidate| is_eligible(state, candidate))
        .unwrap_or(state.active_player)
}

/// Book-keeping after `mover` completed a move: count it, check for a
/// result, and hand the turn on.
pub fn finish_turn(state: &mut GameState, mover: PlayerId) {
    state.move_count += 1;
    if let Some(seat) = state.seat_of(mover) {
        state.turns_taken[seat] += 1;
    }

    match detect_outcome(state) {
        Some(outcome) => {
            state.is_over = true;
            state.winner = match outcome {
                Outcome::Winner(player) => Some(player),
                Outcome::Draw => None,
            };
        }
        None => state.active_player = next_player(state),
    }
}
