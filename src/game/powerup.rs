//! Power-ups: Diamond area fill and Heart heal/damage.
//!
//! Power-ups only appear in base mode. Moving onto one replaces the ordinary
//! placement with the power-up's effect; no cascade is set off by it.

// Spawn sampling converts board dimensions to random ranges
#![allow(clippy::cast_possible_truncation)]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{
    cascade::place_unit, CascadeLog, Cell, Coord, GameState, HqEvent, Mode, PlayerId,
    MAX_HQ_HEALTH,
};

/// Maximum number of power-ups on the board at once.
pub const MAX_LIVE_POWER_UPS: usize = 4;

/// Chance that a spawn is attempted after a move.
pub const SPAWN_CHANCE: f64 = 0.25;

/// Random cells tried per spawn before giving up.
pub const SPAWN_ATTEMPTS: u32 = 50;

/// Kind of power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Adds a unit to every friendly or empty cell in an area.
    Diamond,
    /// Heals the mover's HQ (or, in duels at full health, hurts the enemy's).
    Heart,
}

/// A power-up waiting on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Cell holding the power-up.
    pub position: Coord,
    /// What it does.
    pub kind: PowerUpKind,
}

/// Consume the power-up at index `slot` of `state.power_ups` for `player`.
///
/// The power-up is removed whatever its effect turns out to be.
pub(crate) fn consume(state: &mut GameState, slot: usize, player: PlayerId) -> CascadeLog {
    let power_up = state.power_ups.remove(slot);
    let mut log = CascadeLog {
        power_up: Some(power_up.kind),
        ..CascadeLog::default()
    };

    match power_up.kind {
        PowerUpKind::Diamond => apply_diamond(state, power_up.position, player),
        PowerUpKind::Heart => {
            place_unit(state, power_up.position, player);
            log.hq_events = apply_heart(state, player);
        }
    }

    log
}

/// Diamond: one unit on every empty or friendly non-HQ cell of the placed
/// row (two players) or of the 3x3 block around the placed cell (three or
/// four players). Enemy cells are left alone.
pub fn apply_diamond(state: &mut GameState, at: Coord, player: PlayerId) {
    let rows = state.board.rows();
    let cols = state.board.cols();

    let area: Vec<Coord> = if state.players.len() == 2 {
        (0..cols).map(|col| Coord::new(at.row, col)).collect()
    } else {
        let row_hi = (at.row + 1).min(rows - 1);
        let col_hi = (at.col + 1).min(cols - 1);
        (at.row.saturating_sub(1)..=row_hi)
            .flat_map(|row| (at.col.saturating_sub(1)..=col_hi).map(move |col| Coord::new(row, col)))
            .collect()
    };

    for coord in area {
        if state.is_hq_cell(coord) {
            continue;
        }
        if let Some(cell) = state.board.get_mut(coord) {
            if cell.owner.is_none() || cell.owner == Some(player) {
                cell.add_unit(player);
            }
        }
    }
}

/// Heart: in a duel, heal the mover's HQ if it is hurt, otherwise damage the
/// opponent's HQ. With three or four players, always heal (never harm).
pub fn apply_heart(state: &mut GameState, player: PlayerId) -> Vec<HqEvent> {
    let duel = state.players.len() == 2;
    let Some(own) = state.hqs.iter_mut().find(|hq| hq.owner == player) else {
        return Vec::new();
    };

    if !duel || own.health < MAX_HQ_HEALTH {
        own.heal();
        return vec![HqEvent::Healed {
            owner: player,
            health: own.health,
        }];
    }

    state
        .hqs
        .iter_mut()
        .filter(|hq| hq.owner != player)
        .map(|hq| {
            hq.damage();
            HqEvent::Damaged {
                owner: hq.owner,
                by: player,
                health: hq.health,
            }
        })
        .collect()
}

/// Check if a power-up may appear on `coord`: empty, not an HQ, no occupied
/// cell around it (diagonals included), and in a duel, outside the middle
/// third of the rows.
#[must_use]
pub fn is_valid_spawn_cell(state: &GameState, coord: Coord) -> bool {
    let board = &state.board;
    let Some(cell) = board.get(coord) else {
        return false;
    };
    if !cell.is_empty() || state.is_hq_cell(coord) || state.power_up_at(coord).is_some() {
        return false;
    }

    if state.players.len() == 2 {
        let rows = board.rows();
        if (rows / 3..2 * rows / 3).contains(&coord.row) {
            return false;
        }
    }

    let row_hi = (coord.row + 1).min(board.rows() - 1);
    let col_hi = (coord.col + 1).min(board.cols() - 1);
    (coord.row.saturating_sub(1)..=row_hi).all(|row| {
        (coord.col.saturating_sub(1)..=col_hi)
            .all(|col| board.get(Coord::new(row, col)).is_none_or(Cell::is_empty))
    })
}

/// Roll for a new power-up after a completed move.
///
/// Base mode only, from the first move on, with probability
/// [`SPAWN_CHANCE`] and only while fewer than [`MAX_LIVE_POWER_UPS`] are
/// live. Gives up silently after [`SPAWN_ATTEMPTS`] unsuitable cells.
///
/// Randomness is derived from the game seed and move count, so replaying
/// (or undoing and redoing) a move spawns the same power-up.
pub fn try_spawn(state: &mut GameState) -> Option<PowerUp> {
    if state.mode != Mode::Base
        || state.move_count == 0
        || state.power_ups.len() >= MAX_LIVE_POWER_UPS
    {
        return None;
    }

    let mut rng = spawn_rng(state.seed, state.move_count);
    if !rng.gen_bool(SPAWN_CHANCE) {
        return None;
    }

    let rows = u32::from(state.board.rows());
    let cols = u32::from(state.board.cols());
    for _ in 0..SPAWN_ATTEMPTS {
        let coord = Coord::new(rng.gen_range(0..rows) as u16, rng.gen_range(0..cols) as u16);
        if !is_valid_spawn_cell(state, coord) {
            continue;
        }
        let kind = if rng.gen_bool(0.5) {
            PowerUpKind::Diamond
        } else {
            PowerUpKind::Heart
        };
        let power_up = PowerUp {
            position: coord,
            kind,
        };
        state.power_ups.push(power_up);
        return Some(power_up);
    }

    None
}

fn spawn_rng(seed: u64, move_count: u32) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ u64::from(move_count).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
