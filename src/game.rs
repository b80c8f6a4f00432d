//! Game layer for Chainfall.
//!
//! Implements the rules of the chain-reaction game:
//! - Board of cells holding units, critical mass from neighbour count
//! - Cascading explosions that capture neighbouring cells
//! - Base mode headquarters with health and placement reach
//! - Power-ups (Diamond area fill, Heart heal or strike)
//! - Turn rotation, elimination and win detection
//! - Undo-capable game sessions

mod arbiter;
mod board;
mod cascade;
mod geometry;
mod invariants;
mod player;
mod powerup;
mod state;
mod validator;

pub use arbiter::{detect_outcome, finish_turn, is_eligible, next_player, Outcome};
pub use board::{Board, Cell, Coord};
pub use cascade::{
    place_unit, resolve_placement, Cascade, CascadeLog, Explosion, HqEvent,
    EXPLOSION_BUDGET_PER_CELL,
};
pub use geometry::{
    chebyshev_distance, critical_mass, is_adjacent_including_diagonal, is_corner, is_edge,
    manhattan_distance, neighbors,
};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use player::{Hq, HqSide, PlayerId, MAX_HQ_HEALTH, MAX_PLAYERS};
pub use powerup::{
    apply_diamond, apply_heart, is_valid_spawn_cell, try_spawn, PowerUp, PowerUpKind,
    MAX_LIVE_POWER_UPS, SPAWN_ATTEMPTS, SPAWN_CHANCE,
};
pub use state::{
    new_game, undo, Game, GameSetup, GameState, HistorySnapshot, Mode, MoveOutcome, DEFAULT_SIDE,
    MAX_SIDE, MIN_BASE_SIDE, MIN_CLASSIC_SIDE,
};
pub use validator::{check_move, has_opened, is_legal_move, legal_moves};
