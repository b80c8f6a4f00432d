// Allow unwrap and float comparisons in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Chainfall: a deterministic chain-reaction territory game engine.
//!
//! Players take turns dropping units onto a grid. A cell that reaches its
//! critical mass (its number of orthogonal neighbours) explodes, pushing one
//! unit into each neighbour and converting it to the exploding player's
//! colour; the chain continues until the board settles.
//!
//! Two variants are supported: *classic* (last player on the board wins)
//! and *base* (each player defends a headquarters; power-ups appear).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      CLI / Match Runner             │
//! ├─────────────────────────────────────┤
//! │   AI (heuristics, alpha-beta)       │
//! ├─────────────────────────────────────┤
//! │   Game rules (cascade, arbiter)     │
//! └─────────────────────────────────────┘
//! ```

pub mod ai;
pub mod error;
pub mod game;
pub mod tournament;

pub use ai::{choose_move, AiConfig, AiContext, Difficulty, Personality, Strategy};
pub use error::{IllegalReason, MoveError, SetupError};

// Re-export key game types at crate root for convenience
pub use game::{
    critical_mass, is_legal_move, legal_moves, new_game, undo, Board, CascadeLog, Cell, Coord,
    Game, GameSetup, GameState, Mode, MoveOutcome, PlayerId,
};

/// Apply `player`'s move at `coord` to `state`.
///
/// Free-function form of [`GameState::apply_move`]: the input state is left
/// untouched and the successor comes back with a log of the cascade.
///
/// # Errors
///
/// Returns an error if the game is over, it is not `player`'s turn, or the
/// placement is illegal.
pub fn apply_move(state: &GameState, coord: Coord, player: PlayerId) -> Result<MoveOutcome, MoveError> {
    state.apply_move(coord, player)
}
