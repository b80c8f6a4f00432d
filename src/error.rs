//! Error types for game setup and move application.

use thiserror::Error;

use crate::game::{Coord, PlayerId};

/// Why a placement was refused by the move validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalReason {
    /// Coordinate outside the board.
    #[error("outside the board")]
    OutOfBounds,
    /// Cell holds a headquarters.
    #[error("cell holds a headquarters")]
    HqCell,
    /// Cell belongs to another player.
    #[error("cell is owned by player {0}")]
    OwnedByOpponent(PlayerId),
    /// A player's opening move must be on their HQ line.
    #[error("opening move must be on the HQ line")]
    OffHqLine,
    /// Target touches neither the player's HQ nor any of their cells.
    #[error("not connected to the player's territory")]
    Disconnected,
    /// The player is not part of this game.
    #[error("player is not seated in this game")]
    UnknownPlayer,
}

/// Error returned when a move cannot be applied. The state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The placement is not legal.
    #[error("illegal move by player {player} at {coord}: {reason}")]
    Illegal {
        /// Target cell.
        coord: Coord,
        /// Acting player.
        player: PlayerId,
        /// Validator verdict.
        reason: IllegalReason,
    },
    /// Someone else is to move.
    #[error("not player {got}'s turn (player {expected} to move)")]
    NotYourTurn {
        /// Player whose turn it is.
        expected: PlayerId,
        /// Player who tried to move.
        got: PlayerId,
    },
    /// The game has already finished.
    #[error("game is over")]
    GameOver,
}

/// Error returned when a game cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Player count outside 2..=4.
    #[error("player count must be between 2 and 4, got {0}")]
    PlayerCount(usize),
    /// The player list does not match the requested count.
    #[error("expected {expected} players, got a list of {got}")]
    PlayerListMismatch {
        /// Requested count.
        expected: usize,
        /// Length of the supplied list.
        got: usize,
    },
    /// Player ids must be distinct and non-zero.
    #[error("invalid player list: {0}")]
    InvalidPlayers(String),
    /// Board dimensions not supported for the mode.
    #[error("board {rows}x{cols} is too small (minimum {min}x{min})")]
    BoardTooSmall {
        /// Requested rows.
        rows: u16,
        /// Requested columns.
        cols: u16,
        /// Minimum side length for the mode.
        min: u16,
    },
    /// Board dimensions above the supported maximum.
    #[error("board {rows}x{cols} is too large (maximum {max}x{max})")]
    BoardTooLarge {
        /// Requested rows.
        rows: u16,
        /// Requested columns.
        cols: u16,
        /// Maximum side length.
        max: u16,
    },
}
