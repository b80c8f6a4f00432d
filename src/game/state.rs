//! Game state, setup and the undo-capable game session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MoveError, SetupError};
use crate::game::{
    arbiter, cascade, check_move, invariants, powerup, Board, CascadeLog, Cell, Coord, Hq,
    HqSide, PlayerId, PowerUp, MAX_PLAYERS,
};

/// Smallest board side for classic games.
pub const MIN_CLASSIC_SIDE: u16 = 2;

/// Smallest board side for base games (room for an HQ line and a centre).
pub const MIN_BASE_SIDE: u16 = 3;

/// Largest supported board side.
pub const MAX_SIDE: u16 = 64;

/// Default board side used by [`new_game`].
pub const DEFAULT_SIDE: u16 = 9;

/// Game variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain chain reaction: no headquarters, no power-ups.
    #[default]
    Classic,
    /// Headquarters with health, placement restricted around them, power-ups.
    Base,
}

/// Parameters for creating a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSetup {
    /// Game variant.
    pub mode: Mode,
    /// Board rows.
    pub rows: u16,
    /// Board columns.
    pub cols: u16,
    /// Seated players in rotation order.
    pub players: Vec<PlayerId>,
    /// Seed for the power-up spawn stream.
    pub seed: u64,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            mode: Mode::Classic,
            rows: DEFAULT_SIDE,
            cols: DEFAULT_SIDE,
            players: vec![1, 2],
            seed: 0,
        }
    }
}

impl GameSetup {
    /// Check the setup for consistency.
    ///
    /// # Errors
    ///
    /// Returns an error for bad player lists or unsupported board sizes.
    pub fn validate(&self) -> Result<(), SetupError> {
        let count = self.players.len();
        if !(2..=MAX_PLAYERS).contains(&count) {
            return Err(SetupError::PlayerCount(count));
        }

        let mut seen = [false; MAX_PLAYERS + 1];
        for &id in &self.players {
            let slot = usize::from(id);
            if id == 0 || slot > MAX_PLAYERS {
                return Err(SetupError::InvalidPlayers(format!(
                    "player id {id} outside 1..={MAX_PLAYERS}"
                )));
            }
            if seen[slot] {
                return Err(SetupError::InvalidPlayers(format!(
                    "player id {id} listed twice"
                )));
            }
            seen[slot] = true;
        }

        let min = match self.mode {
            Mode::Classic => MIN_CLASSIC_SIDE,
            Mode::Base => MIN_BASE_SIDE,
        };
        if self.rows < min || self.cols < min {
            return Err(SetupError::BoardTooSmall {
                rows: self.rows,
                cols: self.cols,
                min,
            });
        }
        if self.rows > MAX_SIDE || self.cols > MAX_SIDE {
            return Err(SetupError::BoardTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_SIDE,
            });
        }

        Ok(())
    }
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// State after the move, cascades, power-ups and turn rotation.
    pub state: GameState,
    /// What happened while resolving the move.
    pub log: CascadeLog,
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Game variant.
    pub mode: Mode,
    /// The board.
    pub board: Board,
    /// Seated players in rotation order.
    pub players: Vec<PlayerId>,
    /// Headquarters in seating order (empty in classic mode).
    pub hqs: Vec<Hq>,
    /// Live power-ups in spawn order.
    pub power_ups: Vec<PowerUp>,
    /// Player to move.
    pub active_player: PlayerId,
    /// Whether the game has finished.
    pub is_over: bool,
    /// Winner once the game is over (None = draw or still running).
    pub winner: Option<PlayerId>,
    /// Number of completed moves, passes included.
    pub move_count: u32,
    /// Turns taken per seat, parallel to `players`.
    pub turns_taken: Vec<u32>,
    /// Seed for the power-up spawn stream.
    pub seed: u64,
}

impl GameState {
    /// Create a fresh game.
    ///
    /// Classic games start empty. Base games get one HQ per player on the
    /// edges (top, bottom, left, right in seating order), each HQ cell holding
    /// a single unit of its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup is invalid.
    pub fn new(setup: &GameSetup) -> Result<Self, SetupError> {
        setup.validate()?;

        let mut board = Board::new(setup.rows, setup.cols).ok_or(SetupError::BoardTooSmall {
            rows: setup.rows,
            cols: setup.cols,
            min: MIN_CLASSIC_SIDE,
        })?;

        let hqs: Vec<Hq> = match setup.mode {
            Mode::Classic => Vec::new(),
            Mode::Base => setup
                .players
                .iter()
                .zip(HqSide::SEATING)
                .map(|(&owner, side)| Hq::new(owner, side, setup.rows, setup.cols))
                .collect(),
        };
        for hq in &hqs {
            board.set(hq.position, Cell::owned(hq.owner, 1));
        }

        Ok(Self {
            mode: setup.mode,
            board,
            active_player: setup.players[0],
            turns_taken: vec![0; setup.players.len()],
            players: setup.players.clone(),
            hqs,
            power_ups: Vec::new(),
            is_over: false,
            winner: None,
            move_count: 0,
            seed: setup.seed,
        })
    }

    /// Seat index of a player.
    #[must_use]
    pub fn seat_of(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|&p| p == player)
    }

    /// Check if a player is part of this game.
    #[must_use]
    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// A player's HQ, if the game has them.
    #[must_use]
    pub fn hq_of(&self, player: PlayerId) -> Option<&Hq> {
        self.hqs.iter().find(|hq| hq.owner == player)
    }

    /// The HQ standing on a cell, if any.
    #[must_use]
    pub fn hq_at(&self, coord: Coord) -> Option<&Hq> {
        self.hqs.iter().find(|hq| hq.position == coord)
    }

    /// Check if a cell holds any player's HQ.
    #[must_use]
    pub fn is_hq_cell(&self, coord: Coord) -> bool {
        self.hq_at(coord).is_some()
    }

    /// The power-up sitting on a cell, if any.
    #[must_use]
    pub fn power_up_at(&self, coord: Coord) -> Option<&PowerUp> {
        self.power_ups.iter().find(|p| p.position == coord)
    }

    /// Check if a player still takes part: HQ standing in base mode, always
    /// true in classic mode.
    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        match self.mode {
            Mode::Classic => self.is_seated(player),
            Mode::Base => self.hq_of(player).is_some_and(Hq::is_alive),
        }
    }

    /// Check if every seated player has taken at least one turn.
    #[must_use]
    pub fn everyone_has_moved(&self) -> bool {
        self.turns_taken.iter().all(|&t| t > 0)
    }

    /// Seated players other than `player`.
    pub fn opponents(&self, player: PlayerId) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().copied().filter(move |&p| p != player)
    }

    /// Apply a move by `player` at `coord`, returning the resulting state.
    ///
    /// The move is validated first; on rejection nothing changes. After the
    /// cascade settles the turn passes on and, in base mode, a power-up may
    /// spawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is over, it is not `player`'s turn, or
    /// the placement is illegal.
    pub fn apply_move(&self, coord: Coord, player: PlayerId) -> Result<MoveOutcome, MoveError> {
        if self.is_over {
            return Err(MoveError::GameOver);
        }
        if player != self.active_player {
            return Err(MoveError::NotYourTurn {
                expected: self.active_player,
                got: player,
            });
        }
        check_move(self, coord, player).map_err(|reason| MoveError::Illegal {
            coord,
            player,
            reason,
        })?;

        let mut next = self.clone();
        let log = next.resolve_move(coord, player);
        arbiter::finish_turn(&mut next, player);
        if !next.is_over {
            if let Some(spawned) = powerup::try_spawn(&mut next) {
                debug!(kind = ?spawned.kind, at = %spawned.position, "power-up spawned");
            }
        }

        debug!(
            player,
            at = %coord,
            explosions = log.explosions.len(),
            hq_events = log.hq_events.len(),
            next = next.active_player,
            over = next.is_over,
            "move applied"
        );

        Ok(MoveOutcome { state: next, log })
    }

    /// Give up the current turn without placing (for a player with no legal
    /// move). Counts as a completed move.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is over or it is not `player`'s turn.
    pub fn pass_turn(&self, player: PlayerId) -> Result<GameState, MoveError> {
        if self.is_over {
            return Err(MoveError::GameOver);
        }
        if player != self.active_player {
            return Err(MoveError::NotYourTurn {
                expected: self.active_player,
                got: player,
            });
        }

        let mut next = self.clone();
        arbiter::finish_turn(&mut next, player);
        debug!(player, next = next.active_player, "turn passed");
        Ok(next)
    }

    /// Resolve a placement in place: power-up effect or ordinary placement
    /// followed by the cascade. No validation, no turn bookkeeping.
    pub(crate) fn resolve_move(&mut self, coord: Coord, player: PlayerId) -> CascadeLog {
        match self.power_ups.iter().position(|p| p.position == coord) {
            Some(slot) => powerup::consume(self, slot, player),
            None => cascade::resolve_placement(self, coord, player),
        }
    }
}

/// Create a new game on the default 9x9 board.
///
/// # Errors
///
/// Returns an error if `player_count` is outside 2..=4 or does not match
/// `players`.
pub fn new_game(mode: Mode, player_count: usize, players: &[PlayerId]) -> Result<GameState, SetupError> {
    if !(2..=MAX_PLAYERS).contains(&player_count) {
        return Err(SetupError::PlayerCount(player_count));
    }
    if players.len() != player_count {
        return Err(SetupError::PlayerListMismatch {
            expected: player_count,
            got: players.len(),
        });
    }

    GameState::new(&GameSetup {
        mode,
        players: players.to_vec(),
        ..GameSetup::default()
    })
}

/// An immutable copy of a prior state, kept for undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    state: GameState,
}

impl HistorySnapshot {
    /// The captured state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }
}

/// A game session: the live state plus its undo history.
#[derive(Debug, Clone)]
pub struct Game {
    /// Setup used to create (and restart) the game.
    setup: GameSetup,
    /// Current state.
    state: GameState,
    /// Snapshots taken before each committed move, oldest first.
    history: Vec<HistorySnapshot>,
}

impl Game {
    /// Start a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup is invalid.
    pub fn new(setup: GameSetup) -> Result<Self, SetupError> {
        let state = GameState::new(&setup)?;
        Ok(Self {
            setup,
            state,
            history: Vec::new(),
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of moves that can be undone.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Snapshots in the order they were taken.
    #[must_use]
    pub fn history(&self) -> &[HistorySnapshot] {
        &self.history
    }

    /// Apply a move and record a snapshot of the prior state.
    ///
    /// # Errors
    ///
    /// Returns the validator's error; the session is unchanged in that case.
    pub fn apply_move(&mut self, coord: Coord, player: PlayerId) -> Result<CascadeLog, MoveError> {
        let MoveOutcome { state, log } = self.state.apply_move(coord, player)?;
        self.commit(state);
        Ok(log)
    }

    /// Pass the turn and record a snapshot of the prior state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is over or it is not `player`'s turn.
    pub fn pass_turn(&mut self, player: PlayerId) -> Result<(), MoveError> {
        let state = self.state.pass_turn(player)?;
        self.commit(state);
        Ok(())
    }

    /// Restore the state before the most recent move.
    ///
    /// Returns `false` (and does nothing) when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.state = snapshot.state;
                true
            }
            None => false,
        }
    }

    /// Throw the current game away and start over with the same setup.
    pub fn restart(&mut self) {
        // The setup was validated when the session was created.
        if let Ok(state) = GameState::new(&self.setup) {
            self.state = state;
            self.history.clear();
        }
    }

    fn commit(&mut self, next: GameState) {
        invariants::assert_invariants(&next);
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(HistorySnapshot { state: previous });
    }
}

/// Undo the most recent move of a session. No-op on an empty history.
pub fn undo(game: &mut Game) -> bool {
    game.undo()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IllegalReason;
    use crate::game::MAX_HQ_HEALTH;

    fn base_setup() -> GameSetup {
        GameSetup {
            mode: Mode::Base,
            ..GameSetup::default()
        }
    }

    #[test]
    fn test_classic_creation() {
        let state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        assert_eq!(state.board.rows(), DEFAULT_SIDE);
        assert_eq!(state.board.total_units(), 0);
        assert!(state.hqs.is_empty());
        assert!(state.power_ups.is_empty());
        assert_eq!(state.active_player, 1);
        assert!(!state.is_over);
    }

    #[test]
    fn test_base_creation_places_hqs() {
        let state = new_game(Mode::Base, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(state.hqs.len(), 4);
        for hq in &state.hqs {
            assert_eq!(hq.health, MAX_HQ_HEALTH);
            let cell = state.board.get(hq.position).unwrap();
            assert_eq!(*cell, Cell::owned(hq.owner, 1));
        }
        assert_eq!(state.board.total_units(), 4);
    }

    #[test]
    fn test_setup_validation() {
        assert_eq!(
            new_game(Mode::Classic, 5, &[1, 2, 3, 4, 5]),
            Err(SetupError::PlayerCount(5))
        );
        assert!(matches!(
            new_game(Mode::Classic, 3, &[1, 2]),
            Err(SetupError::PlayerListMismatch { expected: 3, got: 2 })
        ));
        assert!(matches!(
            new_game(Mode::Classic, 2, &[1, 1]),
            Err(SetupError::InvalidPlayers(_))
        ));
        assert!(matches!(
            new_game(Mode::Classic, 2, &[0, 1]),
            Err(SetupError::InvalidPlayers(_))
        ));

        let setup = GameSetup {
            mode: Mode::Base,
            rows: 2,
            cols: 9,
            ..GameSetup::default()
        };
        assert!(matches!(
            GameState::new(&setup),
            Err(SetupError::BoardTooSmall { .. })
        ));
    }

    #[test]
    fn test_apply_move_rejections_leave_state() {
        let state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        let before = state.clone();

        assert_eq!(
            state.apply_move(Coord::new(0, 0), 2),
            Err(MoveError::NotYourTurn { expected: 1, got: 2 })
        );
        assert!(matches!(
            state.apply_move(Coord::new(9, 0), 1),
            Err(MoveError::Illegal {
                reason: IllegalReason::OutOfBounds,
                ..
            })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_move_rotates() {
        let state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        let outcome = state.apply_move(Coord::new(4, 4), 1).unwrap();
        assert_eq!(outcome.state.active_player, 2);
        assert_eq!(outcome.state.move_count, 1);
        assert_eq!(outcome.state.board.get(Coord::new(4, 4)), Some(&Cell::owned(1, 1)));
        assert!(outcome.log.explosions.is_empty());
    }

    #[test]
    fn test_game_undo_roundtrip() {
        let mut game = Game::new(base_setup()).unwrap();
        let initial = game.state().clone();

        game.apply_move(Coord::new(0, 0), 1).unwrap();
        assert_eq!(game.history_len(), 1);
        assert_ne!(game.state(), &initial);

        assert!(game.undo());
        assert_eq!(game.state(), &initial);
        assert!(!game.undo());
        assert_eq!(game.state(), &initial);
    }

    #[test]
    fn test_game_rejected_move_keeps_history() {
        let mut game = Game::new(GameSetup::default()).unwrap();
        assert!(game.apply_move(Coord::new(0, 0), 2).is_err());
        assert_eq!(game.history_len(), 0);
    }

    #[test]
    fn test_pass_turn() {
        let mut game = Game::new(GameSetup::default()).unwrap();
        game.pass_turn(1).unwrap();
        assert_eq!(game.state().active_player, 2);
        assert_eq!(game.state().move_count, 1);
        assert!(undo(&mut game));
        assert_eq!(game.state().active_player, 1);
    }

    #[test]
    fn test_restart() {
        let mut game = Game::new(GameSetup::default()).unwrap();
        game.apply_move(Coord::new(1, 1), 1).unwrap();
        game.restart();
        assert_eq!(game.history_len(), 0);
        assert_eq!(game.state().move_count, 0);
        assert_eq!(game.state().board.total_units(), 0);
    }
}
