//! Move legality.
//!
//! Nothing in here mutates state; the AI and the session both ask before
//! every placement.

use crate::error::IllegalReason;
use crate::game::{is_adjacent_including_diagonal, Coord, GameState, Mode, PlayerId};

/// Decide whether `player` may place a unit at `coord`.
///
/// # Errors
///
/// Returns the reason the placement is refused.
pub fn check_move(state: &GameState, coord: Coord, player: PlayerId) -> Result<(), IllegalReason> {
    let Some(cell) = state.board.get(coord) else {
        return Err(IllegalReason::OutOfBounds);
    };
    if !state.is_seated(player) {
        return Err(IllegalReason::UnknownPlayer);
    }
    if state.is_hq_cell(coord) {
        return Err(IllegalReason::HqCell);
    }
    if let Some(owner) = cell.owner {
        if owner != player {
            return Err(IllegalReason::OwnedByOpponent(owner));
        }
    }

    match state.mode {
        Mode::Classic => Ok(()),
        Mode::Base => check_base_reach(state, coord, player),
    }
}

/// Check whether `player` may place a unit at `coord`.
#[must_use]
pub fn is_legal_move(state: &GameState, coord: Coord, player: PlayerId) -> bool {
    check_move(state, coord, player).is_ok()
}

/// All cells where `player` may place, in row-major order.
#[must_use]
pub fn legal_moves(state: &GameState, player: PlayerId) -> Vec<Coord> {
    state
        .board
        .iter()
        .map(|(coord, _)| coord)
        .filter(|&coord| is_legal_move(state, coord, player))
        .collect()
}

/// Check if a player has opened: owns at least one non-HQ cell with units.
#[must_use]
pub fn has_opened(state: &GameState, player: PlayerId) -> bool {
    state
        .board
        .cells_owned_by(player)
        .any(|(coord, cell)| cell.units > 0 && !state.is_hq_cell(coord))
}

/// Base mode reach rule: the opening move goes on the HQ line, later moves
/// must touch the HQ or the player's territory (diagonals count) or sit on
/// the HQ line.
fn check_base_reach(state: &GameState, coord: Coord, player: PlayerId) -> Result<(), IllegalReason> {
    let Some(hq) = state.hq_of(player) else {
        unreachable!("base mode game without an HQ for seated player {player}");
    };

    if hq.on_line(coord) {
        return Ok(());
    }
    if !has_opened(state, player) {
        return Err(IllegalReason::OffHqLine);
    }
    if is_adjacent_including_diagonal(coord, hq.position) || touches_territory(state, coord, player) {
        Ok(())
    } else {
        Err(IllegalReason::Disconnected)
    }
}

/// Check the 3x3 block around `coord`, the cell itself included, for a
/// cell owned by `player`.
fn touches_territory(state: &GameState, coord: Coord, player: PlayerId) -> bool {
    let rows = state.board.rows();
    let cols = state.board.cols();
    let row_lo = coord.row.saturating_sub(1);
    let col_lo = coord.col.saturating_sub(1);
    let row_hi = (coord.row + 1).min(rows - 1);
    let col_hi = (coord.col + 1).min(cols - 1);

    (row_lo..=row_hi).any(|row| {
        (col_lo..=col_hi).any(|col| {
            state
                .board
                .get(Coord::new(row, col))
                .is_some_and(|cell| cell.owner == Some(player))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_game, Cell};

    #[test]
    fn test_classic_ownership_rule() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(1, 1), Cell::owned(2, 1));
        state.board.set(Coord::new(2, 2), Cell::owned(1, 1));

        assert!(is_legal_move(&state, Coord::new(0, 0), 1));
        assert!(is_legal_move(&state, Coord::new(2, 2), 1));
        assert_eq!(
            check_move(&state, Coord::new(1, 1), 1),
            Err(IllegalReason::OwnedByOpponent(2))
        );
        assert_eq!(
            check_move(&state, Coord::new(0, 9), 1),
            Err(IllegalReason::OutOfBounds)
        );
        assert_eq!(
            check_move(&state, Coord::new(0, 0), 3),
            Err(IllegalReason::UnknownPlayer)
        );
    }

    #[test]
    fn test_base_hq_cells_illegal() {
        let state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        let own = state.hq_of(1).unwrap().position;
        let enemy = state.hq_of(2).unwrap().position;
        assert_eq!(check_move(&state, own, 1), Err(IllegalReason::HqCell));
        assert_eq!(check_move(&state, enemy, 1), Err(IllegalReason::HqCell));
    }

    #[test]
    fn test_base_opening_on_hq_line() {
        let state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        // Player 1's HQ sits at (0, 4): the opening must stay in row 0.
        assert!(is_legal_move(&state, Coord::new(0, 0), 1));
        assert!(is_legal_move(&state, Coord::new(0, 8), 1));
        assert_eq!(
            check_move(&state, Coord::new(1, 4), 1),
            Err(IllegalReason::OffHqLine)
        );
        assert_eq!(
            check_move(&state, Coord::new(4, 4), 1),
            Err(IllegalReason::OffHqLine)
        );
    }

    #[test]
    fn test_base_reach_after_opening() {
        let mut state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(0, 0), Cell::owned(1, 1));
        assert!(has_opened(&state, 1));

        // Next to the HQ (diagonal included).
        assert!(is_legal_move(&state, Coord::new(1, 3), 1));
        assert!(is_legal_move(&state, Coord::new(1, 5), 1));
        // Next to owned territory.
        assert!(is_legal_move(&state, Coord::new(1, 1), 1));
        // HQ line is always open.
        assert!(is_legal_move(&state, Coord::new(0, 7), 1));
        // Far away.
        assert_eq!(
            check_move(&state, Coord::new(5, 5), 1),
            Err(IllegalReason::Disconnected)
        );
    }

    #[test]
    fn test_base_own_isolated_cell_stays_playable() {
        let mut state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(0, 0), Cell::owned(1, 1));
        // Enemy cells all around (5, 5), as after a captured neighbourhood.
        state.board.set(Coord::new(5, 5), Cell::owned(1, 2));
        for (row, col) in [(4, 4), (4, 5), (4, 6), (5, 4), (5, 6), (6, 4), (6, 5), (6, 6)] {
            state.board.set(Coord::new(row, col), Cell::owned(2, 1));
        }

        assert!(is_legal_move(&state, Coord::new(5, 5), 1));
        assert!(legal_moves(&state, 1).contains(&Coord::new(5, 5)));
        // Empty cells still need a neighbour.
        assert_eq!(
            check_move(&state, Coord::new(7, 7), 1),
            Err(IllegalReason::Disconnected)
        );
    }

    #[test]
    fn test_hq_cell_does_not_count_as_opening() {
        let state = new_game(Mode::Base, 3, &[1, 2, 3]).unwrap();
        assert!(!has_opened(&state, 3));
        // Player 3 sits on the left edge: the opening goes in column 0.
        assert!(is_legal_move(&state, Coord::new(0, 0), 3));
        assert!(!is_legal_move(&state, Coord::new(4, 1), 3));
    }

    #[test]
    fn test_legality_is_pure() {
        let state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        let before = state.clone();
        let first = legal_moves(&state, 1);
        let second = legal_moves(&state, 1);
        assert_eq!(first, second);
        assert_eq!(state, before);
        assert_eq!(first.len(), 8);
    }
}
