//! State invariants - sanity checks that detect engine bugs.
//!
//! A legal sequence of moves never trips these. The session runs them after
//! every committed move in debug builds; tests and fuzzers call
//! [`check_invariants`] directly.

use crate::game::{GameState, Mode, MAX_HQ_HEALTH, MAX_LIVE_POWER_UPS};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all state invariants.
///
/// Returns every violation found, or an empty list if the state is sound.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // Units and ownership go together.
    for (coord, cell) in state.board.iter() {
        match (cell.units, cell.owner) {
            (0, Some(owner)) => violations.push(violation(format!(
                "Cell at {coord} is empty but owned by player {owner}"
            ))),
            (units, None) if units > 0 => violations.push(violation(format!(
                "Cell at {coord} holds {units} units without an owner"
            ))),
            (_, Some(owner)) if !state.is_seated(owner) => violations.push(violation(format!(
                "Cell at {coord} owned by unseated player {owner}"
            ))),
            _ => {}
        }
    }

    // Headquarters.
    match state.mode {
        Mode::Classic if !state.hqs.is_empty() => {
            violations.push(violation(format!(
                "Classic game carries {} HQs",
                state.hqs.len()
            )));
        }
        Mode::Base if state.hqs.len() != state.players.len() => {
            violations.push(violation(format!(
                "{} HQs for {} players",
                state.hqs.len(),
                state.players.len()
            )));
        }
        _ => {}
    }
    for hq in &state.hqs {
        if hq.health > MAX_HQ_HEALTH {
            violations.push(violation(format!(
                "HQ of player {} has health {} > max {MAX_HQ_HEALTH}",
                hq.owner, hq.health
            )));
        }
        if !state.board.in_bounds(hq.position) {
            violations.push(violation(format!(
                "HQ of player {} sits off the board at {}",
                hq.owner, hq.position
            )));
        }
    }

    // Power-ups.
    if state.power_ups.len() > MAX_LIVE_POWER_UPS {
        violations.push(violation(format!(
            "{} live power-ups > max {MAX_LIVE_POWER_UPS}",
            state.power_ups.len()
        )));
    }
    for (i, power_up) in state.power_ups.iter().enumerate() {
        let at = power_up.position;
        if state.is_hq_cell(at) {
            violations.push(violation(format!("Power-up on HQ cell {at}")));
        }
        if !state.board.in_bounds(at) {
            violations.push(violation(format!("Power-up off the board at {at}")));
        }
        if state.power_ups[..i].iter().any(|p| p.position == at) {
            violations.push(violation(format!("Two power-ups share cell {at}")));
        }
    }

    // Turn bookkeeping.
    if !state.is_seated(state.active_player) {
        violations.push(violation(format!(
            "Active player {} is not seated",
            state.active_player
        )));
    }
    if state.turns_taken.len() != state.players.len() {
        violations.push(violation(format!(
            "Turn counters for {} seats, {} players",
            state.turns_taken.len(),
            state.players.len()
        )));
    }
    if state.winner.is_some() && !state.is_over {
        violations.push(violation("Winner recorded while the game runs".to_string()));
    }

    violations
}

/// Assert all state invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with every violation listed if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{new_game, Cell, Coord, PowerUp, PowerUpKind};

    #[test]
    fn test_fresh_games_pass() {
        for mode in [Mode::Classic, Mode::Base] {
            for count in 2..=4 {
                let players = &[1, 2, 3, 4][..count];
                let state = new_game(mode, count, players).unwrap();
                assert!(check_invariants(&state).is_empty(), "{mode:?} {count}");
            }
        }
    }

    #[test]
    fn test_ownerless_units_detected() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(3, 3), Cell { units: 2, owner: None });
        let violations = check_invariants(&state);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("without an owner"));
    }

    #[test]
    fn test_empty_owned_cell_detected() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(3, 3), Cell { units: 0, owner: Some(1) });
        let violations = check_invariants(&state);
        assert!(violations[0].message.contains("empty but owned"));
    }

    #[test]
    fn test_hq_health_bound() {
        let mut state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        state.hqs[0].health = MAX_HQ_HEALTH;
        assert!(check_invariants(&state).is_empty());
        state.hqs[0].health = MAX_HQ_HEALTH + 1;
        assert_eq!(check_invariants(&state).len(), 1);
    }

    #[test]
    fn test_power_up_on_hq_detected() {
        let mut state = new_game(Mode::Base, 2, &[1, 2]).unwrap();
        let hq = state.hqs[0].position;
        state.power_ups.push(PowerUp {
            position: hq,
            kind: PowerUpKind::Heart,
        });
        let violations = check_invariants(&state);
        assert!(violations.iter().any(|v| v.message.contains("HQ cell")));
    }

    #[test]
    fn test_multiple_violations_all_reported() {
        let mut state = new_game(Mode::Classic, 2, &[1, 2]).unwrap();
        state.board.set(Coord::new(0, 0), Cell { units: 1, owner: None });
        state.active_player = 3;
        assert_eq!(check_invariants(&state).len(), 2);
    }
}
