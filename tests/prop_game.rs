//! Property-based tests for the rules engine.
//!
//! These tests drive random legal move sequences and random dense boards
//! through the public API.
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use chainfall::game::{
    check_invariants, critical_mass, legal_moves, Cell, Coord, Game, GameSetup, GameState, Mode,
    PowerUpKind, EXPLOSION_BUDGET_PER_CELL,
};
use chainfall::{apply_move, is_legal_move, undo};

fn setup(mode: Mode, side: u16, players: usize, seed: u64) -> GameSetup {
    GameSetup {
        mode,
        rows: side,
        cols: side,
        players: (1..=4).take(players).collect(),
        seed,
    }
}

/// Play `picks` as indices into the active player's legal moves, passing
/// when there are none. Calls `check` after every move.
fn play(state: GameState, picks: &[usize], mut check: impl FnMut(&GameState, bool)) -> GameState {
    let mut state = state;
    for &pick in picks {
        if state.is_over {
            break;
        }
        let player = state.active_player;
        let moves = legal_moves(&state, player);
        let placed = !moves.is_empty();
        state = if placed {
            apply_move(&state, moves[pick % moves.len()], player).unwrap().state
        } else {
            state.pass_turn(player).unwrap()
        };
        check(&state, placed);
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Classic explosions move units around but never create or destroy them.
    #[test]
    fn prop_classic_units_conserved(
        side in 3u16..8,
        players in 2usize..=4,
        picks in prop::collection::vec(0usize..1000, 1..80)
    ) {
        let state = GameState::new(&setup(Mode::Classic, side, players, 0)).unwrap();
        let mut placements = 0u64;
        play(state, &picks, |state, placed| {
            if placed {
                placements += 1;
            }
            assert_eq!(state.board.total_units(), placements);
        });
    }

    /// Base games keep every structural invariant after every move.
    #[test]
    fn prop_base_invariants_hold(
        side in 3u16..10,
        players in 2usize..=4,
        seed in any::<u64>(),
        picks in prop::collection::vec(0usize..1000, 1..120)
    ) {
        let state = GameState::new(&setup(Mode::Base, side, players, seed)).unwrap();
        play(state, &picks, |state, _| {
            let violations = check_invariants(state);
            assert!(violations.is_empty(), "{violations:?}");
            if state.is_over {
                let alive = state.hqs.iter().filter(|hq| hq.is_alive()).count();
                assert!(alive <= 1);
                assert_eq!(state.winner.is_some(), alive == 1);
            }
        });
    }

    /// In base games every unit is accounted for: a placement adds one and
    /// each HQ hit or own-HQ absorption takes one away.
    #[test]
    fn prop_base_units_accounted(
        side in 3u16..9,
        players in 2usize..=4,
        seed in any::<u64>(),
        picks in prop::collection::vec(0usize..1000, 1..100)
    ) {
        let mut state = GameState::new(&setup(Mode::Base, side, players, seed)).unwrap();
        for &pick in &picks {
            if state.is_over {
                break;
            }
            let player = state.active_player;
            let moves = legal_moves(&state, player);
            if moves.is_empty() {
                state = state.pass_turn(player).unwrap();
                continue;
            }
            let before = state.board.total_units();
            let outcome = apply_move(&state, moves[pick % moves.len()], player).unwrap();
            if outcome.log.power_up != Some(PowerUpKind::Diamond) {
                prop_assert_eq!(
                    outcome.state.board.total_units(),
                    before + 1 - outcome.log.units_removed()
                );
            }
            state = outcome.state;
        }
    }

    /// Classic games also keep their invariants, and a finished game has
    /// exactly one player left on the board.
    #[test]
    fn prop_classic_invariants_hold(
        side in 2u16..7,
        players in 2usize..=4,
        picks in prop::collection::vec(0usize..1000, 1..150)
    ) {
        let state = GameState::new(&setup(Mode::Classic, side, players, 0)).unwrap();
        play(state, &picks, |state, _| {
            assert!(check_invariants(state).is_empty());
            if let Some(winner) = state.winner {
                assert!(state.is_over);
                for &other in state.players.iter().filter(|&&p| p != winner) {
                    assert_eq!(state.board.count_cells(other), 0);
                }
            }
        });
    }

    /// Cascades on boards packed just below critical mass always settle,
    /// are cut off by the budget, or end the game.
    #[test]
    fn prop_dense_cascade_terminates(
        side in 2u16..9,
        fill in prop::collection::vec((0u32..4, 1u8..=2), 64),
        origin in (0u16..8, 0u16..8)
    ) {
        let mut state = GameState::new(&setup(Mode::Classic, side, 2, 0)).unwrap();
        let coords: Vec<Coord> = state.board.iter().map(|(coord, _)| coord).collect();
        for (coord, &(units, owner)) in coords.iter().zip(&fill) {
            let mass = critical_mass(coord.row, coord.col, side, side);
            let units = units.min(mass - 1);
            let cell = if units == 0 { Cell::EMPTY } else { Cell::owned(owner, units) };
            state.board.set(*coord, cell);
        }
        let origin = Coord::new(origin.0 % side, origin.1 % side);
        let opposite = Coord::new(side - 1 - origin.row, side - 1 - origin.col);
        if opposite != origin {
            state.board.set(opposite, Cell::owned(2, 1));
        }
        let mass = critical_mass(origin.row, origin.col, side, side);
        state.board.set(origin, Cell::owned(1, mass - 1));
        state.move_count = 2;
        state.turns_taken = vec![1, 1];
        let before = state.board.total_units();

        let outcome = apply_move(&state, origin, 1).unwrap();
        let after = &outcome.state;

        prop_assert_eq!(after.board.total_units(), before + 1);
        prop_assert!(outcome.log.explosions.len() <= state.board.len() * EXPLOSION_BUDGET_PER_CELL);
        let settled = after.board.iter().all(|(coord, cell)| {
            cell.units < critical_mass(coord.row, coord.col, side, side)
        });
        prop_assert!(settled || outcome.log.truncated || after.is_over);
    }

    /// Asking about a move's legality leaves the state alone and always
    /// gives the same answer.
    #[test]
    fn prop_legality_is_pure(
        mode in prop_oneof![Just(Mode::Classic), Just(Mode::Base)],
        players in 2usize..=4,
        picks in prop::collection::vec(0usize..1000, 0..40),
        target in (0u16..9, 0u16..9),
        player in 1u8..=4
    ) {
        let state = GameState::new(&setup(mode, 9, players, 3)).unwrap();
        let state = play(state, &picks, |_, _| {});
        let before = state.clone();
        let coord = Coord::new(target.0, target.1);

        let first = is_legal_move(&state, coord, player);
        let second = is_legal_move(&state, coord, player);
        prop_assert_eq!(first, second);
        prop_assert_eq!(&state, &before);
        prop_assert_eq!(first, legal_moves(&state, player).contains(&coord));
    }

    /// Undoing every move of a session restores the starting state exactly.
    #[test]
    fn prop_undo_restores_start(
        mode in prop_oneof![Just(Mode::Classic), Just(Mode::Base)],
        players in 2usize..=4,
        seed in any::<u64>(),
        picks in prop::collection::vec(0usize..1000, 1..40)
    ) {
        let mut game = Game::new(setup(mode, 7, players, seed)).unwrap();
        let start = game.state().clone();

        for &pick in &picks {
            if game.state().is_over {
                break;
            }
            let player = game.state().active_player;
            let moves = legal_moves(game.state(), player);
            if moves.is_empty() {
                game.pass_turn(player).unwrap();
            } else {
                game.apply_move(moves[pick % moves.len()], player).unwrap();
            }
        }

        while undo(&mut game) {}
        prop_assert_eq!(game.state(), &start);
        prop_assert_eq!(game.history_len(), 0);
    }
}
