#![no_main]

//! Move sequence fuzzer.
//!
//! Feeds arbitrary placements (legal or not) to a game and checks that
//! rejected moves leave the state untouched and accepted ones keep every
//! invariant.

use arbitrary::Arbitrary;
use chainfall::game::{check_invariants, Coord, GameSetup, GameState, Mode};
use libfuzzer_sys::fuzz_target;

/// Structured input for a fuzzed game.
#[derive(Arbitrary, Debug)]
struct MoveSequenceInput {
    /// Base mode instead of classic.
    base: bool,
    /// Seated players, folded into 2..=4.
    players: u8,
    /// Board side, folded into 3..=12.
    side: u8,
    /// Power-up spawn seed.
    seed: u64,
    /// Placements as (row, col, pass instead).
    moves: Vec<(u8, u8, bool)>,
}

fuzz_target!(|input: MoveSequenceInput| {
    let side = 3 + u16::from(input.side % 10);
    let players = 2 + input.players % 3;
    let setup = GameSetup {
        mode: if input.base { Mode::Base } else { Mode::Classic },
        rows: side,
        cols: side,
        players: (1..=players).collect(),
        seed: input.seed,
    };
    let Ok(mut state) = GameState::new(&setup) else {
        return;
    };

    for (row, col, pass) in input.moves.into_iter().take(200) {
        if state.is_over {
            break;
        }
        let player = state.active_player;
        let result = if pass {
            state.pass_turn(player)
        } else {
            let coord = Coord::new(u16::from(row) % (side + 1), u16::from(col) % (side + 1));
            state.apply_move(coord, player).map(|outcome| outcome.state)
        };

        // Rejected moves come back as errors; `state` is untouched either way.
        if let Ok(next) = result {
            let violations = check_invariants(&next);
            assert!(violations.is_empty(), "invariants broken: {violations:?}");
            assert_eq!(next.move_count, state.move_count + 1);
            state = next;
        }
    }
});
