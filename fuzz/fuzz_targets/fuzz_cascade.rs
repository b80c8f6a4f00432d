#![no_main]

//! Cascade fuzzer.
//!
//! Builds an arbitrary board (units may sit above critical mass) and
//! resolves one placement on it. The cascade must stop, conserve units in
//! classic mode and never touch a cell outside the board.

use arbitrary::Arbitrary;
use chainfall::game::{resolve_placement, Cell, Coord, GameSetup, GameState};
use libfuzzer_sys::fuzz_target;

/// Structured input for cascade fuzzing.
#[derive(Arbitrary, Debug)]
struct CascadeInput {
    /// Board rows, folded into 2..=10.
    rows: u8,
    /// Board columns, folded into 2..=10.
    cols: u8,
    /// Cells in row-major order as (owner, units).
    cells: Vec<(u8, u8)>,
    /// Where the unit lands.
    origin: (u8, u8),
}

fuzz_target!(|input: CascadeInput| {
    let rows = 2 + u16::from(input.rows % 9);
    let cols = 2 + u16::from(input.cols % 9);
    let setup = GameSetup {
        rows,
        cols,
        ..GameSetup::default()
    };
    let Ok(mut state) = GameState::new(&setup) else {
        return;
    };

    let coords: Vec<Coord> = state.board.iter().map(|(coord, _)| coord).collect();
    for (coord, (owner, units)) in coords.into_iter().zip(input.cells) {
        let cell = if units == 0 {
            Cell::EMPTY
        } else {
            Cell::owned(1 + owner % 2, 1 + u32::from(units % 7))
        };
        state.board.set(coord, cell);
    }

    let origin = Coord::new(u16::from(input.origin.0) % rows, u16::from(input.origin.1) % cols);
    let player = state.board.get(origin).and_then(|cell| cell.owner).unwrap_or(1);
    let before = state.board.total_units();

    let log = resolve_placement(&mut state, origin, player);

    assert_eq!(state.board.total_units(), before + 1);
    assert!(log.explosions.len() <= state.board.len() * chainfall::game::EXPLOSION_BUDGET_PER_CELL);
    assert!(log.explosions.iter().all(|e| state.board.in_bounds(e.coord)));
});
