//! Ranking and difficulty-dependent picking.

// Slice sizes come from small move counts
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use rand::Rng;

use crate::ai::Difficulty;
use crate::game::Coord;

/// Add uniform noise in `[-noise, noise]` to each score and sort the moves
/// best first. Equal scores keep row-major order.
///
/// Noise is drawn in move order, so the result depends only on the inputs
/// and the RNG state.
pub fn rank_moves<R: Rng>(moves: &[Coord], scores: &[f64], noise: f64, rng: &mut R) -> Vec<(Coord, f64)> {
    let mut ranked: Vec<(Coord, f64)> = moves
        .iter()
        .zip(scores)
        .map(|(&coord, &score)| {
            let jitter = if noise > 0.0 {
                rng.gen_range(-noise..=noise)
            } else {
                0.0
            };
            (coord, score + jitter)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Pick uniformly from the top slice of `ranked` allowed by `difficulty`.
///
/// The slice always holds at least one move; `None` only for an empty
/// ranking.
pub fn pick_move<R: Rng>(ranked: &[(Coord, f64)], difficulty: Difficulty, rng: &mut R) -> Option<Coord> {
    if ranked.is_empty() {
        return None;
    }
    let slice = ((ranked.len() as f64 * difficulty.top_fraction()).ceil() as usize).clamp(1, ranked.len());
    let index = if slice == 1 { 0 } else { rng.gen_range(0..slice) };
    Some(ranked[index].0)
}
