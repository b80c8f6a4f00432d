//! Per-player scoring multipliers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Smallest multiplier a personality can roll.
pub const MIN_WEIGHT: f64 = 0.6;

/// Largest multiplier a personality can roll.
pub const MAX_WEIGHT: f64 = 1.4;

/// Weights applied to each heuristic category for one AI player.
///
/// Rolled once per game so that AI players in the same game play with
/// recognisably different styles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Captures and building towards critical mass.
    pub tactical: f64,
    /// Corner, edge and centre preferences.
    pub positional: f64,
    /// Size and depth of triggered chains.
    pub chain: f64,
    /// Caution against opponents' best replies.
    pub risk: f64,
    /// Pressure on enemy headquarters.
    pub base_threat: f64,
    /// Care for the own headquarters.
    pub base_defense: f64,
    /// Opponent whose threats weigh more.
    pub rival: Option<PlayerId>,
}

impl Personality {
    /// All weights 1, no rival.
    pub const NEUTRAL: Self = Self {
        tactical: 1.0,
        positional: 1.0,
        chain: 1.0,
        risk: 1.0,
        base_threat: 1.0,
        base_defense: 1.0,
        rival: None,
    };

    /// Roll a personality. The rival is drawn from `opponents`.
    pub fn random<R: Rng>(rng: &mut R, opponents: &[PlayerId]) -> Self {
        let mut weight = || rng.gen_range(MIN_WEIGHT..=MAX_WEIGHT);
        let tactical = weight();
        let positional = weight();
        let chain = weight();
        let risk = weight();
        let base_threat = weight();
        let base_defense = weight();

        let rival = if opponents.is_empty() {
            None
        } else {
            Some(opponents[rng.gen_range(0..opponents.len())])
        };

        Self {
            tactical,
            positional,
            chain,
            risk,
            base_threat,
            base_defense,
            rival,
        }
    }

    /// Multiplier applied to threats coming from `opponent`.
    #[must_use]
    pub fn threat_weight(&self, opponent: PlayerId) -> f64 {
        if self.rival == Some(opponent) { 1.5 } else { 1.0 }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
