//! Match configuration: board, seats and per-seat AI settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::AiConfig;
use crate::game::{GameSetup, Mode, PlayerId, DEFAULT_SIDE, MAX_PLAYERS};
use crate::tournament::MatchError;

/// Configuration for AI-vs-AI matches.
///
/// Every field has a default, so a JSON file only needs the keys it
/// changes:
///
/// ```json
/// { "mode": "base", "players": 3, "ai": [{ "strategy": "search" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Game variant.
    pub mode: Mode,
    /// Board rows.
    pub rows: u16,
    /// Board columns.
    pub cols: u16,
    /// Number of seated players (2-4), ids 1..=players.
    pub players: usize,
    /// AI settings per seat. Missing seats reuse the last entry, or the
    /// default when the list is empty.
    pub ai: Vec<AiConfig>,
    /// Moves (passes included) before the match is called off.
    pub max_moves: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Classic,
            rows: DEFAULT_SIDE,
            cols: DEFAULT_SIDE,
            players: 2,
            ai: Vec::new(),
            max_moves: 2_000,
        }
    }
}

impl MatchConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_json_str(text: &str) -> Result<Self, MatchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, MatchError> {
        let text = std::fs::read_to_string(path).map_err(|source| MatchError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Player ids for this configuration, in seating order.
    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        (1..=MAX_PLAYERS)
            .take(self.players)
            .filter_map(|id| PlayerId::try_from(id).ok())
            .collect()
    }

    /// AI settings for the player in `seat` (0-indexed).
    #[must_use]
    pub fn ai_for(&self, seat: usize) -> AiConfig {
        self.ai
            .get(seat)
            .or_else(|| self.ai.last())
            .copied()
            .unwrap_or_default()
    }

    /// Game setup for one match.
    #[must_use]
    pub fn setup(&self, seed: u64) -> GameSetup {
        GameSetup {
            mode: self.mode,
            rows: self.rows,
            cols: self.cols,
            players: self.player_ids(),
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Difficulty, Strategy};

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            MatchConfig::from_json_str(r#"{ "mode": "base", "players": 3 }"#).unwrap();
        assert_eq!(config.mode, Mode::Base);
        assert_eq!(config.players, 3);
        assert_eq!(config.rows, DEFAULT_SIDE);
        assert_eq!(config.player_ids(), vec![1, 2, 3]);
        assert_eq!(config.ai_for(2), AiConfig::default());
    }

    #[test]
    fn test_ai_list_extends_last_entry() {
        let config = MatchConfig::from_json_str(
            r#"{ "ai": [{ "strategy": "search", "search_depth": 2 }, { "difficulty": "hard" }] }"#,
        )
        .unwrap();
        assert_eq!(config.ai_for(0).strategy, Strategy::Search);
        assert_eq!(config.ai_for(0).search_depth, 2);
        assert_eq!(config.ai_for(1).difficulty, Difficulty::Hard);
        assert_eq!(config.ai_for(3).difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(
            MatchConfig::from_json_str(r#"{ "mode": "hexagonal" }"#),
            Err(MatchError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_player_ids_capped() {
        let config = MatchConfig {
            players: 9,
            ..MatchConfig::default()
        };
        assert_eq!(config.player_ids().len(), MAX_PLAYERS);
    }
}
