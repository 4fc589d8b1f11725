//! Game configuration with validation and defaults.
//!
//! Per-game wager limits and availability, loadable from TOML. Amounts are
//! integer minor units throughout.

use crate::games::GameType;
use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Settings for one configured game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    pub game_type: GameType,
    pub min_bet: Amount,
    pub max_bet: Amount,
    pub enabled: bool,
}

/// Full game registry, keyed by game id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CasinoConfig {
    pub games: HashMap<String, GameSettings>,
}

impl Default for CasinoConfig {
    fn default() -> Self {
        let limits = |game_type| GameSettings {
            game_type,
            min_bet: Amount::from_minor_units(10),
            max_bet: Amount::from_units(1_000),
            enabled: true,
        };
        let mut games = HashMap::new();
        games.insert("slot".to_string(), limits(GameType::Slot));
        games.insert("roulette".to_string(), limits(GameType::Roulette));
        games.insert("frogjackpot".to_string(), limits(GameType::ColorMatch));
        Self { games }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration for game {game:?}: {reason}")]
    Invalid { game: String, reason: String },
}

impl CasinoConfig {
    /// Look up a configured game by id.
    pub fn game(&self, game_id: &str) -> Option<&GameSettings> {
        self.games.get(game_id)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CasinoConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Check every game's limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (game_id, settings) in &self.games {
            if settings.min_bet.is_zero() {
                return Err(ConfigError::Invalid {
                    game: game_id.clone(),
                    reason: "min_bet must be positive".to_string(),
                });
            }
            if settings.min_bet > settings.max_bet {
                return Err(ConfigError::Invalid {
                    game: game_id.clone(),
                    reason: format!(
                        "min_bet {} exceeds max_bet {}",
                        settings.min_bet, settings.max_bet
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CasinoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.games.len(), 3);
        assert_eq!(
            config.game("frogjackpot").unwrap().game_type,
            GameType::ColorMatch
        );
        assert!(config.game("poker").is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = r#"
            [games.slot]
            game_type = "slot"
            min_bet = 50
            max_bet = 50000
            enabled = true

            [games.roulette]
            game_type = "roulette"
            min_bet = 100
            max_bet = 100000
            enabled = false
        "#;
        let config = CasinoConfig::from_toml_str(toml).unwrap();
        let slot = config.game("slot").unwrap();
        assert_eq!(slot.min_bet, Amount::from_minor_units(50));
        assert_eq!(slot.max_bet, Amount::from_units(500));
        assert!(!config.game("roulette").unwrap().enabled);
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let toml = r#"
            [games.slot]
            game_type = "slot"
            min_bet = 1000
            max_bet = 10
            enabled = true
        "#;
        let err = CasinoConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_zero_min_bet_rejected() {
        let toml = r#"
            [games.slot]
            game_type = "slot"
            min_bet = 0
            max_bet = 100
            enabled = true
        "#;
        assert!(CasinoConfig::from_toml_str(toml).is_err());
    }
}
