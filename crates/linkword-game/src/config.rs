//! Configuration for the game services

use linkword_domain::DEFAULT_CONNECTION_SIZE;
use linkword_oracle::ClueCollision;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the game services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of words dealt into each connection
    pub connection_size: usize,

    /// Maximum time to wait for one oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// How generated clues are compared against the dealt words
    pub clue_collision: ClueCollision,
}

impl GameConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connection_size == 0 {
            return Err("connection_size must be greater than 0".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Small connections and a short timeout, for tests
    pub fn default_test_config() -> Self {
        Self {
            connection_size: 4,
            oracle_timeout_secs: 2,
            clue_collision: ClueCollision::CaseInsensitive,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            connection_size: DEFAULT_CONNECTION_SIZE,
            oracle_timeout_secs: 60,
            clue_collision: ClueCollision::CaseInsensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connection_size, 9);
        assert_eq!(config.oracle_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_connection_size() {
        let config = GameConfig {
            connection_size: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml("clue_collision = \"case_sensitive\"").unwrap();
        assert_eq!(config.clue_collision, ClueCollision::CaseSensitive);
        assert_eq!(config.connection_size, 9);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GameConfig::default_test_config();
        let parsed = GameConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
