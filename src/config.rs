//! User configuration loaded from `config.toml`
//!
//! The file lives in the OS config directory:
//! - Linux: `$XDG_CONFIG_HOME/imposter/config.toml`
//! - macOS: `~/Library/Application Support/imposter/config.toml`
//!
//! Every field is optional; a missing file means all defaults.

use crate::game::roster::{RosterLimits, MAX_PLAYERS, MIN_PLAYERS};
use crate::storage::DEFAULT_HISTORY_LIMIT;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fewest players a round can start with
    pub min_players: usize,
    /// Most players the roster accepts
    pub max_players: usize,
    /// Rounds kept in history; older ones are trimmed
    pub history_limit: usize,
    /// Category preselected for new games
    pub default_category: Option<String>,
    /// Word list replacing the built-in one
    pub categories_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_category: None,
            categories_file: None,
        }
    }
}

impl GameConfig {
    /// Path of the config file in the OS config directory, if one can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "imposter").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the config from the OS config directory, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < MIN_PLAYERS {
            return Err(ConfigError::Invalid(format!(
                "min_players must be at least {} (got {})",
                MIN_PLAYERS, self.min_players
            )));
        }
        if self.max_players < self.min_players {
            return Err(ConfigError::Invalid(format!(
                "max_players ({}) must not be below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn roster_limits(&self) -> RosterLimits {
        RosterLimits {
            min: self.min_players,
            max: self.max_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = GameConfig::parse("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.min_players, 3);
        assert_eq!(config.max_players, 10);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_partial_file() {
        let config = GameConfig::parse(
            r#"
            max_players = 12
            default_category = "food"
            "#,
        )
        .unwrap();
        assert_eq!(config.min_players, 3);
        assert_eq!(config.max_players, 12);
        assert_eq!(config.default_category.as_deref(), Some("food"));
        assert_eq!(config.roster_limits(), RosterLimits { min: 3, max: 12 });
    }

    #[test]
    fn test_min_players_below_three_rejected() {
        assert!(matches!(
            GameConfig::parse("min_players = 2"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_max_below_min_rejected() {
        assert!(matches!(
            GameConfig::parse("min_players = 5\nmax_players = 4"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        assert!(matches!(
            GameConfig::parse("history_limit = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            GameConfig::parse("max_players = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = 5").unwrap();
        let config = GameConfig::load_from(file.path()).unwrap();
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
