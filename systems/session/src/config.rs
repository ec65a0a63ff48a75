//! Match configuration and its TOML representation.

use std::time::Duration;

use gridpulse_core::{DEFAULT_WIN_ENERGY, SPAWN_INTERVAL};
use gridpulse_system_spawning::Config as SpawnConfig;
use gridpulse_world::{Options, TieBreak, DEFAULT_RNG_SEED};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has unexpected keys or values.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Spawning every zero milliseconds would flood the grid.
    #[error("spawn interval must be positive")]
    ZeroSpawnInterval,
    /// A match that is won before it starts is not a match.
    #[error("win energy must be positive")]
    ZeroWinEnergy,
}

/// Tunable parameters of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Time between two spawn requests.
    pub spawn_interval: Duration,
    /// Seed shared by the spawn draws and shuffled tie breaks.
    pub rng_seed: u64,
    /// Tie-break strategy of the path field.
    pub tie_break: TieBreak,
    /// Energy that wins the match.
    pub win_energy: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_interval: SPAWN_INTERVAL,
            rng_seed: DEFAULT_RNG_SEED,
            tie_break: TieBreak::Ordered,
            win_energy: DEFAULT_WIN_ENERGY,
        }
    }
}

impl Config {
    /// Parses a TOML document. Missing keys keep their default values.
    ///
    /// ```toml
    /// spawn_interval_ms = 1500
    /// rng_seed = 7
    /// tie_break = "shuffled"
    /// win_energy = 50
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        let defaults = Self::default();
        let config = Self {
            spawn_interval: file
                .spawn_interval_ms
                .map_or(defaults.spawn_interval, Duration::from_millis),
            rng_seed: file.rng_seed.unwrap_or(defaults.rng_seed),
            tie_break: file.tie_break.map_or(defaults.tie_break, TieBreak::from),
            win_energy: file.win_energy.unwrap_or(defaults.win_energy),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if self.win_energy == 0 {
            return Err(ConfigError::ZeroWinEnergy);
        }
        Ok(())
    }

    /// Options used to construct the world.
    #[must_use]
    pub fn world_options(&self) -> Options {
        Options {
            tie_break: self.tie_break,
            rng_seed: self.rng_seed,
            win_energy: self.win_energy,
        }
    }

    /// Configuration handed to the spawning system.
    #[must_use]
    pub fn spawn_config(&self) -> SpawnConfig {
        SpawnConfig::new(self.spawn_interval, self.rng_seed)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    spawn_interval_ms: Option<u64>,
    rng_seed: Option<u64>,
    tie_break: Option<TieBreakSetting>,
    win_energy: Option<u32>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TieBreakSetting {
    Ordered,
    Shuffled,
}

impl From<TieBreakSetting> for TieBreak {
    fn from(setting: TieBreakSetting) -> Self {
        match setting {
            TieBreakSetting::Ordered => Self::Ordered,
            TieBreakSetting::Shuffled => Self::Shuffled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        assert_eq!(Config::from_toml_str("").expect("valid"), Config::default());
    }

    #[test]
    fn parses_every_key() {
        let config = Config::from_toml_str(
            "spawn_interval_ms = 1500\nrng_seed = 7\ntie_break = \"shuffled\"\nwin_energy = 50\n",
        )
        .expect("valid");

        assert_eq!(
            config,
            Config {
                spawn_interval: Duration::from_millis(1500),
                rng_seed: 7,
                tie_break: TieBreak::Shuffled,
                win_energy: 50,
            }
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            Config::from_toml_str("grid_columns = 40"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_unknown_tie_break() {
        assert!(matches!(
            Config::from_toml_str("tie_break = \"alphabetical\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_values() {
        assert!(matches!(
            Config::from_toml_str("spawn_interval_ms = 0"),
            Err(ConfigError::ZeroSpawnInterval)
        ));
        assert!(matches!(
            Config::from_toml_str("win_energy = 0"),
            Err(ConfigError::ZeroWinEnergy)
        ));
    }
}
