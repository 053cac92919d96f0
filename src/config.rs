//! Application-level configuration loading, including the pad palette and level table.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::engine::levels::{DEFAULT_PADS, DEFAULT_ROUND_COUNT, LevelConfig, default_levels};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COLOR_MATCH_BACK_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Pad palette that round targets are drawn from.
    pub pads: Vec<String>,
    /// Level table, ordered from the first to the last level.
    pub levels: Vec<LevelConfig>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in palette and level table.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        pads = config.pads.len(),
                        levels = config.levels.len(),
                        "loaded pad palette and level table from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Level settings for a 1-based level index.
    pub fn level(&self, index: usize) -> Option<&LevelConfig> {
        index.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// Number of configured levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pads: DEFAULT_PADS.iter().map(|pad| pad.to_string()).collect(),
            levels: default_levels(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    pads: Vec<String>,
    #[serde(default)]
    levels: Vec<RawLevel>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let pads: Vec<String> = value
            .pads
            .into_iter()
            .map(|pad| pad.trim().to_uppercase())
            .filter(|pad| !pad.is_empty())
            .collect();
        let pads = if pads.is_empty() {
            warn!("config declares no pads; using built-in palette");
            defaults.pads
        } else {
            pads
        };

        let levels: Vec<LevelConfig> = value.levels.into_iter().map(Into::into).collect();
        let levels = if levels.is_empty() {
            warn!("config declares no levels; using built-in level table");
            defaults.levels
        } else {
            levels
        };

        Self { pads, levels }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single level entry inside the configuration file.
struct RawLevel {
    name: String,
    #[serde(default = "default_round_count")]
    round_count: u32,
    pass_score: u32,
    #[serde(default)]
    round_time_limit_secs: Option<u64>,
    #[serde(default)]
    level_time_limit_secs: Option<u64>,
    min_force: u8,
    #[serde(default)]
    description: String,
    #[serde(default)]
    goal: String,
}

fn default_round_count() -> u32 {
    DEFAULT_ROUND_COUNT
}

impl From<RawLevel> for LevelConfig {
    fn from(value: RawLevel) -> Self {
        Self {
            name: value.name,
            round_count: value.round_count.max(1),
            pass_score: value.pass_score,
            round_time_limit_secs: value.round_time_limit_secs,
            level_time_limit_secs: value.level_time_limit_secs,
            min_force: value.min_force.min(100),
            description: value.description,
            goal: value.goal,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_four_levels_and_three_pads() {
        let config = AppConfig::default();
        assert_eq!(config.level_count(), 4);
        assert_eq!(config.pads, vec!["RED", "BLUE", "GREEN"]);
        assert!(config.level(1).is_some_and(|l| !l.is_timed()));
        assert!(config.level(4).is_some_and(|l| l.min_force == 80));
        assert!(config.level(0).is_none());
        assert!(config.level(5).is_none());
    }

    #[test]
    fn raw_config_normalizes_pads_and_falls_back_when_empty() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "pads": [" red ", "blue"], "levels": [
                { "name": "Solo", "pass_score": 40, "min_force": 5 }
            ]}"#,
        )
        .expect("valid config json");
        let config: AppConfig = raw.into();
        assert_eq!(config.pads, vec!["RED", "BLUE"]);
        assert_eq!(config.levels.len(), 1);
        assert_eq!(config.levels[0].round_count, DEFAULT_ROUND_COUNT);

        let raw: RawConfig = serde_json::from_str(r#"{ "pads": [], "levels": [] }"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.level_count(), 4);
        assert_eq!(config.pads.len(), 3);
    }
}
