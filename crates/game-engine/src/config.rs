use anyhow::{anyhow, Result};
use chrono::Duration;
use event_clock::DayInterval;
use market_types::{Gold, COMPANIES_PER_GAME};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds between two event reveals.
    pub day_interval_secs: i64,
    /// Seconds after start during which trade batches are accepted.
    pub trading_window_secs: i64,
    /// Minimum seconds between two game creations, system wide.
    pub creation_cooldown_secs: i64,
    pub initial_gold: Gold,
    pub default_language: String,
    pub companies_per_game: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            day_interval_secs: 120,
            trading_window_secs: 960,
            creation_cooldown_secs: 120,
            initial_gold: 10_000,
            default_language: "en".to_string(),
            companies_per_game: COMPANIES_PER_GAME,
        }
    }
}

impl GameConfig {
    #[inline]
    pub fn day_interval(&self) -> DayInterval {
        DayInterval::from_secs(self.day_interval_secs)
    }

    #[inline]
    pub fn trading_window(&self) -> Duration {
        Duration::seconds(self.trading_window_secs)
    }

    #[inline]
    pub fn creation_cooldown(&self) -> Duration {
        Duration::seconds(self.creation_cooldown_secs)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by any `GAME_*` variables that are set and parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            day_interval_secs: parse_env("GAME_DAY_INTERVAL_SECS").unwrap_or(defaults.day_interval_secs),
            trading_window_secs: parse_env("GAME_TRADING_WINDOW_SECS")
                .unwrap_or(defaults.trading_window_secs),
            creation_cooldown_secs: parse_env("GAME_CREATION_COOLDOWN_SECS")
                .unwrap_or(defaults.creation_cooldown_secs),
            initial_gold: parse_env("GAME_INITIAL_GOLD").unwrap_or(defaults.initial_gold),
            default_language: env::var("GAME_DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
            companies_per_game: parse_env("GAME_COMPANIES_PER_GAME")
                .unwrap_or(defaults.companies_per_game),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.day_interval_secs <= 0 {
            return Err(anyhow!("day_interval_secs must be positive"));
        }
        if self.trading_window_secs < 0 || self.creation_cooldown_secs < 0 {
            return Err(anyhow!("durations must not be negative"));
        }
        if self.initial_gold < 0 {
            return Err(anyhow!("initial_gold must not be negative"));
        }
        if self.companies_per_game == 0 {
            return Err(anyhow!("a game needs at least one company"));
        }
        if self.default_language.trim().is_empty() {
            return Err(anyhow!("default_language is required"));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
