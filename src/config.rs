//! Configuration management

use anyhow::Result;
use content_gen::GeneratorConfig;
use game_engine::GameConfig;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
    /// Render collected metrics in Prometheus text format on shutdown.
    pub print_metrics: bool,
    pub game: GameConfig,
    pub generator: GeneratorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            print_metrics: true,
            game: GameConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.game.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Environment-only configuration. A missing `OPENAI_API_KEY` leaves the
    /// generator unconfigured, which selects the offline generator.
    pub fn from_env() -> Self {
        Self {
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            print_metrics: env::var("STOCK_PARTY_PRINT_METRICS")
                .map(|v| v != "0" && v != "false")
                .unwrap_or(true),
            game: GameConfig::from_env(),
            generator: GeneratorConfig::from_env().unwrap_or_default(),
        }
    }

    #[inline]
    pub fn uses_remote_generator(&self) -> bool {
        !self.generator.api_key.is_empty()
    }
}
