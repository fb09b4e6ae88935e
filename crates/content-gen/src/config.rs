use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            timeout_ms: 60_000,
            max_retries: 3,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            api_key: env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?,
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            chat_model: env::var("OPENAI_CHAT_MODEL").unwrap_or(defaults.chat_model),
            image_model: env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            image_size: env::var("OPENAI_IMAGE_SIZE").unwrap_or(defaults.image_size),
            timeout_ms: env::var("OPENAI_TIMEOUT_MS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(defaults.timeout_ms),
            max_retries: env::var("OPENAI_MAX_RETRIES")
                .unwrap_or_default()
                .parse()
                .unwrap_or(defaults.max_retries),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow!("Generator API key is required"));
        }
        if self.base_url.is_empty() {
            return Err(anyhow!("Generator base URL is required"));
        }
        if self.chat_model.is_empty() {
            return Err(anyhow!("Chat model name is required"));
        }
        if self.max_retries == 0 {
            return Err(anyhow!("max_retries must allow at least one attempt"));
        }

        Ok(())
    }
}
