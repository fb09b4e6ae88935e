use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::prompts::{day_messages, into_day, into_lineup, lineup_messages, thumbnail_prompt};
use super::types::{
    ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, DayPayload, ImageRequest,
    ImageResponse, LineupPayload, ResponseFormat,
};
use crate::config::GeneratorConfig;
use crate::types::{CompanySeed, DayEvents, GenerationError, Lineup};
use crate::{ContentGenerator, Result};

/// Content generator backed by an OpenAI-compatible chat and image API.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    config: Arc<GeneratorConfig>,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent("StockParty/1.0")
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("Initializing content generator for {} ({})", base_url, config.chat_model);

        Ok(Self {
            client,
            base_url,
            config: Arc::new(config),
        })
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!("Sending generator request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn post_with_retry<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut attempts = 0;

        loop {
            match self.post(endpoint, body).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    attempts += 1;
                    if !e.is_retryable() || attempts >= self.config.max_retries {
                        return Err(e);
                    }

                    warn!("Generator request attempt {} failed: {}, retrying...", attempts, e);
                    sleep(Duration::from_millis(100 * attempts as u64)).await;
                }
            }
        }
    }

    /// Runs one JSON-mode chat completion and parses the reply as `R`.
    async fn chat_json<R>(&self, messages: &[ChatMessage]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response: ChatResponse = self.post_with_retry("/chat/completions", &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::malformed("chat completion has no content"))?;

        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate_lineup(&self, theme: &str, language: &str, count: usize) -> Result<Lineup> {
        info!("Generating {} companies for theme '{}'", count, theme);

        let messages = lineup_messages(theme, language, count);
        let payload: LineupPayload = self.chat_json(&messages).await?;

        Ok(into_lineup(payload, theme))
    }

    async fn generate_day(
        &self,
        lineup: &Lineup,
        prior_days: &[DayEvents],
        day: u32,
        language: &str,
    ) -> Result<DayEvents> {
        debug!("Generating day {} events for '{}'", day, lineup.title);

        let messages = day_messages(lineup, prior_days, day, language)?;
        let payload: DayPayload = self.chat_json(&messages).await?;

        into_day(payload, lineup, day)
    }

    async fn generate_thumbnail(&self, company: &CompanySeed) -> Result<Bytes> {
        debug!("Generating thumbnail for {}", company.name);

        let request = ImageRequest {
            model: &self.config.image_model,
            prompt: thumbnail_prompt(company),
            size: &self.config.image_size,
            response_format: "b64_json",
            n: 1,
        };

        let response: ImageResponse = self.post_with_retry("/images/generations", &request).await?;
        let encoded = response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| GenerationError::malformed("image response has no b64_json data"))?;

        Ok(Bytes::from(general_purpose::STANDARD.decode(encoded)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator_for(server: &MockServer) -> OpenAiGenerator {
        OpenAiGenerator::new(GeneratorConfig {
            api_key: "sk-test".into(),
            base_url: server.uri(),
            max_retries: 2,
            ..GeneratorConfig::default()
        })
        .unwrap()
    }

    fn chat_reply(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }]
        }))
    }

    #[tokio::test]
    async fn test_generate_lineup_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(chat_reply(json!({
                "title": "Moon Market",
                "companies": [
                    { "name": "Lunar Cheese", "description": "dairy from space", "price": 250 },
                    { "name": "Crater Cabs", "description": "taxis", "price": 410 }
                ]
            })))
            .mount(&server)
            .await;

        let lineup = generator_for(&server).generate_lineup("moon", "en", 2).await.unwrap();
        assert_eq!(lineup.title, "Moon Market");
        assert_eq!(lineup.companies.len(), 2);
        assert_eq!(lineup.companies[1].key, "c2");
        assert_eq!(lineup.companies[1].price, 410);
    }

    #[tokio::test]
    async fn test_lineup_prompt_asks_for_requested_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Create 3 imaginary companies"))
            .respond_with(chat_reply(json!({
                "title": "Tiny Market",
                "companies": [
                    { "name": "One", "description": "first", "price": 100 },
                    { "name": "Two", "description": "second", "price": 200 },
                    { "name": "Three", "description": "third", "price": 300 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lineup = generator_for(&server).generate_lineup("tiny", "en", 3).await.unwrap();
        assert_eq!(lineup.companies.len(), 3);
        assert_eq!(lineup.companies[2].key, "c3");
    }

    #[tokio::test]
    async fn test_generate_thumbnail_decodes_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "b64_json": general_purpose::STANDARD.encode(b"jpeg-bytes") }]
            })))
            .mount(&server)
            .await;

        let seed = CompanySeed {
            key: "c1".into(),
            name: "Lunar Cheese".into(),
            description: "dairy".into(),
            price: 250,
        };
        let bytes = generator_for(&server).generate_thumbnail(&seed).await.unwrap();
        assert_eq!(&bytes[..], b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_api_error_is_reported_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "bad request" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator_for(&server).generate_lineup("moon", "en", 2).await.unwrap_err();
        match err {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad request");
            }
            other => panic!("Expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = generator_for(&server).generate_lineup("moon", "en", 2).await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 503, .. }));
    }
}
