use async_trait::async_trait;
use bytes::Bytes;

pub mod config;
pub mod openai;
pub mod scripted;
pub mod types;
pub mod week;

pub use config::GeneratorConfig;
pub use openai::OpenAiGenerator;
pub use scripted::ScriptedGenerator;
pub use types::*;
pub use week::{align_day, generate_week, validate_lineup};

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Source of game content.
///
/// Companies are correlated across calls by [`CompanySeed::key`], never by
/// their position in a list.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Invents a themed set of `count` companies.
    async fn generate_lineup(&self, theme: &str, language: &str, count: usize) -> Result<Lineup>;

    /// Produces one event per company for `day`, with the earlier days as context.
    async fn generate_day(
        &self,
        lineup: &Lineup,
        prior_days: &[DayEvents],
        day: u32,
        language: &str,
    ) -> Result<DayEvents>;

    async fn generate_thumbnail(&self, company: &CompanySeed) -> Result<Bytes>;
}
