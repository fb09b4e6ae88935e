use market_types::Gold;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse generator output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode thumbnail: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Malformed generator output: {0}")]
    Malformed(String),
}

impl GenerationError {
    #[inline]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Transport failures and server-side errors are worth another attempt.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A generated company before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySeed {
    /// Stable identifier used to attach events to this company.
    pub key: String,
    pub name: String,
    pub description: String,
    pub price: Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    pub title: String,
    pub companies: Vec<CompanySeed>,
}

impl Lineup {
    #[inline]
    pub fn company(&self, key: &str) -> Option<&CompanySeed> {
        self.companies.iter().find(|c| c.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSeed {
    pub company_key: String,
    pub description: String,
    pub percent: i64,
}

/// Every company's event for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEvents {
    pub day: u32,
    pub events: Vec<EventSeed>,
}

impl DayEvents {
    #[inline]
    pub fn event_for(&self, company_key: &str) -> Option<&EventSeed> {
        self.events.iter().find(|e| e.company_key == company_key)
    }
}
