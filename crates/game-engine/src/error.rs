use content_gen::GenerationError;
use serde::{Deserialize, Serialize};
use settlement::TradeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid trades: {0}")]
    InvalidTrades(#[from] TradeError),

    #[error("Content generation failed: {0}")]
    UpstreamGeneration(#[from] GenerationError),
}

/// Coarse error class for whatever transport sits in front of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    InvalidInput,
    Upstream,
}

impl ErrorKind {
    /// HTTP status an outer layer should answer with.
    #[inline]
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidInput => 400,
            ErrorKind::Upstream => 502,
        }
    }
}

impl GameError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NotFound(_) => ErrorKind::NotFound,
            GameError::Unauthorized(_) => ErrorKind::Unauthorized,
            GameError::Forbidden(_) => ErrorKind::Forbidden,
            GameError::Conflict(_) => ErrorKind::Conflict,
            GameError::InvalidTrades(_) => ErrorKind::InvalidInput,
            GameError::UpstreamGeneration(_) => ErrorKind::Upstream,
        }
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        GameError::Forbidden(message.into())
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        GameError::Conflict(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        GameError::NotFound(message.into())
    }
}
