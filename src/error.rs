//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror.

use crate::lessons::Feature;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Model call timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Failed to generate {feature}")]
    GenerationFailed {
        feature: Feature,
        #[source]
        source: Box<Error>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Media rejected: {0}")]
    MediaRejected(String),

    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
}

impl Error {
    /// Whether a failed model call may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Transport(_)
                | Self::Upstream { .. }
                | Self::SchemaMismatch(_)
                | Self::Serialization(_)
        )
    }

    pub(crate) fn generation_failed(feature: Feature, source: Error) -> Self {
        Self::GenerationFailed {
            feature,
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
