//! Embedding errors.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// HTTP error from provider.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// API error from provider.
    #[error("API error: {0}")]
    Api(String),

    /// Rate limited by provider.
    #[error("Rate limited: retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry time.
        retry_after: Option<std::time::Duration>,
    },

    /// Provider returned a different number of vectors than texts sent.
    #[error("Expected {expected} embeddings, provider returned {actual}")]
    CountMismatch {
        /// Number of input texts.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },

    /// Two vectors that must be compared have different lengths.
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },

    /// A vector contains NaN or an infinity.
    #[error("Embedding {index} has a non-finite component")]
    NonFinite {
        /// Position of the offending vector in the request.
        index: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EmbeddingError {
    /// Create an API error.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is retryable.
    ///
    /// Nothing in refscore retries; callers wrapping a batch can use this to
    /// decide whether a second attempt is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Http { status: 429 | 500..=599, .. }
        )
    }
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
