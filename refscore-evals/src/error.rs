//! Evaluation errors.

use refscore_embeddings::EmbeddingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Parallel input lists have different lengths.
    #[error("Shape mismatch: {predictions} predictions vs {references} references")]
    ShapeMismatch {
        /// Number of predictions.
        predictions: usize,
        /// Number of references (or sample ids).
        references: usize,
    },

    /// A metric's configuration could not be resolved.
    #[error("Invalid configuration for '{metric}': {message}")]
    Configuration {
        /// Metric (or config section) name.
        metric: String,
        /// What is wrong.
        message: String,
    },

    /// A metric implementation failed while scoring.
    #[error("Metric '{metric}' failed: {source}")]
    MetricComputation {
        /// Metric name.
        metric: String,
        /// Underlying failure.
        #[source]
        source: EmbeddingError,
    },

    /// Configuration file does not exist.
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Dataset loading error.
    #[error("Failed to load dataset: {0}")]
    Dataset(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other error.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EvalError {
    /// Create a configuration error.
    pub fn configuration(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            metric: metric.into(),
            message: message.into(),
        }
    }

    /// Create a metric computation error.
    pub fn metric_computation(metric: impl Into<String>, source: EmbeddingError) -> Self {
        Self::MetricComputation {
            metric: metric.into(),
            source,
        }
    }

    /// Create a dataset error.
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;
