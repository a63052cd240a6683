//! The embedding provider capability.

use crate::embedding::Embedding;
use crate::error::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Texts sent to a provider in one call.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedInput {
    /// One text.
    Single(String),
    /// Several texts, embedded together.
    Batch(Vec<String>),
}

impl EmbedInput {
    /// Number of texts.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(texts) => texts.len(),
        }
    }

    /// True only for an empty batch.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Batch(texts) if texts.is_empty())
    }

    /// Borrow the texts in order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Single(text) => vec![text.as_str()],
            Self::Batch(texts) => texts.iter().map(String::as_str).collect(),
        }
    }

    /// Take the texts in order.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Batch(texts) => texts,
        }
    }
}

impl From<&str> for EmbedInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for EmbedInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for EmbedInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

impl From<Vec<&str>> for EmbedInput {
    fn from(texts: Vec<&str>) -> Self {
        Self::Batch(texts.into_iter().map(str::to_string).collect())
    }
}

/// Vectors returned by a provider.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One embedding per input text, in input order.
    pub embeddings: Vec<Embedding>,
    /// Tokens billed, when the provider reports it.
    pub total_tokens: Option<u64>,
    /// Model that produced the vectors.
    pub model: String,
}

impl EmbeddingOutput {
    /// Wrap vectors produced by `model`.
    pub fn new(embeddings: Vec<Embedding>, model: impl Into<String>) -> Self {
        Self {
            embeddings,
            total_tokens: None,
            model: model.into(),
        }
    }

    /// Record token usage.
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.total_tokens = Some(tokens);
        self
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Whether no vectors were returned.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Length of the first vector.
    pub fn dimensions(&self) -> Option<usize> {
        self.embeddings.first().map(Embedding::dimensions)
    }

    /// Check there are `expected` vectors, all of one length with only finite
    /// components, and return them.
    pub fn into_checked(self, expected: usize) -> EmbeddingResult<Vec<Embedding>> {
        if self.embeddings.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: self.embeddings.len(),
            });
        }

        if let Some(dims) = self.dimensions() {
            if let Some(odd) = self.embeddings.iter().find(|e| e.dimensions() != dims) {
                return Err(EmbeddingError::DimensionMismatch {
                    left: dims,
                    right: odd.dimensions(),
                });
            }
        }

        if let Some(index) = self
            .embeddings
            .iter()
            .position(|e| e.vector.iter().any(|x| !x.is_finite()))
        {
            return Err(EmbeddingError::NonFinite { index });
        }

        Ok(self.embeddings)
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSettings {
    /// Ask the provider for shorter vectors, if it supports that.
    pub dimensions: Option<usize>,
    /// End-user id forwarded to hosted providers.
    pub user: Option<String>,
}

impl EmbeddingSettings {
    /// Provider defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a vector length.
    pub fn dimensions(mut self, dims: usize) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the end-user id.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Turns texts into fixed-length vectors.
///
/// Implementations return one vector per input text, in input order, and
/// give the same vectors for the same texts and model version.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Model identifier.
    fn name(&self) -> &str;

    /// Length of the vectors this model produces.
    fn dimensions(&self) -> usize;

    /// Embed every text in `input` with one call.
    async fn embed(
        &self,
        input: EmbedInput,
        settings: &EmbeddingSettings,
    ) -> EmbeddingResult<EmbeddingOutput>;
}

/// Owned trait object, as returned by name resolution.
pub type BoxedEmbeddingModel = Box<dyn EmbeddingModel>;

/// Shared trait object.
pub type SharedEmbeddingModel = Arc<dyn EmbeddingModel>;
