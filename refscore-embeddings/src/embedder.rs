//! High-level encoder interface and model resolution by name.

use crate::embedding::Embedding;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::hashing::{HashEmbeddingModel, DEFAULT_HASH_DIMENSIONS};
use crate::model::{
    BoxedEmbeddingModel, EmbedInput, EmbeddingModel, EmbeddingSettings, SharedEmbeddingModel,
};
use std::sync::Arc;
use tracing::debug;

/// Batched text encoder on top of an [`EmbeddingModel`].
///
/// Adds the guarantees the scoring code relies on: exactly one vector per
/// input text, in input order, all of the same length.
///
/// # Example
///
/// ```ignore
/// use refscore_embeddings::Embedder;
///
/// let embedder = Embedder::from_name("all-MiniLM-L6-v2")?;
/// let vectors = embedder.encode(&["first".into(), "second".into()]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[derive(Clone)]
pub struct Embedder {
    model: SharedEmbeddingModel,
    settings: EmbeddingSettings,
}

impl Embedder {
    /// Create a new embedder with a model.
    pub fn new<M: EmbeddingModel + 'static>(model: M) -> Self {
        Self::from_shared(Arc::new(model))
    }

    /// Create from an already shared model handle.
    pub fn from_shared(model: SharedEmbeddingModel) -> Self {
        Self {
            model,
            settings: EmbeddingSettings::default(),
        }
    }

    /// Resolve a model by name (see [`infer_embedding_model`]).
    pub fn from_name(name: &str) -> EmbeddingResult<Self> {
        let model = infer_embedding_model(name)?;
        Ok(Self::from_shared(Arc::from(model)))
    }

    /// Set the embedding settings.
    pub fn with_settings(mut self, settings: EmbeddingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Get the default dimensions.
    pub fn dimensions(&self) -> usize {
        self.model.dimensions()
    }

    /// Encode texts in a single model invocation.
    pub async fn encode(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model.name(), texts = texts.len(), "Encoding batch");

        self.model
            .embed(EmbedInput::Batch(texts.to_vec()), &self.settings)
            .await?
            .into_checked(texts.len())
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.model.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Infer embedding model from a name string.
///
/// Accepted forms:
/// - `"openai:text-embedding-3-small"`: hosted OpenAI (`OPENAI_API_KEY`)
/// - `"hash"` or `"hash:256"`: deterministic offline hashing model
/// - `"all-MiniLM-L6-v2"` (no provider): OpenAI-compatible local server at
///   `REFSCORE_EMBEDDINGS_URL`
pub fn infer_embedding_model(name: &str) -> EmbeddingResult<BoxedEmbeddingModel> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EmbeddingError::config("Embedding model name is empty"));
    }

    if name == "hash" {
        return Ok(Box::new(HashEmbeddingModel::new(DEFAULT_HASH_DIMENSIONS)));
    }

    match name.split_once(':') {
        Some(("hash", dims)) => {
            let dims: usize = dims.parse().map_err(|_| {
                EmbeddingError::config(format!("Invalid hash dimensions: {}", dims))
            })?;
            if dims == 0 {
                return Err(EmbeddingError::config("Hash dimensions must be positive"));
            }
            Ok(Box::new(HashEmbeddingModel::new(dims)))
        }

        #[cfg(feature = "openai")]
        Some(("openai", model_name)) => {
            use crate::openai::OpenAIEmbeddingModel;
            Ok(Box::new(OpenAIEmbeddingModel::from_env(model_name)?))
        }

        #[cfg(feature = "openai")]
        None => {
            use crate::openai::OpenAIEmbeddingModel;
            Ok(Box::new(OpenAIEmbeddingModel::local_from_env(name)))
        }

        #[cfg(not(feature = "openai"))]
        None => Err(EmbeddingError::config(format!(
            "No provider available for '{}'. Enable the `openai` feature or use 'hash'",
            name
        ))),

        Some((provider, _)) => Err(EmbeddingError::config(format!(
            "Unknown provider: {}. Available: openai, hash",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmbeddingOutput;
    use async_trait::async_trait;
    use rstest::rstest;

    struct ShortModel;

    #[async_trait]
    impl EmbeddingModel for ShortModel {
        fn name(&self) -> &str {
            "short"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(
            &self,
            _input: EmbedInput,
            _settings: &EmbeddingSettings,
        ) -> EmbeddingResult<EmbeddingOutput> {
            Ok(EmbeddingOutput::new(vec![Embedding::new(vec![1.0, 0.0])], "short"))
        }
    }

    struct RaggedModel;

    #[async_trait]
    impl EmbeddingModel for RaggedModel {
        fn name(&self) -> &str {
            "ragged"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(
            &self,
            _input: EmbedInput,
            _settings: &EmbeddingSettings,
        ) -> EmbeddingResult<EmbeddingOutput> {
            Ok(EmbeddingOutput::new(
                vec![Embedding::new(vec![1.0, 0.0]), Embedding::new(vec![1.0])],
                "ragged",
            ))
        }
    }

    #[rstest]
    #[case("hash", DEFAULT_HASH_DIMENSIONS)]
    #[case("hash:16", 16)]
    #[case("  hash:8  ", 8)]
    fn test_infer_hash(#[case] name: &str, #[case] dims: usize) {
        let model = infer_embedding_model(name).unwrap();
        assert_eq!(model.dimensions(), dims);
    }

    #[rstest]
    #[case("hash:abc")]
    #[case("hash:0")]
    #[case("unknown:model")]
    fn test_infer_rejected(#[case] name: &str) {
        assert!(infer_embedding_model(name).is_err());
    }

    #[test]
    fn test_infer_unknown_provider() {
        let err = infer_embedding_model("unknown:model").err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn test_infer_empty() {
        assert!(infer_embedding_model("  ").is_err());
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_infer_bare_name_is_local_server() {
        let model = infer_embedding_model("all-MiniLM-L6-v2").unwrap();
        assert_eq!(model.name(), "all-MiniLM-L6-v2");
        assert_eq!(model.dimensions(), 384);
    }

    #[tokio::test]
    async fn test_encode_preserves_order() {
        let embedder = Embedder::new(HashEmbeddingModel::new(16));
        let texts = vec!["one".to_string(), "two".to_string()];
        let vectors = embedder.encode(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].vector, HashEmbeddingModel::new(16).embed_text("one"));
    }

    #[tokio::test]
    async fn test_encode_empty() {
        let embedder = Embedder::new(ShortModel);
        assert!(embedder.encode(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_encode_count_mismatch() {
        let embedder = Embedder::new(ShortModel);
        let err = embedder
            .encode(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::CountMismatch { expected: 2, actual: 1 }));
    }

    #[tokio::test]
    async fn test_encode_dimension_mismatch() {
        let embedder = Embedder::new(RaggedModel);
        let err = embedder
            .encode(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { left: 2, right: 1 }));
    }
}
