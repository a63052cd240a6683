//! # refscore-embeddings
//!
//! Embedding providers and vector similarity for refscore.
//!
//! The relevance metric in `refscore-evals` only needs one capability from
//! this crate: turn a batch of texts into fixed-length vectors. Everything
//! here is organized around that.
//!
//! ## Core Concepts
//!
//! - **[`EmbeddingModel`]**: Trait for embedding model implementations
//! - **[`Embedder`]**: Batched `encode` with count and dimension checks
//! - **[`Embedding`]**: Vector representation with metadata
//! - **[`cosine_similarity`]**: Similarity between two vectors
//!
//! ## Providers
//!
//! - [`HashEmbeddingModel`]: deterministic feature hashing, always available
//! - `OpenAIEmbeddingModel` (feature `openai`, default): hosted OpenAI or any
//!   OpenAI-compatible embedding server
//!
//! ## Example
//!
//! ```ignore
//! use refscore_embeddings::{cosine_similarity, Embedder, HashEmbeddingModel};
//!
//! let embedder = Embedder::new(HashEmbeddingModel::default());
//! let vectors = embedder
//!     .encode(&["Paris is in France".into(), "France contains Paris".into()])
//!     .await?;
//! let sim = cosine_similarity(&vectors[0].vector, &vectors[1].vector)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod embedder;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod model;
pub mod similarity;

#[cfg(feature = "openai")]
#[cfg_attr(docsrs, doc(cfg(feature = "openai")))]
pub mod openai;

// Re-exports
pub use embedder::{infer_embedding_model, Embedder};
pub use embedding::Embedding;
pub use error::{EmbeddingError, EmbeddingResult};
pub use hashing::{HashEmbeddingModel, DEFAULT_HASH_DIMENSIONS};
pub use model::{
    BoxedEmbeddingModel, EmbedInput, EmbeddingModel, EmbeddingOutput, EmbeddingSettings,
    SharedEmbeddingModel,
};
pub use similarity::{cosine_similarity, l2_norm, normalize};

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingModel;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        cosine_similarity, Embedder, Embedding, EmbeddingError, EmbeddingModel, EmbeddingOutput,
        EmbeddingResult, HashEmbeddingModel,
    };

    #[cfg(feature = "openai")]
    pub use crate::OpenAIEmbeddingModel;
}
