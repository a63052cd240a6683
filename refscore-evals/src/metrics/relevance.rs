//! Embedding-based relevance metric.

use crate::error::{EvalError, EvalResult};
use crate::metrics::MetricKind;
use refscore_embeddings::{Embedder, EmbeddingError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-pair and mean similarity for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSimilarity {
    /// Mean of `scores`, 0.0 for an empty batch.
    pub mean: f64,
    /// Clamped similarity of each (prediction, reference) pair, in input order.
    pub scores: Vec<f64>,
}

/// Scores semantic similarity with a sentence-embedding model.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    embedder: Embedder,
}

impl RelevanceScorer {
    /// Create a scorer on top of an embedder.
    pub fn new(embedder: Embedder) -> Self {
        Self { embedder }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Cosine similarity of prediction and reference embeddings, clamped to
    /// `[0, 1]`. Negative cosine (dissimilar texts) floors at 0.0.
    pub async fn semantic_similarity(&self, prediction: &str, reference: &str) -> EvalResult<f64> {
        let texts = [prediction.to_string(), reference.to_string()];
        let embeddings = self.embedder.encode(&texts).await.map_err(computation_error)?;
        pair_similarity(0, &embeddings[0].vector, &embeddings[1].vector)
    }

    /// Score every pair with one model invocation.
    ///
    /// Predictions and references are encoded together; embedding `i` of the
    /// prediction block is paired with embedding `i` of the reference block.
    pub async fn batch_semantic_similarity(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> EvalResult<BatchSimilarity> {
        if predictions.len() != references.len() {
            return Err(EvalError::ShapeMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }
        if predictions.is_empty() {
            return Ok(BatchSimilarity {
                mean: 0.0,
                scores: Vec::new(),
            });
        }

        let texts: Vec<String> = predictions.iter().chain(references).cloned().collect();
        let embeddings = self.embedder.encode(&texts).await.map_err(computation_error)?;
        let (pred_block, ref_block) = embeddings.split_at(predictions.len());

        let scores = pred_block
            .iter()
            .zip(ref_block)
            .enumerate()
            .map(|(i, (p, r))| pair_similarity(i, &p.vector, &r.vector))
            .collect::<EvalResult<Vec<f64>>>()?;

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        debug!(
            model = %self.model_name(),
            pairs = scores.len(),
            mean,
            "Computed batch semantic similarity"
        );

        Ok(BatchSimilarity { mean, scores })
    }
}

// `clamp` passes NaN through, so non-finite cosines are rejected first.
fn pair_similarity(index: usize, a: &[f32], b: &[f32]) -> EvalResult<f64> {
    let cosine = refscore_embeddings::cosine_similarity(a, b).map_err(computation_error)?;
    if !cosine.is_finite() {
        return Err(computation_error(EmbeddingError::NonFinite { index }));
    }
    Ok(cosine.clamp(0.0, 1.0))
}

fn computation_error(err: EmbeddingError) -> EvalError {
    EvalError::metric_computation(MetricKind::SemanticSimilarity.name(), err)
}
