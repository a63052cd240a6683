//! Sample and batch evaluation.

use crate::config::{EvaluationConfig, WeightTable};
use crate::error::{EvalError, EvalResult};
use crate::metrics::relevance::RelevanceScorer;
use crate::metrics::{ActiveMetric, MetricConfig, MetricKind};
use crate::result::{BatchResult, SampleResult};
use indexmap::IndexMap;
use refscore_embeddings::Embedder;
use tracing::{debug, info};

/// Scores predictions against references with a fixed set of metrics.
///
/// Configuration is resolved once at construction; evaluation methods take
/// `&self` and may be called concurrently.
///
/// # Example
///
/// ```ignore
/// use refscore_evals::{Evaluator, MetricConfig, WeightTable};
/// use refscore_evals::metrics::MetricKind;
///
/// let metrics = MetricConfig::default().without(MetricKind::SemanticSimilarity);
/// let evaluator = Evaluator::new(metrics, WeightTable::default())?;
///
/// let result = evaluator.evaluate_single("Paris", "paris", None).await?;
/// assert_eq!(result.overall_score(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    metrics: MetricConfig,
    weights: WeightTable,
    relevance: Option<RelevanceScorer>,
}

impl Evaluator {
    /// Create an evaluator, resolving the semantic model by its configured
    /// name when semantic similarity is active.
    pub fn new(metrics: MetricConfig, weights: WeightTable) -> EvalResult<Self> {
        let relevance = match &metrics.semantic_similarity {
            Some(params) => {
                let embedder = Embedder::from_name(&params.model_name).map_err(|e| {
                    EvalError::configuration(MetricKind::SemanticSimilarity.name(), e.to_string())
                })?;
                Some(RelevanceScorer::new(embedder))
            }
            None => None,
        };
        Self::build(metrics, weights, relevance)
    }

    /// Create an evaluator that scores semantic similarity with `embedder`
    /// instead of resolving a model by name.
    pub fn with_embedder(
        metrics: MetricConfig,
        weights: WeightTable,
        embedder: Embedder,
    ) -> EvalResult<Self> {
        Self::build(metrics, weights, Some(RelevanceScorer::new(embedder)))
    }

    /// Create an evaluator from a loaded configuration.
    pub fn from_config(config: &EvaluationConfig) -> EvalResult<Self> {
        Self::new(config.metrics_config()?, config.weights()?)
    }

    fn build(
        metrics: MetricConfig,
        weights: WeightTable,
        relevance: Option<RelevanceScorer>,
    ) -> EvalResult<Self> {
        metrics.validate()?;
        weights.validate()?;

        if metrics.is_active(MetricKind::SemanticSimilarity) && relevance.is_none() {
            return Err(EvalError::configuration(
                MetricKind::SemanticSimilarity.name(),
                "no embedding model available",
            ));
        }

        debug!(
            metrics = ?metrics.names(),
            model = relevance.as_ref().map(RelevanceScorer::model_name),
            "Created evaluator"
        );

        Ok(Self {
            metrics,
            weights,
            relevance,
        })
    }

    /// Active metrics.
    pub fn metrics(&self) -> &MetricConfig {
        &self.metrics
    }

    /// Weights for the overall score.
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Semantic scorer, when semantic similarity is active or an embedder
    /// was supplied.
    pub fn relevance(&self) -> Option<&RelevanceScorer> {
        self.relevance.as_ref()
    }

    /// Score one pair with every active metric plus `overall_score`.
    pub async fn evaluate_single(
        &self,
        prediction: &str,
        reference: &str,
        sample_id: Option<&str>,
    ) -> EvalResult<SampleResult> {
        let semantic = match self.semantic_scorer()? {
            Some(scorer) => Some(scorer.semantic_similarity(prediction, reference).await?),
            None => None,
        };

        Ok(self.score_sample(
            prediction,
            reference,
            sample_id.map(str::to_string),
            semantic,
        ))
    }

    /// Score every pair and aggregate.
    ///
    /// Semantic similarity, when active, is computed for the whole batch with
    /// one model call before the per-sample pass. Missing ids become
    /// `sample_{i}`. Results keep input order.
    pub async fn evaluate_batch(
        &self,
        predictions: &[String],
        references: &[String],
        sample_ids: Option<&[String]>,
    ) -> EvalResult<BatchResult> {
        if predictions.len() != references.len() {
            return Err(EvalError::ShapeMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }
        if let Some(ids) = sample_ids {
            if ids.len() != predictions.len() {
                return Err(EvalError::ShapeMismatch {
                    predictions: predictions.len(),
                    references: ids.len(),
                });
            }
        }

        let metrics_used = self.metrics.names();
        info!(
            samples = predictions.len(),
            metrics = ?metrics_used,
            "Starting batch evaluation"
        );

        let semantic_scores = match self.semantic_scorer()? {
            Some(scorer) => Some(
                scorer
                    .batch_semantic_similarity(predictions, references)
                    .await?
                    .scores,
            ),
            None => None,
        };

        let per_sample: Vec<SampleResult> = predictions
            .iter()
            .zip(references)
            .enumerate()
            .map(|(i, (prediction, reference))| {
                let sample_id = sample_ids
                    .map(|ids| ids[i].clone())
                    .unwrap_or_else(|| format!("sample_{i}"));
                let semantic = semantic_scores.as_ref().map(|scores| scores[i]);
                let result = self.score_sample(prediction, reference, Some(sample_id), semantic);
                debug!(
                    sample_id = result.sample_id(),
                    scores = ?result.scores(),
                    "Scored sample"
                );
                result
            })
            .collect();

        let batch = BatchResult::new(per_sample, metrics_used);
        info!(
            total = batch.total_samples(),
            overall_mean = batch.overall_mean(),
            "Batch evaluation complete"
        );
        Ok(batch)
    }

    fn semantic_scorer(&self) -> EvalResult<Option<&RelevanceScorer>> {
        if !self.metrics.is_active(MetricKind::SemanticSimilarity) {
            return Ok(None);
        }
        self.relevance.as_ref().map(Some).ok_or_else(|| {
            EvalError::configuration(
                MetricKind::SemanticSimilarity.name(),
                "no embedding model available",
            )
        })
    }

    fn score_sample(
        &self,
        prediction: &str,
        reference: &str,
        sample_id: Option<String>,
        semantic: Option<f64>,
    ) -> SampleResult {
        let mut scores = IndexMap::new();
        for metric in self.metrics.active() {
            let score = match metric {
                ActiveMetric::SemanticSimilarity(_) => semantic,
                lexical => lexical.score_lexical(prediction, reference),
            };
            if let Some(score) = score {
                scores.insert(metric.kind().name().to_string(), score);
            }
        }

        let overall = self.weights.overall(&scores);
        SampleResult::new(sample_id, prediction, reference, scores, overall)
    }
}
