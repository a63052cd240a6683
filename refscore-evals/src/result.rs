//! Evaluation result types.

use crate::error::EvalResult;
use crate::metrics::OVERALL_SCORE;
use crate::stats;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Scores for one (prediction, reference) pair.
///
/// `scores` holds each computed metric under its name plus
/// `overall_score`. The record is never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    sample_id: Option<String>,
    prediction: String,
    reference: String,
    scores: IndexMap<String, f64>,
}

impl SampleResult {
    /// Create a result, storing `overall` under `overall_score` after the
    /// metric scores.
    pub fn new(
        sample_id: Option<String>,
        prediction: impl Into<String>,
        reference: impl Into<String>,
        mut scores: IndexMap<String, f64>,
        overall: f64,
    ) -> Self {
        scores.shift_remove(OVERALL_SCORE);
        scores.insert(OVERALL_SCORE.to_string(), overall);
        Self {
            sample_id,
            prediction: prediction.into(),
            reference: reference.into(),
            scores,
        }
    }

    /// Caller-supplied or synthesized id.
    pub fn sample_id(&self) -> Option<&str> {
        self.sample_id.as_deref()
    }

    /// The evaluated text.
    pub fn prediction(&self) -> &str {
        &self.prediction
    }

    /// The ground-truth text.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// All scores, metrics first, `overall_score` last.
    pub fn scores(&self) -> &IndexMap<String, f64> {
        &self.scores
    }

    /// Score for one metric.
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores.get(metric).copied()
    }

    /// Weighted overall score.
    pub fn overall_score(&self) -> f64 {
        self.score(OVERALL_SCORE).unwrap_or(0.0)
    }

    /// Metric scores without `overall_score`.
    pub fn metric_scores(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores
            .iter()
            .filter(|(name, _)| name.as_str() != OVERALL_SCORE)
            .map(|(name, score)| (name.as_str(), *score))
    }
}

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// When the batch finished, UTC.
    pub timestamp: DateTime<Utc>,
    /// Number of samples evaluated.
    pub total_samples: usize,
    /// Active metrics in evaluation order.
    pub metrics_used: Vec<String>,
}

/// Result of a batch evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    metadata: BatchMetadata,
    per_sample: Vec<SampleResult>,
    aggregate: IndexMap<String, f64>,
}

impl BatchResult {
    /// Assemble a batch result, computing aggregates and stamping the time.
    pub fn new(per_sample: Vec<SampleResult>, metrics_used: Vec<String>) -> Self {
        let aggregate = stats::aggregate(&per_sample);
        Self {
            metadata: BatchMetadata {
                timestamp: Utc::now(),
                total_samples: per_sample.len(),
                metrics_used,
            },
            per_sample,
            aggregate,
        }
    }

    /// Run metadata.
    pub fn metadata(&self) -> &BatchMetadata {
        &self.metadata
    }

    /// Per-sample results in input order.
    pub fn per_sample(&self) -> &[SampleResult] {
        &self.per_sample
    }

    /// Flat `{metric}_mean/_std/_min/_max` map.
    pub fn aggregate(&self) -> &IndexMap<String, f64> {
        &self.aggregate
    }

    /// Number of samples.
    pub fn total_samples(&self) -> usize {
        self.metadata.total_samples
    }

    /// Whether the batch had no samples.
    pub fn is_empty(&self) -> bool {
        self.per_sample.is_empty()
    }

    /// Mean overall score, if any samples were evaluated.
    pub fn overall_mean(&self) -> Option<f64> {
        self.aggregate.get("overall_mean").copied()
    }

    /// Samples sorted by overall score, best first. Ties keep input order.
    pub fn ranked(&self) -> Vec<&SampleResult> {
        let mut ranked: Vec<&SampleResult> = self.per_sample.iter().collect();
        ranked.sort_by(|a, b| {
            b.overall_score()
                .partial_cmp(&a.overall_score())
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> EvalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> EvalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(id: &str, overall: f64) -> SampleResult {
        let scores = IndexMap::from([("exact_match".to_string(), overall)]);
        SampleResult::new(Some(id.to_string()), "p", "r", scores, overall)
    }

    #[test]
    fn test_overall_score_is_last() {
        let result = sample("a", 1.0);
        let keys: Vec<_> = result.scores().keys().cloned().collect();
        assert_eq!(keys, vec!["exact_match", OVERALL_SCORE]);
        assert_eq!(result.metric_scores().count(), 1);
    }

    #[test]
    fn test_new_replaces_stale_overall() {
        let scores = IndexMap::from([
            (OVERALL_SCORE.to_string(), 0.1),
            ("fuzzy_match".to_string(), 1.0),
        ]);
        let result = SampleResult::new(None, "p", "r", scores, 0.9);
        assert_eq!(result.overall_score(), 0.9);
        assert_eq!(result.scores().len(), 2);
        assert_eq!(result.scores().get_index(1).map(|(k, _)| k.as_str()), Some(OVERALL_SCORE));
    }

    #[test]
    fn test_batch_counts() {
        let batch = BatchResult::new(
            vec![sample("a", 1.0), sample("b", 0.0)],
            vec!["exact_match".to_string()],
        );
        assert_eq!(batch.total_samples(), 2);
        assert_eq!(batch.per_sample().len(), 2);
        assert_eq!(batch.overall_mean(), Some(0.5));
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchResult::new(Vec::new(), Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.total_samples(), 0);
        assert!(batch.aggregate().is_empty());
        assert_eq!(batch.overall_mean(), None);
    }

    #[test]
    fn test_ranked_is_stable() {
        let batch = BatchResult::new(
            vec![sample("a", 0.5), sample("b", 1.0), sample("c", 0.5)],
            vec!["exact_match".to_string()],
        );
        let ids: Vec<_> = batch.ranked().iter().filter_map(|s| s.sample_id()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_json_shape() {
        let batch = BatchResult::new(vec![sample("a", 1.0)], vec!["exact_match".to_string()]);
        let value: serde_json::Value = serde_json::from_str(&batch.to_json().unwrap()).unwrap();

        assert_eq!(value["metadata"]["total_samples"], 1);
        assert_eq!(value["metadata"]["metrics_used"][0], "exact_match");
        assert_eq!(value["per_sample"][0]["sample_id"], "a");
        assert_eq!(value["per_sample"][0]["scores"][OVERALL_SCORE], 1.0);
        assert_eq!(value["aggregate"]["overall_mean"], 1.0);
        assert!(value["metadata"]["timestamp"]
            .as_str()
            .is_some_and(|ts| ts.ends_with('Z')));
    }

    #[test]
    fn test_json_roundtrip_preserves_floats() {
        let scores = IndexMap::from([("semantic_similarity".to_string(), 0.1 + 0.2)]);
        let batch = BatchResult::new(
            vec![SampleResult::new(Some("x".into()), "p", "r", scores, 1.0 / 3.0)],
            vec!["semantic_similarity".to_string()],
        );

        let restored = BatchResult::from_json(&batch.to_json().unwrap()).unwrap();
        assert_eq!(restored, batch);
    }
}
