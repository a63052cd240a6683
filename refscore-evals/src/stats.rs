//! Summary statistics over per-sample scores.

use crate::metrics::OVERALL_SCORE;
use crate::result::SampleResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mean, population standard deviation, min and max of a score column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl SummaryStats {
    /// Compute statistics, or `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
        })
    }

    fn insert_into(&self, prefix: &str, aggregate: &mut IndexMap<String, f64>) {
        aggregate.insert(format!("{prefix}_mean"), self.mean);
        aggregate.insert(format!("{prefix}_std"), self.std);
        aggregate.insert(format!("{prefix}_min"), self.min);
        aggregate.insert(format!("{prefix}_max"), self.max);
    }
}

/// Build the flat aggregate map for a batch.
///
/// Metrics appear in first-seen order across samples, each with
/// `_mean`, `_std`, `_min` and `_max` entries computed over the samples that
/// have it. `overall_*` entries come last. No samples, no entries.
pub fn aggregate(samples: &[SampleResult]) -> IndexMap<String, f64> {
    let mut columns: IndexMap<&str, Vec<f64>> = IndexMap::new();
    for sample in samples {
        for (name, score) in sample.scores() {
            if name != OVERALL_SCORE {
                columns.entry(name.as_str()).or_default().push(*score);
            }
        }
    }

    let mut aggregate = IndexMap::new();
    for (name, values) in &columns {
        if let Some(stats) = SummaryStats::from_values(values) {
            stats.insert_into(name, &mut aggregate);
        }
    }

    let overall: Vec<f64> = samples.iter().map(SampleResult::overall_score).collect();
    if let Some(stats) = SummaryStats::from_values(&overall) {
        stats.insert_into("overall", &mut aggregate);
    }

    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(scores: &[(&str, f64)]) -> SampleResult {
        let scores: IndexMap<String, f64> =
            scores.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let overall = scores.get("exact_match").copied().unwrap_or(0.0);
        SampleResult::new(None, "p", "r", scores, overall)
    }

    #[test]
    fn test_population_std() {
        let stats = SummaryStats::from_values(&[1.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        assert!((stats.mean - 0.6).abs() < 1e-12);
        assert!((stats.std - 0.4898979485566356).abs() < 1e-12);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let stats = SummaryStats::from_values(&[0.42]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, 0.42);
        assert_eq!(stats.max, 0.42);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(SummaryStats::from_values(&[]), None);
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_keys_in_first_seen_order() {
        let samples = vec![
            sample(&[("exact_match", 1.0), ("keyword_match", 0.5)]),
            sample(&[("exact_match", 0.0), ("fuzzy_match", 1.0)]),
        ];

        let keys: Vec<_> = aggregate(&samples).keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "exact_match_mean",
                "exact_match_std",
                "exact_match_min",
                "exact_match_max",
                "keyword_match_mean",
                "keyword_match_std",
                "keyword_match_min",
                "keyword_match_max",
                "fuzzy_match_mean",
                "fuzzy_match_std",
                "fuzzy_match_min",
                "fuzzy_match_max",
                "overall_mean",
                "overall_std",
                "overall_min",
                "overall_max",
            ]
        );
    }

    #[test]
    fn test_missing_metric_excluded_not_zeroed() {
        let samples = vec![
            sample(&[("exact_match", 1.0), ("keyword_match", 0.5)]),
            sample(&[("exact_match", 0.0)]),
        ];

        let aggregate = aggregate(&samples);
        assert_eq!(aggregate["keyword_match_mean"], 0.5);
        assert_eq!(aggregate["keyword_match_std"], 0.0);
        assert_eq!(aggregate["exact_match_mean"], 0.5);
        assert_eq!(aggregate["overall_mean"], 0.5);
    }
}
