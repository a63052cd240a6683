//! # refscore-evals
//!
//! Reference-based scoring of generated text.
//!
//! Each prediction is compared to a ground-truth reference with a set of
//! metrics, the per-metric scores are combined into a weighted
//! `overall_score`, and batches are summarized with mean, standard deviation,
//! min and max per metric.
//!
//! ## Core Concepts
//!
//! - **[`MetricConfig`]**: Which metrics run, with what parameters
//! - **[`WeightTable`]**: How metric scores combine into `overall_score`
//! - **[`Evaluator`]**: Scores single pairs and whole batches
//! - **[`SampleResult`] / [`BatchResult`]**: Immutable results
//! - **[`ResultStore`]**: Persistence of batch results
//!
//! ## Metrics
//!
//! - **`exact_match`**: equality of [`normalize`]d (or trimmed) text
//! - **`fuzzy_match`**: Levenshtein similarity against a threshold
//! - **`keyword_match`**: fraction of reference keywords found in the prediction
//! - **`semantic_similarity`**: clamped cosine similarity of sentence embeddings
//!
//! ## Example
//!
//! ```ignore
//! use refscore_evals::{EvaluationConfig, Evaluator, ReportGenerator};
//!
//! let config = EvaluationConfig::load("config.yaml")?;
//! let evaluator = Evaluator::from_config(&config)?;
//!
//! let predictions = vec!["The capital of France is Paris.".to_string()];
//! let references = vec!["Paris is the capital of France.".to_string()];
//! let batch = evaluator.evaluate_batch(&predictions, &references, None).await?;
//!
//! println!("{}", ReportGenerator::new(&batch).summary_text());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod normalize;
pub mod report;
pub mod result;
pub mod stats;
pub mod store;

// Re-exports
pub use config::{EvaluationConfig, OutputConfig, WeightTable};
pub use dataset::{Dataset, Sample};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use metrics::correctness::{exact_match, fuzzy_match, keyword_match, levenshtein};
pub use metrics::relevance::{BatchSimilarity, RelevanceScorer};
pub use metrics::{MetricConfig, MetricKind, OVERALL_SCORE};
pub use normalize::normalize;
pub use report::ReportGenerator;
pub use result::{BatchMetadata, BatchResult, SampleResult};
pub use stats::SummaryStats;
pub use store::{JsonResultStore, ResultStore};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BatchResult, Dataset, EvalError, EvalResult, EvaluationConfig, Evaluator,
        JsonResultStore, MetricConfig, MetricKind, ReportGenerator, ResultStore, SampleResult,
        WeightTable,
    };
}
