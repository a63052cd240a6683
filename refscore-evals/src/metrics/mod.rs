//! The closed set of metrics and their parameters.
//!
//! Each metric is a plain function keyed by [`MetricKind`]. A
//! [`MetricConfig`] says which metrics are active and with what parameters;
//! [`MetricConfig::active`] yields them in the fixed evaluation order.

pub mod correctness;
pub mod relevance;

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key under which each sample's weighted score is stored.
pub const OVERALL_SCORE: &str = "overall_score";

/// Default sentence-embedding model for semantic similarity.
pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Default fuzzy match threshold.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Supported metrics, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Binary equality, optionally on normalized text.
    ExactMatch,
    /// Binary edit-distance similarity against a threshold.
    FuzzyMatch,
    /// Fraction of reference keywords found in the prediction.
    KeywordMatch,
    /// Clamped cosine similarity of sentence embeddings.
    SemanticSimilarity,
}

impl MetricKind {
    /// All metrics in evaluation order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::ExactMatch,
        MetricKind::FuzzyMatch,
        MetricKind::KeywordMatch,
        MetricKind::SemanticSimilarity,
    ];

    /// Name used in configs, score maps and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::FuzzyMatch => "fuzzy_match",
            Self::KeywordMatch => "keyword_match",
            Self::SemanticSimilarity => "semantic_similarity",
        }
    }

    /// Whether scoring needs an embedding model.
    pub fn requires_model(&self) -> bool {
        matches!(self, Self::SemanticSimilarity)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EvalError::configuration(s, "unknown metric"))
    }
}

/// Parameters for `exact_match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactMatchParams {
    /// Compare normalized text instead of trimmed raw text.
    pub normalize: bool,
}

impl Default for ExactMatchParams {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// Parameters for `fuzzy_match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyMatchParams {
    /// Minimum similarity in `[0, 1]` for a match.
    pub threshold: f64,
}

impl Default for FuzzyMatchParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Parameters for `keyword_match`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordMatchParams {
    /// Keywords to look for; derived from each reference when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_keywords: Option<Vec<String>>,
}

/// Parameters for `semantic_similarity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticSimilarityParams {
    /// Embedding model handle, resolved by `refscore_embeddings::infer_embedding_model`.
    pub model_name: String,
}

impl Default for SemanticSimilarityParams {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// Active metrics and their parameters. A metric is active iff its field is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// `exact_match` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<ExactMatchParams>,
    /// `fuzzy_match` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_match: Option<FuzzyMatchParams>,
    /// `keyword_match` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_match: Option<KeywordMatchParams>,
    /// `semantic_similarity` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_similarity: Option<SemanticSimilarityParams>,
}

/// Every metric active with default parameters.
impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            exact_match: Some(ExactMatchParams::default()),
            fuzzy_match: Some(FuzzyMatchParams::default()),
            keyword_match: Some(KeywordMatchParams::default()),
            semantic_similarity: Some(SemanticSimilarityParams::default()),
        }
    }
}

impl MetricConfig {
    /// No active metrics.
    pub fn empty() -> Self {
        Self {
            exact_match: None,
            fuzzy_match: None,
            keyword_match: None,
            semantic_similarity: None,
        }
    }

    /// Activate `exact_match`.
    pub fn with_exact_match(mut self, params: ExactMatchParams) -> Self {
        self.exact_match = Some(params);
        self
    }

    /// Activate `fuzzy_match`.
    pub fn with_fuzzy_match(mut self, params: FuzzyMatchParams) -> Self {
        self.fuzzy_match = Some(params);
        self
    }

    /// Activate `keyword_match`.
    pub fn with_keyword_match(mut self, params: KeywordMatchParams) -> Self {
        self.keyword_match = Some(params);
        self
    }

    /// Activate `semantic_similarity`.
    pub fn with_semantic_similarity(mut self, params: SemanticSimilarityParams) -> Self {
        self.semantic_similarity = Some(params);
        self
    }

    /// Deactivate one metric.
    pub fn without(mut self, kind: MetricKind) -> Self {
        match kind {
            MetricKind::ExactMatch => self.exact_match = None,
            MetricKind::FuzzyMatch => self.fuzzy_match = None,
            MetricKind::KeywordMatch => self.keyword_match = None,
            MetricKind::SemanticSimilarity => self.semantic_similarity = None,
        }
        self
    }

    /// Build from a mapping of metric name to parameter object.
    ///
    /// Unknown names are ignored, a `null` value means default parameters,
    /// and a malformed parameter object is a configuration error for that
    /// metric.
    pub fn from_value(value: &serde_json::Value) -> EvalResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| EvalError::configuration("metrics", "expected a mapping of metric names"))?;

        let mut config = Self::empty();
        for kind in MetricKind::ALL {
            let Some(params) = map.get(kind.name()) else {
                continue;
            };
            match kind {
                MetricKind::ExactMatch => config.exact_match = Some(parse_params(kind, params)?),
                MetricKind::FuzzyMatch => config.fuzzy_match = Some(parse_params(kind, params)?),
                MetricKind::KeywordMatch => {
                    config.keyword_match = Some(parse_params(kind, params)?)
                }
                MetricKind::SemanticSimilarity => {
                    config.semantic_similarity = Some(parse_params(kind, params)?)
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> EvalResult<()> {
        if let Some(fuzzy) = &self.fuzzy_match {
            if !fuzzy.threshold.is_finite() || !(0.0..=1.0).contains(&fuzzy.threshold) {
                return Err(EvalError::configuration(
                    MetricKind::FuzzyMatch.name(),
                    format!("threshold must be in [0, 1], got {}", fuzzy.threshold),
                ));
            }
        }
        if let Some(semantic) = &self.semantic_similarity {
            if semantic.model_name.trim().is_empty() {
                return Err(EvalError::configuration(
                    MetricKind::SemanticSimilarity.name(),
                    "model_name must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Active metrics in evaluation order.
    pub fn active(&self) -> impl Iterator<Item = ActiveMetric<'_>> {
        [
            self.exact_match.as_ref().map(ActiveMetric::ExactMatch),
            self.fuzzy_match.as_ref().map(ActiveMetric::FuzzyMatch),
            self.keyword_match.as_ref().map(ActiveMetric::KeywordMatch),
            self.semantic_similarity
                .as_ref()
                .map(ActiveMetric::SemanticSimilarity),
        ]
        .into_iter()
        .flatten()
    }

    /// Names of active metrics in evaluation order.
    pub fn names(&self) -> Vec<String> {
        self.active().map(|m| m.kind().name().to_string()).collect()
    }

    /// Whether `kind` is active.
    pub fn is_active(&self, kind: MetricKind) -> bool {
        self.active().any(|m| m.kind() == kind)
    }

    /// Whether no metric is active.
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

fn parse_params<T>(kind: MetricKind, value: &serde_json::Value) -> EvalResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| EvalError::configuration(kind.name(), e.to_string()))
}

/// One active metric with borrowed parameters.
#[derive(Debug, Clone, Copy)]
pub enum ActiveMetric<'a> {
    /// `exact_match`.
    ExactMatch(&'a ExactMatchParams),
    /// `fuzzy_match`.
    FuzzyMatch(&'a FuzzyMatchParams),
    /// `keyword_match`.
    KeywordMatch(&'a KeywordMatchParams),
    /// `semantic_similarity`.
    SemanticSimilarity(&'a SemanticSimilarityParams),
}

impl ActiveMetric<'_> {
    /// The metric's kind.
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::ExactMatch(_) => MetricKind::ExactMatch,
            Self::FuzzyMatch(_) => MetricKind::FuzzyMatch,
            Self::KeywordMatch(_) => MetricKind::KeywordMatch,
            Self::SemanticSimilarity(_) => MetricKind::SemanticSimilarity,
        }
    }

    /// Score a pair with a lexical metric. `None` for metrics that need a model.
    pub fn score_lexical(&self, prediction: &str, reference: &str) -> Option<f64> {
        match self {
            Self::ExactMatch(p) => Some(correctness::exact_match(prediction, reference, p.normalize)),
            Self::FuzzyMatch(p) => Some(correctness::fuzzy_match(prediction, reference, p.threshold)),
            Self::KeywordMatch(p) => Some(correctness::keyword_match(
                prediction,
                reference,
                p.required_keywords.as_deref(),
            )),
            Self::SemanticSimilarity(_) => None,
        }
    }
}
