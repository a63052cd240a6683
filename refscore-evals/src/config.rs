//! Evaluation configuration.
//!
//! A configuration file holds three sections: `metrics` (per-metric
//! `{enabled, ...params}`), `weights` and `output`. User documents are
//! deep-merged onto [`EvaluationConfig::default`], so a file only needs the
//! keys it changes.

use crate::error::{EvalError, EvalResult};
use crate::metrics::{MetricConfig, MetricKind, DEFAULT_FUZZY_THRESHOLD, DEFAULT_MODEL_NAME};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENABLED_KEY: &str = "enabled";

/// Weight per metric name, used to combine scores into `overall_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(IndexMap<String, f64>);

impl Default for WeightTable {
    fn default() -> Self {
        Self::empty()
            .with_weight(MetricKind::ExactMatch.name(), 0.3)
            .with_weight(MetricKind::FuzzyMatch.name(), 0.2)
            .with_weight(MetricKind::KeywordMatch.name(), 0.2)
            .with_weight(MetricKind::SemanticSimilarity.name(), 0.3)
    }
}

impl WeightTable {
    /// A table with no weights; every overall score is 0.0.
    pub fn empty() -> Self {
        Self(IndexMap::new())
    }

    /// Set the weight for a metric.
    pub fn with_weight(mut self, metric: impl Into<String>, weight: f64) -> Self {
        self.0.insert(metric.into(), weight);
        self
    }

    /// Validate and wrap a name-to-weight map.
    pub fn from_map(weights: IndexMap<String, f64>) -> EvalResult<Self> {
        let table = Self(weights);
        table.validate()?;
        Ok(table)
    }

    /// Weights must be finite and non-negative.
    pub fn validate(&self) -> EvalResult<()> {
        for (name, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(EvalError::configuration(
                    name.as_str(),
                    format!("weight must be a finite non-negative number, got {weight}"),
                ));
            }
        }
        Ok(())
    }

    /// Weight for a metric, if any.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.0.get(metric).copied()
    }

    /// Iterate `(metric, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of weighted metrics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weighted average of `scores` over the metrics present in both.
    ///
    /// Weights for metrics missing from `scores` are left out of numerator
    /// and denominator. No overlap, or an overlap with zero total weight,
    /// gives 0.0.
    pub fn overall(&self, scores: &IndexMap<String, f64>) -> f64 {
        let (weighted, total) = self
            .iter()
            .filter_map(|(name, weight)| scores.get(name).map(|score| (score * weight, weight)))
            .fold((0.0, 0.0), |(ws, tw), (s, w)| (ws + s, tw + w));

        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }
}

/// Where and whether to write results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Persist the batch result as JSON.
    pub save_results: bool,
    /// Directory for results and reports.
    pub output_dir: PathBuf,
    /// Render a markdown report.
    pub generate_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_results: true,
            output_dir: PathBuf::from("data/results"),
            generate_report: true,
        }
    }
}

/// Full evaluation configuration as read from a file.
///
/// `metrics` keeps the raw per-metric objects (including `enabled`) so the
/// document round-trips through [`save`](Self::save). Use
/// [`metrics_config`](Self::metrics_config) and [`weights`](Self::weights)
/// to get the validated forms the evaluator consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Per-metric `{enabled, ...params}` objects.
    #[serde(default)]
    pub metrics: IndexMap<String, Value>,
    /// Metric weights for the overall score.
    #[serde(default)]
    pub weights: IndexMap<String, f64>,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        let metrics = IndexMap::from([
            (
                MetricKind::ExactMatch.name().to_string(),
                json!({ "enabled": true, "normalize": true }),
            ),
            (
                MetricKind::FuzzyMatch.name().to_string(),
                json!({ "enabled": true, "threshold": DEFAULT_FUZZY_THRESHOLD }),
            ),
            (
                MetricKind::KeywordMatch.name().to_string(),
                json!({ "enabled": true }),
            ),
            (
                MetricKind::SemanticSimilarity.name().to_string(),
                json!({ "enabled": true, "model_name": DEFAULT_MODEL_NAME }),
            ),
        ]);

        Self {
            metrics,
            weights: WeightTable::default().0,
            output: OutputConfig::default(),
        }
    }
}

impl EvaluationConfig {
    /// Load a YAML (`.yaml`/`.yml`) or JSON file and merge it onto the defaults.
    pub fn load(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EvalError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = if is_yaml(path) {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        info!(path = %path.display(), "Loaded evaluation config");
        Ok(config)
    }

    /// Parse a YAML document and merge it onto the defaults.
    pub fn from_yaml_str(yaml: &str) -> EvalResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let user: Value = serde_yaml::from_str(yaml)?;
        Self::merged_with(user)
    }

    /// Parse a JSON document and merge it onto the defaults.
    pub fn from_json_str(json: &str) -> EvalResult<Self> {
        let user: Value = serde_json::from_str(json)?;
        Self::merged_with(user)
    }

    fn merged_with(user: Value) -> EvalResult<Self> {
        let mut base = serde_json::to_value(Self::default())?;
        match user {
            Value::Null => {}
            Value::Object(_) => merge_values(&mut base, user),
            _ => {
                return Err(EvalError::configuration(
                    "config",
                    "top level must be a mapping",
                ))
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Enabled metrics with their parameters.
    ///
    /// A metric is kept unless its `enabled` flag is `false`; the flag itself
    /// is dropped. Unknown metric names are ignored.
    pub fn metrics_config(&self) -> EvalResult<MetricConfig> {
        let mut enabled = Map::new();

        for (name, entry) in &self.metrics {
            let params = match entry {
                Value::Null => Value::Null,
                Value::Object(object) => {
                    match object.get(ENABLED_KEY) {
                        None | Some(Value::Bool(true)) => {}
                        Some(Value::Bool(false)) => {
                            debug!(metric = %name, "Metric disabled");
                            continue;
                        }
                        Some(other) => {
                            return Err(EvalError::configuration(
                                name.as_str(),
                                format!("'enabled' must be a boolean, got {other}"),
                            ))
                        }
                    }
                    let mut params = object.clone();
                    params.remove(ENABLED_KEY);
                    Value::Object(params)
                }
                other => {
                    if name.parse::<MetricKind>().is_err() {
                        continue;
                    }
                    return Err(EvalError::configuration(
                        name.as_str(),
                        format!("expected a mapping of parameters, got {other}"),
                    ));
                }
            };
            enabled.insert(name.clone(), params);
        }

        MetricConfig::from_value(&Value::Object(enabled))
    }

    /// Validated metric weights.
    pub fn weights(&self) -> EvalResult<WeightTable> {
        WeightTable::from_map(self.weights.clone())
    }

    /// Turn a metric on or off, keeping its parameters.
    pub fn set_enabled(&mut self, kind: MetricKind, enabled: bool) {
        let entry = self
            .metrics
            .entry(kind.name().to_string())
            .or_insert_with(|| json!({}));
        if !entry.is_object() {
            *entry = json!({});
        }
        if let Value::Object(object) = entry {
            object.insert(ENABLED_KEY.to_string(), Value::Bool(enabled));
        }
    }

    /// Set the embedding model used for semantic similarity.
    pub fn set_model_name(&mut self, model_name: impl Into<String>) {
        let entry = self
            .metrics
            .entry(MetricKind::SemanticSimilarity.name().to_string())
            .or_insert_with(|| json!({ "enabled": true }));
        if !entry.is_object() {
            *entry = json!({ "enabled": true });
        }
        if let Value::Object(object) = entry {
            object.insert("model_name".to_string(), Value::String(model_name.into()));
        }
    }

    /// Write the configuration as YAML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> EvalResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        info!(path = %path.display(), "Saved evaluation config");
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"))
        .unwrap_or(false)
}

/// Recursively merge `overlay` into `base`. Maps merge key by key; any other
/// value replaces what was there.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value)
                    }
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
