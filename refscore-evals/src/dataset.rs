//! Datasets of (prediction, reference) pairs.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One pair to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Optional id; filled as `sample_{i}` when converting to columns.
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<String>,
    /// Model output.
    pub prediction: String,
    /// Ground truth. Also read from `reference_answer`.
    #[serde(alias = "reference_answer")]
    pub reference: String,
    /// The prompt that produced the prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Free-form grouping label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Sample {
    /// Create a sample without an id.
    pub fn new(prediction: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            sample_id: None,
            prediction: prediction.into(),
            reference: reference.into(),
            question: None,
            category: None,
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.sample_id = Some(id.into());
        self
    }
}

/// Accepted document shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    List(Vec<Sample>),
    Wrapped {
        #[serde(default)]
        name: Option<String>,
        samples: Vec<Sample>,
    },
    Single(Sample),
}

impl From<DatasetDocument> for Dataset {
    fn from(doc: DatasetDocument) -> Self {
        match doc {
            DatasetDocument::List(samples) => Dataset::new(samples),
            DatasetDocument::Wrapped { name, samples } => Dataset { name, samples },
            DatasetDocument::Single(sample) => Dataset::new(vec![sample]),
        }
    }
}

/// A named list of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Samples in evaluation order.
    pub samples: Vec<Sample>,
}

impl Dataset {
    /// Create an unnamed dataset.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            name: None,
            samples,
        }
    }

    /// Set the dataset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build from parallel columns.
    pub fn from_pairs(predictions: Vec<String>, references: Vec<String>) -> EvalResult<Self> {
        if predictions.len() != references.len() {
            return Err(EvalError::ShapeMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }
        let samples = predictions
            .into_iter()
            .zip(references)
            .map(|(p, r)| Sample::new(p, r))
            .collect();
        Ok(Self::new(samples))
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load by extension: `.json`, `.jsonl`, `.yaml` or `.yml`.
    pub fn load(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let dataset = match ext.as_deref() {
            Some("json") => Self::from_json(path)?,
            Some("jsonl") => Self::from_jsonl(path)?,
            Some("yaml" | "yml") => Self::from_yaml(path)?,
            _ => {
                return Err(EvalError::dataset(format!(
                    "unsupported dataset format: {}",
                    path.display()
                )))
            }
        };

        info!(path = %path.display(), samples = dataset.len(), "Loaded dataset");
        Ok(dataset)
    }

    /// Load from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse JSON: an array of samples, `{name?, samples}`, or one sample.
    pub fn from_json_str(content: &str) -> EvalResult<Self> {
        serde_json::from_str::<DatasetDocument>(content)
            .map(Self::from)
            .map_err(|e| EvalError::dataset(format!("invalid JSON dataset: {e}")))
    }

    /// Load from YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML with the same shapes as JSON.
    pub fn from_yaml_str(content: &str) -> EvalResult<Self> {
        serde_yaml::from_str::<DatasetDocument>(content)
            .map(Self::from)
            .map_err(|e| EvalError::dataset(format!("invalid YAML dataset: {e}")))
    }

    /// Load from JSON Lines file.
    pub fn from_jsonl(path: impl AsRef<Path>) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_jsonl_str(&content)
    }

    /// Parse one sample per non-blank line.
    pub fn from_jsonl_str(content: &str) -> EvalResult<Self> {
        let samples = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Sample>(line)
                    .map_err(|e| EvalError::dataset(format!("line {}: {e}", i + 1)))
            })
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(Self::new(samples))
    }

    /// Split into `(predictions, references, sample_ids)`, filling missing
    /// ids as `sample_{i}`.
    pub fn into_columns(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut predictions = Vec::with_capacity(self.samples.len());
        let mut references = Vec::with_capacity(self.samples.len());
        let mut ids = Vec::with_capacity(self.samples.len());

        for (i, sample) in self.samples.into_iter().enumerate() {
            ids.push(sample.sample_id.unwrap_or_else(|| format!("sample_{i}")));
            predictions.push(sample.prediction);
            references.push(sample.reference);
        }

        (predictions, references, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_array() {
        let dataset = Dataset::from_json_str(
            r#"[
                {"sample_id": "q1", "prediction": "Paris", "reference": "Paris"},
                {"prediction": "H₂O", "reference_answer": "H₂O", "question": "Formula?"}
            ]"#,
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.samples[0].sample_id.as_deref(), Some("q1"));
        assert_eq!(dataset.samples[1].reference, "H₂O");
        assert_eq!(dataset.samples[1].question.as_deref(), Some("Formula?"));
    }

    #[test]
    fn test_json_wrapped() {
        let dataset = Dataset::from_json_str(
            r#"{"name": "geo", "samples": [{"prediction": "a", "reference": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(dataset.name.as_deref(), Some("geo"));
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_json_single_object() {
        let dataset =
            Dataset::from_json_str(r#"{"id": "only", "prediction": "a", "reference": "b"}"#)
                .unwrap();
        assert_eq!(dataset.samples, vec![Sample::new("a", "b").with_id("only")]);
    }

    #[test]
    fn test_json_missing_reference() {
        let err = Dataset::from_json_str(r#"[{"prediction": "a"}]"#).unwrap_err();
        assert!(matches!(err, EvalError::Dataset(_)));
    }

    #[test]
    fn test_yaml() {
        let dataset = Dataset::from_yaml_str(
            "name: demo\nsamples:\n  - prediction: Water boils at 100°C\n    reference: 100°C\n",
        )
        .unwrap();
        assert_eq!(dataset.name.as_deref(), Some("demo"));
        assert_eq!(dataset.samples[0].prediction, "Water boils at 100°C");
    }

    #[test]
    fn test_jsonl_skips_blank_lines() {
        let dataset = Dataset::from_jsonl_str(
            "{\"prediction\": \"a\", \"reference\": \"a\"}\n\n{\"prediction\": \"b\", \"reference\": \"c\"}\n",
        )
        .unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_jsonl_reports_line() {
        let err = Dataset::from_jsonl_str("{\"prediction\": \"a\", \"reference\": \"a\"}\nnot json\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_into_columns_fills_ids() {
        let dataset = Dataset::new(vec![
            Sample::new("p0", "r0"),
            Sample::new("p1", "r1").with_id("custom"),
            Sample::new("p2", "r2"),
        ]);

        let (predictions, references, ids) = dataset.into_columns();
        assert_eq!(predictions, vec!["p0", "p1", "p2"]);
        assert_eq!(references, vec!["r0", "r1", "r2"]);
        assert_eq!(ids, vec!["sample_0", "custom", "sample_2"]);
    }

    #[test]
    fn test_from_pairs_shape() {
        assert!(Dataset::from_pairs(vec!["a".into()], vec![]).is_err());
        let dataset = Dataset::from_pairs(vec!["a".into()], vec!["b".into()]).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("data.json");
        std::fs::write(&json, r#"[{"prediction": "a", "reference": "b"}]"#).unwrap();
        assert_eq!(Dataset::load(&json).unwrap().len(), 1);

        let yaml = dir.path().join("data.yml");
        std::fs::write(&yaml, "- prediction: a\n  reference: b\n").unwrap();
        assert_eq!(Dataset::load(&yaml).unwrap().len(), 1);

        let csv = dir.path().join("data.csv");
        std::fs::write(&csv, "prediction,reference\n").unwrap();
        assert!(matches!(Dataset::load(&csv), Err(EvalError::Dataset(_))));
    }
}
