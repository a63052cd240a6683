//! End-to-end: config and dataset files in, stored results and report out.

use pretty_assertions::assert_eq;
use refscore_embeddings::{Embedder, HashEmbeddingModel};
use refscore_evals::prelude::*;
use refscore_evals::OVERALL_SCORE;

const DATASET: &str = r#"[
  {"sample_id": "geo-1", "prediction": "The capital of France is Paris.", "reference_answer": "Paris is the capital of France."},
  {"sample_id": "chem-1", "prediction": "Water's chemical formula is H₂O.", "reference_answer": "The chemical formula for water is H₂O."},
  {"sample_id": "phys-1", "prediction": "Water boils at 90°C.", "reference_answer": "Water boils at 100°C at sea level."},
  {"sample_id": "lit-1", "prediction": "William Shakespeare wrote Romeo and Juliet.", "reference_answer": "William Shakespeare wrote Romeo and Juliet."}
]"#;

const CONFIG: &str = r#"
metrics:
  semantic_similarity:
    model_name: "hash:128"
  keyword_match:
    enabled: false
weights:
  exact_match: 0.5
"#;

#[tokio::test]
async fn test_files_to_results_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("qa.json");
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&dataset_path, DATASET).unwrap();
    std::fs::write(&config_path, CONFIG).unwrap();

    let config = EvaluationConfig::load(&config_path).unwrap();
    let evaluator = Evaluator::from_config(&config).unwrap();
    let (predictions, references, ids) = Dataset::load(&dataset_path).unwrap().into_columns();

    let batch = evaluator
        .evaluate_batch(&predictions, &references, Some(&ids))
        .await
        .unwrap();

    assert_eq!(
        batch.metadata().metrics_used,
        vec!["exact_match", "fuzzy_match", "semantic_similarity"]
    );
    assert_eq!(batch.total_samples(), 4);

    let lit = &batch.per_sample()[3];
    assert_eq!(lit.sample_id(), Some("lit-1"));
    assert_eq!(lit.score("exact_match"), Some(1.0));
    assert!((lit.overall_score() - 1.0).abs() < 1e-6);

    for sample in batch.per_sample() {
        assert_eq!(sample.score("keyword_match"), None);
        for (_, score) in sample.scores() {
            assert!((0.0..=1.0 + 1e-12).contains(score));
        }
        assert!(sample.scores().contains_key(OVERALL_SCORE));
    }

    for metric in ["exact_match", "fuzzy_match", "semantic_similarity", "overall"] {
        for stat in ["mean", "std", "min", "max"] {
            assert!(batch.aggregate().contains_key(&format!("{metric}_{stat}")));
        }
    }

    let store = JsonResultStore::new(dir.path().join("results/eval_results.json"));
    store.save(&batch).unwrap();
    assert_eq!(store.load().unwrap(), batch);

    let report_path = dir.path().join("reports/report.md");
    ReportGenerator::new(&batch).write_markdown(&report_path).unwrap();
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("H₂O"));
    assert!(report.contains("| semantic_similarity |"));
}

#[tokio::test]
async fn test_selective_weights_ignore_disabled_metrics() {
    let config = EvaluationConfig::from_yaml_str(
        r#"
metrics:
  fuzzy_match: {enabled: false}
  keyword_match: {enabled: false}
  semantic_similarity: {enabled: false}
"#,
    )
    .unwrap();
    let evaluator = Evaluator::from_config(&config).unwrap();

    let result = evaluator
        .evaluate_single("Paris", "London", None)
        .await
        .unwrap();
    assert_eq!(result.score("exact_match"), Some(0.0));
    assert_eq!(result.overall_score(), 0.0);

    let result = evaluator
        .evaluate_single("PARIS!", "paris", None)
        .await
        .unwrap();
    assert_eq!(result.overall_score(), 1.0);
}

#[tokio::test]
async fn test_injected_embedder_and_named_model_agree() {
    let metrics = MetricConfig::default();
    let injected = Evaluator::with_embedder(
        metrics.clone(),
        WeightTable::default(),
        Embedder::new(HashEmbeddingModel::new(64)),
    )
    .unwrap();

    let mut config = EvaluationConfig::default();
    config.set_model_name("hash:64");
    let named = Evaluator::from_config(&config).unwrap();

    let predictions = vec!["rock and dust".to_string()];
    let references = vec!["The Moon is composed of rock, dust, and minerals.".to_string()];

    let a = injected.evaluate_batch(&predictions, &references, None).await.unwrap();
    let b = named.evaluate_batch(&predictions, &references, None).await.unwrap();
    assert_eq!(a.per_sample(), b.per_sample());
}
