//! Text and markdown rendering of batch results.

use crate::error::EvalResult;
use crate::result::{BatchResult, SampleResult};
use std::cmp::Ordering;
use std::path::Path;
use tracing::info;

/// Predictions longer than this are cut in the text summary.
const SUMMARY_PREDICTION_CHARS: usize = 50;

/// How many samples to list in the best/worst sections.
const HIGHLIGHT_COUNT: usize = 3;

const RECOMMENDATIONS: &[&str] = &[
    "**Consider metric weights**: Adjust weights based on your use case.",
    "**Add custom metrics**: Implement domain-specific evaluation criteria.",
    "**Increase dataset size**: More samples provide more reliable statistics.",
    "**Benchmark against baselines**: Compare with other models or human evaluations.",
];

/// Renders a [`BatchResult`] for humans.
#[derive(Debug, Clone, Copy)]
pub struct ReportGenerator<'a> {
    result: &'a BatchResult,
}

impl<'a> ReportGenerator<'a> {
    /// Create a generator for a result.
    pub fn new(result: &'a BatchResult) -> Self {
        Self { result }
    }

    /// `(metric, mean, std, min, max)` rows in aggregate order.
    fn stat_rows(&self) -> Vec<(&'a str, f64, f64, f64, f64)> {
        let aggregate = self.result.aggregate();
        aggregate
            .iter()
            .filter_map(|(key, mean)| {
                let metric = key.strip_suffix("_mean")?;
                let get = |suffix: &str| {
                    aggregate
                        .get(&format!("{metric}_{suffix}"))
                        .copied()
                        .unwrap_or(0.0)
                };
                Some((metric, *mean, get("std"), get("min"), get("max")))
            })
            .collect()
    }

    fn bottom(&self) -> Vec<&'a SampleResult> {
        let mut samples: Vec<&SampleResult> = self.result.per_sample().iter().collect();
        samples.sort_by(|a, b| {
            a.overall_score()
                .partial_cmp(&b.overall_score())
                .unwrap_or(Ordering::Equal)
        });
        samples.truncate(HIGHLIGHT_COUNT);
        samples
    }

    fn top(&self) -> Vec<&'a SampleResult> {
        let mut samples = self.result.ranked();
        samples.truncate(HIGHLIGHT_COUNT);
        samples
    }

    /// Plain-text summary for the terminal.
    pub fn summary_text(&self) -> String {
        let metadata = self.result.metadata();
        let rule = "=".repeat(60);
        let mut output = String::new();

        output.push_str(&format!("{rule}\nEVALUATION SUMMARY\n{rule}\n"));
        output.push_str(&format!("Total Samples: {}\n", metadata.total_samples));
        output.push_str(&format!(
            "Metrics Used: {}\n",
            metadata.metrics_used.join(", ")
        ));

        output.push_str("\nAGGREGATE SCORES:\n");
        output.push_str(&format!("{}\n", "-".repeat(40)));
        for (metric, mean, std, _, _) in self.stat_rows() {
            output.push_str(&format!("{metric:20}: {mean:.3} (±{std:.3})\n"));
        }

        output.push_str("\nTOP PERFORMING SAMPLES:\n");
        output.push_str(&format!("{}\n", "-".repeat(40)));
        for (i, sample) in self.top().into_iter().enumerate() {
            output.push_str(&format!("{}. ID: {}\n", i + 1, sample.sample_id().unwrap_or("-")));
            output.push_str(&format!("   Score: {:.3}\n", sample.overall_score()));
            output.push_str(&format!(
                "   Prediction: {}\n\n",
                truncate(sample.prediction(), SUMMARY_PREDICTION_CHARS)
            ));
        }

        output
    }

    /// Full markdown report.
    pub fn markdown(&self) -> String {
        let metadata = self.result.metadata();
        let mut md = String::new();

        md.push_str("# Evaluation Report\n\n");
        md.push_str(&format!(
            "**Generated**: {}\n\n",
            metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!("**Total Samples**: {}\n\n", metadata.total_samples));
        if !metadata.metrics_used.is_empty() {
            md.push_str(&format!(
                "**Metrics**: {}\n\n",
                metadata.metrics_used.join(", ")
            ));
        }

        md.push_str("## Summary Statistics\n\n");
        md.push_str("### Aggregate Scores\n\n");
        md.push_str("| Metric | Mean | Std Dev | Min | Max |\n");
        md.push_str("|--------|------|---------|-----|-----|\n");
        for (metric, mean, std, min, max) in self.stat_rows() {
            md.push_str(&format!(
                "| {metric} | {mean:.3} | {std:.3} | {min:.3} | {max:.3} |\n"
            ));
        }
        md.push('\n');

        md.push_str("## Per-Sample Scores\n\n");
        self.push_sample_table(&mut md);

        md.push_str("## Sample Analysis\n\n");
        md.push_str(&format!("### Top {HIGHLIGHT_COUNT} Performers\n\n"));
        for sample in self.top() {
            push_highlight(&mut md, sample);
        }
        md.push_str(&format!("### Bottom {HIGHLIGHT_COUNT} Performers\n\n"));
        for sample in self.bottom() {
            push_highlight(&mut md, sample);
        }

        md.push_str("## Recommendations\n\n");
        for (i, line) in RECOMMENDATIONS.iter().enumerate() {
            md.push_str(&format!("{}. {line}\n", i + 1));
        }

        md
    }

    fn push_sample_table(&self, md: &mut String) {
        let Some(first) = self.result.per_sample().first() else {
            md.push_str("_No samples._\n\n");
            return;
        };

        let columns: Vec<&str> = first.scores().keys().map(String::as_str).collect();
        md.push_str("| Sample |");
        for column in &columns {
            md.push_str(&format!(" {column} |"));
        }
        md.push_str("\n|--------|");
        for _ in &columns {
            md.push_str("------|");
        }
        md.push('\n');

        for sample in self.result.per_sample() {
            md.push_str(&format!(
                "| {} |",
                escape_cell(sample.sample_id().unwrap_or("-"))
            ));
            for column in &columns {
                match sample.score(column) {
                    Some(score) => md.push_str(&format!(" {score:.3} |")),
                    None => md.push_str(" - |"),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    }

    /// Write [`markdown`](Self::markdown) to `path`, creating parent directories.
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> EvalResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.markdown())?;
        info!(path = %path.display(), "Report generated");
        Ok(())
    }
}

fn push_highlight(md: &mut String, sample: &SampleResult) {
    md.push_str(&format!(
        "**{}** (Score: {:.3})\n",
        single_line(sample.sample_id().unwrap_or("-")),
        sample.overall_score()
    ));
    md.push_str(&format!("- Prediction: {}\n", single_line(sample.prediction())));
    md.push_str(&format!("- Reference: {}\n\n", single_line(sample.reference())));
}

/// Cut to `max` chars, appending `...` when anything was dropped.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Collapse line breaks and whitespace runs so text stays inside its line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}
