//! refscore command-line runner.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use refscore_evals::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RESULTS_FILE: &str = "eval_results.json";
const REPORT_FILE: &str = "evaluation_report.md";

#[derive(Parser)]
#[command(name = "refscore")]
#[command(about = "Score model outputs against reference answers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a dataset of predictions against references
    Eval(EvalArgs),

    /// Write the default configuration as YAML
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}

#[derive(Args)]
struct EvalArgs {
    /// Dataset file (.json, .jsonl, .yaml, .yml)
    #[arg(short, long)]
    dataset: PathBuf,

    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the JSON results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the markdown report
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Embedding model for semantic similarity (e.g. `hash`, `openai:text-embedding-3-small`)
    #[arg(long)]
    embedding_model: Option<String>,

    /// Disable semantic similarity
    #[arg(long)]
    no_semantic: bool,
}

impl EvalArgs {
    fn resolve_config(&self) -> anyhow::Result<EvaluationConfig> {
        let mut config = match &self.config {
            Some(path) => EvaluationConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EvaluationConfig::default(),
        };

        if let Some(model) = &self.embedding_model {
            config.set_model_name(model.clone());
        }
        if self.no_semantic {
            config.set_enabled(MetricKind::SemanticSimilarity, false);
        }
        Ok(config)
    }

    fn results_path(&self, config: &EvaluationConfig) -> Option<PathBuf> {
        match &self.output {
            Some(path) => Some(path.clone()),
            None if config.output.save_results => Some(config.output.output_dir.join(RESULTS_FILE)),
            None => None,
        }
    }

    fn report_path(&self, config: &EvaluationConfig) -> Option<PathBuf> {
        match &self.report {
            Some(path) => Some(path.clone()),
            None if config.output.generate_report => {
                Some(config.output.output_dir.join(REPORT_FILE))
            }
            None => None,
        }
    }
}

async fn run_eval(args: EvalArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let evaluator = Evaluator::from_config(&config)?;

    let dataset = Dataset::load(&args.dataset)
        .with_context(|| format!("loading dataset {}", args.dataset.display()))?;
    let (predictions, references, sample_ids) = dataset.into_columns();

    let batch = evaluator
        .evaluate_batch(&predictions, &references, Some(&sample_ids))
        .await?;

    let report = ReportGenerator::new(&batch);
    println!("{}", report.summary_text());

    if let Some(path) = args.results_path(&config) {
        JsonResultStore::new(&path).save(&batch)?;
        println!("Results saved to {}", path.display());
    }
    if let Some(path) = args.report_path(&config) {
        report.write_markdown(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => run_eval(args).await?,
        Commands::InitConfig { path } => {
            EvaluationConfig::default().save(&path)?;
            info!(path = %path.display(), "Wrote default configuration");
        }
    }

    Ok(())
}
