//! Train ridge, logit and forest classifiers for every feature column
//!
//! Usage: `cargo run --bin train_per_feature -- --features features.csv --out models/`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ensemble_signal::config::PipelineConfig;
use ensemble_signal::pipeline::run_training;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train per-feature classifier artifacts")]
struct Args {
    /// Feature table (CSV, or Parquet by extension) with timestamp and label columns
    #[arg(long)]
    features: PathBuf,

    /// Output directory for artifacts and summary.json
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON configuration overriding the default hyperparameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the forest seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let summary = run_training(&args.features, &args.out, &config)
        .with_context(|| format!("training on {}", args.features.display()))?;

    info!(
        artifacts = summary.len(),
        out = %args.out.display(),
        "done"
    );
    Ok(())
}
