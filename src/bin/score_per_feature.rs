//! Score a feature table with per-feature artifacts and write the voted signal
//!
//! Usage:
//!
//! ```text
//! cargo run --bin score_per_feature -- \
//!     --features features.csv --models models/ --out signal.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ensemble_signal::config::PipelineConfig;
use ensemble_signal::pipeline::{metadata_path, run_scoring};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score features with the per-feature ensemble")]
struct Args {
    /// Feature table (CSV, or Parquet by extension) with a timestamp column
    #[arg(long)]
    features: PathBuf,

    /// Directory holding the trained artifacts
    #[arg(long)]
    models: PathBuf,

    /// Output CSV (timestamp,signal); metadata goes to the same name with .json
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON configuration (artifact extension and compression)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let (series, metadata) = run_scoring(&args.features, &args.models, &args.out, &config)
        .with_context(|| format!("scoring {}", args.features.display()))?;

    let count = |signal: i8| series.values().iter().filter(|&&v| v == signal).count();
    info!(
        rows = series.len(),
        short = count(-1),
        flat = count(0),
        long = count(1),
        features_used = metadata.features_used().len(),
        metadata = %metadata_path(&args.out).display(),
        "done"
    );
    Ok(())
}
