//! File-level batch jobs behind the two commands
//!
//! Both jobs load and validate the whole input table before touching any
//! output path, so a schema error leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::artifact;
use crate::config::{PipelineConfig, SUMMARY_FILE_NAME};
use crate::score::{Scorer, SignalSeries};
use crate::summary::{ScoringMetadata, TrainingSummary};
use crate::table::FeatureTable;
use crate::train::Trainer;
use crate::{Error, Result};

/// Path of the metadata document written next to a scoring output.
///
/// ```rust
/// use std::path::Path;
/// use ensemble_signal::pipeline::metadata_path;
///
/// assert_eq!(metadata_path(Path::new("out/signal.csv")), Path::new("out/signal.json"));
/// ```
#[must_use]
pub fn metadata_path(out: &Path) -> PathBuf {
    out.with_extension("json")
}

/// Train every feature of the table at `features`, writing one artifact per
/// `(feature, family)` and `summary.json` into `out_dir`.
///
/// # Errors
///
/// Returns error on invalid configuration, an unreadable or malformed table
/// (including a missing `label` column), or a failed write
pub fn run_training<P, Q>(
    features: P,
    out_dir: Q,
    config: &PipelineConfig,
) -> Result<TrainingSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (features, out_dir) = (features.as_ref(), out_dir.as_ref());
    config.validate()?;

    let table = FeatureTable::load(features)?;
    table.require_labels()?;
    info!(path = %features.display(), rows = table.len(), "loaded feature table");

    let store = artifact::open_dir(out_dir, &config.artifacts)?;
    let summary = Trainer::new(config.training.clone()).train_table(&table, &store)?;

    // No artifact may have been written, so the directory can still be missing.
    fs::create_dir_all(out_dir).map_err(|e| {
        Error::StorageError(format!("Failed to create {}: {e}", out_dir.display()))
    })?;
    let summary_path = out_dir.join(SUMMARY_FILE_NAME);
    summary.write_json(&summary_path)?;
    info!(path = %summary_path.display(), "wrote training summary");
    Ok(summary)
}

/// Score the table at `features` with the artifacts in `models_dir`, writing
/// the `timestamp,signal` CSV to `out` and its metadata to
/// [`metadata_path`]`(out)`.
///
/// # Errors
///
/// Returns error on invalid configuration, an unreadable or malformed table,
/// a corrupt artifact, or a failed write
pub fn run_scoring<P, Q, R>(
    features: P,
    models_dir: Q,
    out: R,
    config: &PipelineConfig,
) -> Result<(SignalSeries, ScoringMetadata)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let (features, models_dir, out) = (features.as_ref(), models_dir.as_ref(), out.as_ref());
    config.validate()?;

    let table = FeatureTable::load(features)?;
    info!(path = %features.display(), rows = table.len(), "loaded feature table");

    let store = artifact::open_dir(models_dir, &config.artifacts)?;
    let (series, metadata) =
        Scorer::new(&store).score(&table, models_dir.display().to_string())?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::StorageError(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }
    series.write_csv(out)?;
    let meta_path = metadata_path(out);
    metadata.write_json(&meta_path)?;
    info!(
        signal = %out.display(),
        metadata = %meta_path.display(),
        "wrote scoring output"
    );
    Ok((series, metadata))
}
