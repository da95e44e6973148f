//! Run outputs: training metrics summary and scoring metadata
//!
//! ```text
//! TrainingSummary ──< feature ──< family ── MetricsRecord {accuracy, f1}
//! ScoringMetadata { features_used, models_dir }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ensemble_signal::model::Family;
//! use ensemble_signal::summary::{MetricsRecord, TrainingSummary};
//!
//! let mut summary = TrainingSummary::new();
//! summary.record("f1", Family::Ridge, MetricsRecord::new(0.75, 0.5));
//!
//! let json = serde_json::to_value(&summary)?;
//! assert_eq!(json["f1"]["ridge"]["accuracy"], 0.75);
//! # Ok::<(), serde_json::Error>(())
//! ```

mod metrics_record;
mod scoring_metadata;
mod training_summary;

pub use metrics_record::MetricsRecord;
pub use scoring_metadata::ScoringMetadata;
pub use training_summary::TrainingSummary;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::{Error, Result};

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::StorageError(format!("Failed to create {}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
