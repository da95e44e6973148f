//! Signal series output

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int8Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::table::TIMESTAMP_COLUMN;
use crate::{Error, Result};

/// Name of the signal column in the output table.
pub const SIGNAL_COLUMN: &str = "signal";

/// Final per-timestamp signal, aligned to the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSeries {
    timestamps: Vec<String>,
    values: Vec<i8>,
}

impl SignalSeries {
    /// Pair timestamps with signal values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the lengths differ or a value lies outside
    /// `{-1, 0, 1}`
    pub fn new(timestamps: Vec<String>, values: Vec<i8>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "{} timestamps but {} signal values",
                timestamps.len(),
                values.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !(-1..=1).contains(*v)) {
            return Err(Error::InvalidInput(format!("signal value {bad} outside {{-1, 0, 1}}")));
        }
        Ok(Self { timestamps, values })
    }

    /// An all-zero signal for the given timestamps.
    #[must_use]
    pub fn zeros(timestamps: Vec<String>) -> Self {
        let values = vec![0; timestamps.len()];
        Self { timestamps, values }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Timestamps in input order.
    #[must_use]
    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    /// Signal values in input order.
    #[must_use]
    pub fn values(&self) -> &[i8] {
        &self.values
    }

    /// `(timestamp, signal)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i8)> {
        self.timestamps
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Arrow batch with columns `timestamp` (Utf8) and `signal` (Int8).
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be assembled
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(vec![
            Field::new(TIMESTAMP_COLUMN, DataType::Utf8, false),
            Field::new(SIGNAL_COLUMN, DataType::Int8, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(&self.timestamps)),
            Arc::new(Int8Array::from(self.values.clone())),
        ];
        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Write `timestamp,signal` CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let batch = self.to_record_batch()?;
        let file = File::create(path)
            .map_err(|e| Error::StorageError(format!("Failed to create {}: {e}", path.display())))?;
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(&batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(SignalSeries::new(vec!["a".into()], vec![]).is_err());
        assert!(SignalSeries::new(vec!["a".into()], vec![2]).is_err());
        assert!(SignalSeries::new(vec!["a".into()], vec![-1]).is_ok());
    }

    #[test]
    fn test_zeros() {
        let series = SignalSeries::zeros(vec!["a".into(), "b".into()]);
        assert_eq!(series.values(), &[0, 0]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.csv");
        let series = SignalSeries::new(
            vec!["2024-01-01 00:00:00".into(), "2024-01-02 00:00:00".into()],
            vec![1, -1],
        )
        .unwrap();
        series.write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "timestamp,signal\n2024-01-01 00:00:00,1\n2024-01-02 00:00:00,-1\n"
        );
    }
}
