//! Feature table loading (Arrow CSV / Parquet)
//!
//! A feature table is read once per run and never mutated. Columns keep the
//! input order: `timestamp` and `label` are reserved, every other column is a
//! feature and its position defines the feature iteration order used by both
//! the trainer and the scorer.
//!
//! Both input formats go through Arrow. Every column is cast to its target
//! type (`Utf8` for timestamps, `Float64` for label and features); a value the
//! cast cannot convert becomes null and is reported as an `InvalidValue`.

use std::collections::HashSet;
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, concat_batches};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Float64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::{Error, Result};

/// Reserved timestamp column name
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Reserved label column name
pub const LABEL_COLUMN: &str = "label";

/// One feature: its name and values in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    name: String,
    values: Vec<f64>,
}

impl FeatureColumn {
    /// Create a feature column.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values aligned with the table rows.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Time-ordered table of feature observations.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    timestamps: Vec<String>,
    labels: Option<Vec<f64>>,
    features: Vec<FeatureColumn>,
}

impl FeatureTable {
    /// Build a table from already-parsed columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a column length differs from the timestamp
    /// count, a feature uses a reserved name, or a feature name repeats
    pub fn from_columns(
        timestamps: Vec<String>,
        labels: Option<Vec<f64>>,
        features: Vec<FeatureColumn>,
    ) -> Result<Self> {
        let rows = timestamps.len();
        if let Some(labels) = &labels {
            if labels.len() != rows {
                return Err(Error::InvalidInput(format!(
                    "label column has {} rows, expected {rows}",
                    labels.len()
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in &features {
            if is_reserved(column.name()) {
                return Err(Error::InvalidInput(format!(
                    "'{}' is reserved and cannot be a feature",
                    column.name()
                )));
            }
            if !seen.insert(column.name()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate feature column '{}'",
                    column.name()
                )));
            }
            if column.values().len() != rows {
                return Err(Error::InvalidInput(format!(
                    "feature '{}' has {} rows, expected {rows}",
                    column.name(),
                    column.values().len()
                )));
            }
        }

        Ok(Self {
            timestamps,
            labels,
            features,
        })
    }

    /// Load a table, choosing the reader from the file extension
    /// (`.parquet` → Parquet, anything else → CSV).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a column is malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
        if is_parquet {
            Self::load_parquet(path)
        } else {
            Self::load_csv(path)
        }
    }

    /// Load a CSV table with a header row.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or parsed, or a column is
    /// malformed
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open feature table {}: {e}", path.display()))
        })?;

        // Header names only; every column is read as text and cast afterwards.
        let format = Format::default().with_header(true);
        let (header, _) = format.infer_schema(&mut file, Some(0))?;
        file.rewind()?;

        let fields: Vec<Field> = header
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));

        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(true)
            .build(file)?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(path = %path.display(), batches = batches.len(), "read CSV feature table");
        Self::from_batches(&schema, &batches)
    }

    /// Load a Parquet table.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a column is malformed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = Arc::clone(builder.schema());
        let reader = builder.build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }

        debug!(path = %path.display(), batches = batches.len(), "read Parquet feature table");
        Self::from_batches(&schema, &batches)
    }

    /// Build a table from Arrow record batches sharing `schema`.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` without a `timestamp` column and
    /// `InvalidValue` for empty, non-numeric, or non-finite cells
    pub fn from_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(schema, batches)?;

        let ts_index = schema
            .index_of(TIMESTAMP_COLUMN)
            .map_err(|_| Error::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;
        let timestamps = string_column(TIMESTAMP_COLUMN, batch.column(ts_index))?;

        let labels = match schema.index_of(LABEL_COLUMN) {
            Ok(index) => Some(numeric_column(LABEL_COLUMN, batch.column(index))?),
            Err(_) => None,
        };

        let mut features = Vec::new();
        for (index, field) in schema.fields().iter().enumerate() {
            if is_reserved(field.name()) {
                continue;
            }
            let values = numeric_column(field.name(), batch.column(index))?;
            features.push(FeatureColumn::new(field.name().clone(), values));
        }

        Self::from_columns(timestamps, labels, features)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamp keys in row order.
    #[must_use]
    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    /// Label values, if the table carries a `label` column.
    #[must_use]
    pub fn labels(&self) -> Option<&[f64]> {
        self.labels.as_deref()
    }

    /// Label values, failing when the column is absent.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn("label")`
    pub fn require_labels(&self) -> Result<&[f64]> {
        self.labels()
            .ok_or_else(|| Error::MissingColumn(LABEL_COLUMN.to_string()))
    }

    /// Feature columns in input order.
    #[must_use]
    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }

    /// Feature names in input order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(FeatureColumn::name).collect()
    }

    /// Values of the named feature.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.features
            .iter()
            .find(|c| c.name() == name)
            .map(FeatureColumn::values)
    }
}

fn is_reserved(name: &str) -> bool {
    name == TIMESTAMP_COLUMN || name == LABEL_COLUMN
}

fn string_column(name: &str, array: &ArrayRef) -> Result<Vec<String>> {
    let casted = cast(array, &DataType::Utf8)?;
    let strings = casted
        .as_string_opt::<i32>()
        .ok_or_else(|| Error::StorageError(format!("column '{name}' did not cast to Utf8")))?;

    let mut out = Vec::with_capacity(strings.len());
    for row in 0..strings.len() {
        if strings.is_null(row) {
            return Err(Error::InvalidValue {
                column: name.to_string(),
                row,
                message: "empty cell".to_string(),
            });
        }
        out.push(strings.value(row).to_string());
    }
    Ok(out)
}

fn numeric_column(name: &str, array: &ArrayRef) -> Result<Vec<f64>> {
    let casted = cast(array, &DataType::Float64)?;
    let numbers = casted
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| Error::StorageError(format!("column '{name}' did not cast to Float64")))?;

    let raw = array.as_string_opt::<i32>();
    let mut out = Vec::with_capacity(numbers.len());
    for row in 0..numbers.len() {
        if numbers.is_null(row) {
            let message = match raw {
                Some(raw) if !raw.is_null(row) => format!("'{}' is not numeric", raw.value(row)),
                _ => "empty cell".to_string(),
            };
            return Err(Error::InvalidValue {
                column: name.to_string(),
                row,
                message,
            });
        }
        let value = numbers.value(row);
        if !value.is_finite() {
            return Err(Error::InvalidValue {
                column: name.to_string(),
                row,
                message: format!("non-finite value {value}"),
            });
        }
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, StringArray};

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_preserves_column_order() {
        let file = write_csv("timestamp,zeta,alpha,label\nt0,1.5,2,0\nt1,2.5,3,1\n");
        let table = FeatureTable::load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.feature_names(), vec!["zeta", "alpha"]);
        assert_eq!(table.timestamps(), &["t0".to_string(), "t1".to_string()]);
        assert_eq!(table.labels(), Some(&[0.0, 1.0][..]));
        assert_eq!(table.column("alpha"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn test_load_csv_without_label() {
        let file = write_csv("timestamp,f1\nt0,1\n");
        let table = FeatureTable::load_csv(file.path()).unwrap();
        assert!(table.labels().is_none());
        assert!(matches!(table.require_labels(), Err(Error::MissingColumn(c)) if c == "label"));
    }

    #[test]
    fn test_load_csv_rejects_non_numeric_feature() {
        let file = write_csv("timestamp,f1,label\nt0,1,0\nt1,abc,1\n");
        let err = FeatureTable::load_csv(file.path()).unwrap_err();
        match err {
            Error::InvalidValue { column, row, message } => {
                assert_eq!(column, "f1");
                assert_eq!(row, 1);
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_csv_rejects_empty_cell() {
        let file = write_csv("timestamp,f1,label\nt0,,0\n");
        assert!(matches!(
            FeatureTable::load_csv(file.path()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_csv_requires_timestamp() {
        let file = write_csv("f1,label\n1,0\n");
        assert!(matches!(
            FeatureTable::load_csv(file.path()),
            Err(Error::MissingColumn(c)) if c == "timestamp"
        ));
    }

    #[test]
    fn test_load_missing_file_is_storage_error() {
        let err = FeatureTable::load("/nonexistent/features.csv").unwrap_err();
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[test]
    fn test_header_only_csv_is_empty_table() {
        let file = write_csv("timestamp,f1,label\n");
        let table = FeatureTable::load_csv(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.feature_names(), vec!["f1"]);
    }

    #[test]
    fn test_from_batches_casts_integer_features() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("timestamp", DataType::Utf8, false),
            Field::new("volume", DataType::Int32, false),
            Field::new("label", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Int32Array::from(vec![10, 20])),
                Arc::new(Float64Array::from(vec![-1.0, 1.0])),
            ],
        )
        .unwrap();

        let table = FeatureTable::from_batches(&schema, &[batch]).unwrap();
        assert_eq!(table.column("volume"), Some(&[10.0, 20.0][..]));
        assert_eq!(table.labels(), Some(&[-1.0, 1.0][..]));
    }

    #[test]
    fn test_load_parquet_matches_csv_semantics() {
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("timestamp", DataType::Utf8, false),
            Field::new("label", DataType::Int32, false),
            Field::new("f1", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(StringArray::from(vec!["t0", "t1", "t2"])),
                Arc::new(Int32Array::from(vec![0, 1, -1])),
                Arc::new(Float64Array::from(vec![0.5, 1.5, -2.0])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = FeatureTable::load(file.path()).unwrap();
        assert_eq!(table.feature_names(), vec!["f1"]);
        assert_eq!(table.labels(), Some(&[0.0, 1.0, -1.0][..]));
        assert_eq!(table.column("f1"), Some(&[0.5, 1.5, -2.0][..]));
    }

    #[test]
    fn test_from_columns_rejects_misaligned_feature() {
        let result = FeatureTable::from_columns(
            vec!["a".into(), "b".into()],
            None,
            vec![FeatureColumn::new("f1", vec![1.0])],
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_columns_rejects_duplicate_feature() {
        let result = FeatureTable::from_columns(
            vec!["a".into()],
            None,
            vec![
                FeatureColumn::new("f1", vec![1.0]),
                FeatureColumn::new("f1", vec![2.0]),
            ],
        );
        assert!(result.is_err());
    }
}
