//! # ensemble-signal: Per-Feature Classifier Ensembles
//!
//! Turns a time-ordered table of labeled feature observations into a
//! directional signal in `{-1, 0, 1}` per timestamp.
//!
//! ## Phases
//!
//! - **Training**: every feature column gets its own `ridge`, `logit` and
//!   `forest` classifier, fitted on the leading 80% of rows and scored on the
//!   trailing 20%. Models are persisted as artifacts keyed by
//!   `(feature, family)`.
//! - **Scoring**: artifacts are loaded (missing ones are skipped), each
//!   feature's families vote by sign of their mean prediction, and the
//!   features then vote the same way.
//!
//! ## Example Usage
//!
//! ```rust
//! use ensemble_signal::artifact::ArtifactStore;
//! use ensemble_signal::config::TrainingConfig;
//! use ensemble_signal::kv::MemoryKvStore;
//! use ensemble_signal::score::Scorer;
//! use ensemble_signal::table::{FeatureColumn, FeatureTable};
//! use ensemble_signal::train::Trainer;
//!
//! let table = FeatureTable::from_columns(
//!     (0..20).map(|i| format!("t{i}")).collect(),
//!     Some((0..20).map(|i| if i < 10 { -1.0 } else { 1.0 }).collect()),
//!     vec![FeatureColumn::new("momentum", (0..20).map(f64::from).collect())],
//! )?;
//!
//! let store = ArtifactStore::new(MemoryKvStore::new());
//! let mut config = TrainingConfig::default();
//! config.forest.n_trees = 20;
//! Trainer::new(config).train_table(&table, &store)?;
//!
//! let (signal, metadata) = Scorer::new(&store).score(&table, "in-memory")?;
//! assert_eq!(signal.len(), 20);
//! assert_eq!(metadata.features_used(), ["momentum".to_string()]);
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod kv;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod score;
pub mod summary;
pub mod table;
pub mod train;

pub use error::{Error, Result};
