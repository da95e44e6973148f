//! Training Summary - feature → family → metrics

use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{write_pretty_json, MetricsRecord};
use crate::model::Family;
use crate::Result;

/// Metrics for every successfully trained `(feature, family)` pair.
///
/// Features keep the order in which they were first recorded (input column
/// order) and families keep their recording order within a feature. The JSON
/// form preserves both orders:
///
/// ```json
/// {"f1": {"ridge": {"accuracy": 1.0, "f1": 1.0}, "logit": {...}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    features: Vec<(String, Vec<(Family, MetricsRecord)>)>,
}

impl TrainingSummary {
    /// Create an empty summary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Record metrics for a pair; re-recording a pair replaces its metrics.
    pub fn record(&mut self, feature: &str, family: Family, metrics: MetricsRecord) {
        let position = match self.features.iter().position(|(name, _)| name == feature) {
            Some(position) => position,
            None => {
                self.features.push((feature.to_string(), Vec::new()));
                self.features.len() - 1
            }
        };
        let families = &mut self.features[position].1;
        match families.iter_mut().find(|(f, _)| *f == family) {
            Some(entry) => entry.1 = metrics,
            None => families.push((family, metrics)),
        }
    }

    /// Metrics for a pair, if it was trained.
    #[must_use]
    pub fn get(&self, feature: &str, family: Family) -> Option<MetricsRecord> {
        self.families(feature)?
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, metrics)| *metrics)
    }

    /// Trained families of a feature, in recording order.
    #[must_use]
    pub fn families(&self, feature: &str) -> Option<&[(Family, MetricsRecord)]> {
        self.features
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, families)| families.as_slice())
    }

    /// Features with at least one trained family, in recording order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(name, _)| name.as_str())
    }

    /// Number of trained `(feature, family)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.iter().map(|(_, families)| families.len()).sum()
    }

    /// Whether nothing was trained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Write the summary as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_pretty_json(path.as_ref(), self)
    }
}

struct FamilyMap<'a>(&'a [(Family, MetricsRecord)]);

impl Serialize for FamilyMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (family, metrics) in self.0 {
            map.serialize_entry(family.as_str(), metrics)?;
        }
        map.end()
    }
}

impl Serialize for TrainingSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.features.len()))?;
        for (feature, families) in &self.features {
            map.serialize_entry(feature, &FamilyMap(families))?;
        }
        map.end()
    }
}
