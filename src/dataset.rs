use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sample::Sample;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("unsupported field path {0:?}, expected <field>.detections.label")]
    UnsupportedFieldPath(String),
}

/// A named group of samples.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    persistent: bool,
    #[serde(default)]
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, persistent: bool) -> Self {
        Dataset {
            name: name.into(),
            persistent,
            samples: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persistent(&self) -> bool {
        self.persistent
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct values at `field_path` across every sample.
    ///
    /// Only detection labels are addressable: `"<field>.detections.label"`.
    /// Samples without the field contribute nothing.
    pub fn distinct(&self, field_path: &str) -> Result<BTreeSet<String>, DatasetError> {
        let field = match field_path.split('.').collect::<Vec<_>>().as_slice() {
            [field, "detections", "label"] if !field.is_empty() => *field,
            _ => return Err(DatasetError::UnsupportedFieldPath(field_path.to_owned())),
        };

        let labels = self
            .samples
            .iter()
            .filter_map(|sample| sample.field(field))
            .flat_map(|detections| detections.labels())
            .map(str::to_owned)
            .collect();
        Ok(labels)
    }

    /// Number of values at `field_path` across every sample, duplicates included.
    pub fn count(&self, field_path: &str) -> Result<usize, DatasetError> {
        let field = match field_path.split('.').collect::<Vec<_>>().as_slice() {
            [field, "detections"] | [field, "detections", "label"] if !field.is_empty() => *field,
            _ => return Err(DatasetError::UnsupportedFieldPath(field_path.to_owned())),
        };

        Ok(self
            .samples
            .iter()
            .filter_map(|sample| sample.field(field))
            .map(|detections| detections.len())
            .sum())
    }
}
