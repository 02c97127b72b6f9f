use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    detection::TemporalDetections,
    metadata::{MediaMetadata, MetadataProbe},
};

/// One media file plus the label fields attached to it.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Sample {
    filepath: PathBuf,
    #[serde(default)]
    metadata: Option<MediaMetadata>,
    #[serde(default)]
    fields: BTreeMap<String, TemporalDetections>,
}

impl Sample {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Sample {
            filepath: filepath.into(),
            ..Default::default()
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn metadata(&self) -> Option<&MediaMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: Option<MediaMetadata>) {
        self.metadata = metadata;
    }

    /// Runs `probe` on the sample's file. A failed probe leaves the metadata
    /// unset and is only logged: the file may live elsewhere or appear later.
    pub fn compute_metadata(&mut self, probe: &dyn MetadataProbe) {
        match probe.probe(&self.filepath) {
            Ok(metadata) => self.metadata = Some(metadata),
            Err(e) => {
                log::warn!("Could not compute metadata for {}: {e:#}", self.filepath.display());
                self.metadata = None;
            }
        }
    }

    pub fn set_field(&mut self, name: impl Into<String>, detections: TemporalDetections) {
        self.fields.insert(name.into(), detections);
    }

    pub fn field(&self, name: &str) -> Option<&TemporalDetections> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detection::TemporalDetection, metadata::FileSystemProbe};

    #[test]
    fn missing_file_leaves_metadata_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut sample = Sample::new(dir.path().join("absent.mp4"));
        sample.compute_metadata(&FileSystemProbe);
        assert!(sample.metadata().is_none());
    }

    #[test]
    fn compute_metadata_on_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.mkv");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let mut sample = Sample::new(&path);
        sample.compute_metadata(&FileSystemProbe);
        let metadata = sample.metadata().unwrap();
        assert_eq!(metadata.size_bytes, 4);
        assert_eq!(metadata.mime_type.as_deref(), Some("video/x-matroska"));
    }

    #[test]
    fn set_field_replaces_previous_value() {
        let mut sample = Sample::new("v.mp4");
        let first = TemporalDetection::from_timestamps([0, 1], "a", &sample);
        let second = TemporalDetection::from_timestamps([1, 2], "b", &sample);

        sample.set_field("steps", TemporalDetections::new(vec![first]));
        sample.set_field("steps", TemporalDetections::new(vec![second.clone()]));

        let field = sample.field("steps").unwrap();
        assert_eq!(field.detections, vec![second]);
        assert!(sample.field("other").is_none());
    }
}
