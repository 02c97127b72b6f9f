use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::{
    dataset::Dataset,
    detection::{TemporalDetection, TemporalDetections},
    file::join_media_path,
    labels::{StepLabelFile, load_label_file},
    metadata::MetadataProbe,
    sample::Sample,
    store::{CollectionStore, StoreError, validate_dataset_name},
    timestamp::{format_hms, parse_hms},
};

/// Sample field holding the procedure steps.
pub const PROCEDURE_STEP_FIELD: &str = "procedure_step";
/// Path of the step labels for [`Dataset::distinct`].
pub const DISTINCT_LABELS_PATH: &str = "procedure_step.detections.label";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Directory containing the video(s).
    pub dataset_directory: PathBuf,
    pub labels_path: PathBuf,
    pub dataset_name: String,
    pub persistent: bool,
    pub overwrite: bool,
}

impl IngestOptions {
    pub fn new(
        dataset_directory: impl Into<PathBuf>,
        labels_path: impl Into<PathBuf>,
        dataset_name: impl Into<String>,
    ) -> Self {
        IngestOptions {
            dataset_directory: dataset_directory.into(),
            labels_path: labels_path.into(),
            dataset_name: dataset_name.into(),
            persistent: true,
            overwrite: true,
        }
    }
}

/// Builds a dataset holding one video sample whose `procedure_step` field
/// lists the labeled steps of `options.labels_path`, in file order.
///
/// Nothing is written to `store` unless every step parses: the sample is
/// complete before the dataset is created.
pub fn create_labeled_steps_dataset(
    options: &IngestOptions,
    store: &mut dyn CollectionStore,
    probe: &dyn MetadataProbe,
) -> Result<Dataset> {
    let label_data = load_label_file(&options.labels_path)?;

    validate_dataset_name(&options.dataset_name)?;
    if !options.overwrite && store.exists(&options.dataset_name) {
        return Err(StoreError::AlreadyExists(options.dataset_name.clone()).into());
    }

    let sample = build_sample(&label_data, options, probe)?;

    let mut dataset = store.create(&options.dataset_name, options.persistent, options.overwrite)?;
    dataset.add_sample(sample);
    store
        .save(&dataset)
        .with_context(|| format!("Failed to save dataset '{}'", dataset.name()))?;

    log::info!(
        "Dataset '{}' ready with {} sample(s)",
        dataset.name(),
        dataset.len()
    );
    Ok(dataset)
}

fn build_sample(
    label_data: &StepLabelFile,
    options: &IngestOptions,
    probe: &dyn MetadataProbe,
) -> Result<Sample> {
    let filepath = join_media_path(&options.dataset_directory, &label_data.video_id);
    let mut sample = Sample::new(filepath);
    sample.compute_metadata(probe);

    let mut detections = Vec::with_capacity(label_data.num_steps());
    for (index, step) in label_data.time_stamp.iter().enumerate() {
        let start = parse_hms(&step.start_time).with_context(|| {
            format!("Step {index} ({:?}): bad start_time", step.step_label)
        })?;
        let end = parse_hms(&step.end_time).with_context(|| {
            format!("Step {index} ({:?}): bad end_time", step.step_label)
        })?;

        let detection =
            TemporalDetection::from_timestamps([start, end], step.step_label.as_str(), &sample);
        log::info!(
            "Step: {} starts at {} ({}) and ends at {} ({}), {}s",
            step.step_label,
            start,
            format_hms(start),
            end,
            format_hms(end),
            detection.duration_secs()
        );
        detections.push(detection);
    }

    sample.set_field(PROCEDURE_STEP_FIELD, TemporalDetections::new(detections));
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{FileSystemProbe, MediaMetadata},
        store::MemoryStore,
        timestamp::TimestampError,
    };
    use std::{fs, path::Path};

    struct FixedProbe(MediaMetadata);

    impl MetadataProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> Result<MediaMetadata> {
            Ok(self.0.clone())
        }
    }

    fn write_labels(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("labels.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn builds_one_sample_with_ordered_steps() {
        let dir = tempfile::tempdir().unwrap();
        let labels = write_labels(
            dir.path(),
            r#"{"video_ID": "v.mp4", "time_stamp": [
                {"step_label": "incision", "start_time": "00:00:05", "end_time": "00:00:20"},
                {"step_label": "suture", "start_time": "00:01:00", "end_time": "00:02:30"},
                {"step_label": "incision", "start_time": "00:03:00", "end_time": "00:03:10"}
            ]}"#,
        );
        let mut store = MemoryStore::new();
        let options = IngestOptions::new("/data", &labels, "demo");

        let dataset = create_labeled_steps_dataset(&options, &mut store, &FileSystemProbe).unwrap();

        assert_eq!(dataset.len(), 1);
        let sample = &dataset.samples()[0];
        assert_eq!(sample.filepath(), Path::new("/data/v.mp4"));
        let steps: Vec<_> = sample
            .field(PROCEDURE_STEP_FIELD)
            .unwrap()
            .iter()
            .map(|d| (d.label.as_str(), d.start_second, d.end_second))
            .collect();
        assert_eq!(
            steps,
            vec![("incision", 5, 20), ("suture", 60, 150), ("incision", 180, 190)]
        );
        assert_eq!(dataset.distinct(DISTINCT_LABELS_PATH).unwrap().len(), 2);
        assert_eq!(store.load("demo").unwrap(), dataset);
    }

    #[test]
    fn frame_support_uses_probed_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let labels = write_labels(
            dir.path(),
            r#"{"video_ID": "v.mp4", "time_stamp": [
                {"step_label": "cut", "start_time": "00:00:01", "end_time": "00:00:02"}
            ]}"#,
        );
        let probe = FixedProbe(MediaMetadata {
            frame_rate: Some(10.0),
            ..Default::default()
        });
        let mut store = MemoryStore::new();
        let dataset = create_labeled_steps_dataset(
            &IngestOptions::new(dir.path(), &labels, "demo"),
            &mut store,
            &probe,
        )
        .unwrap();

        let detection = &dataset.samples()[0].field(PROCEDURE_STEP_FIELD).unwrap().detections[0];
        assert_eq!(detection.support, Some([11, 21]));
    }

    #[test]
    fn bad_timestamp_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let labels = write_labels(
            dir.path(),
            r#"{"video_ID": "v.mp4", "time_stamp": [
                {"step_label": "ok", "start_time": "00:00:01", "end_time": "00:00:02"},
                {"step_label": "bad", "start_time": "abc", "end_time": "00:00:05"}
            ]}"#,
        );
        let mut store = MemoryStore::new();
        let err = create_labeled_steps_dataset(
            &IngestOptions::new("/data", &labels, "demo"),
            &mut store,
            &FileSystemProbe,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TimestampError>(),
            Some(TimestampError::InvalidField { .. })
        ));
        assert!(!store.exists("demo"));
    }

    #[test]
    fn collision_without_overwrite_fails() {
        let dir = tempfile::tempdir().unwrap();
        let labels = write_labels(dir.path(), r#"{"video_ID": "v.mp4", "time_stamp": []}"#);
        let mut store = MemoryStore::new();
        let mut options = IngestOptions::new("/data", &labels, "X");
        options.overwrite = false;

        create_labeled_steps_dataset(&options, &mut store, &FileSystemProbe).unwrap();
        let err = create_labeled_steps_dataset(&options, &mut store, &FileSystemProbe).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::AlreadyExists("X".to_owned()))
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let labels = write_labels(dir.path(), "{not json");
        let mut store = MemoryStore::new();
        let err = create_labeled_steps_dataset(
            &IngestOptions::new("/data", &labels, "demo"),
            &mut store,
            &FileSystemProbe,
        )
        .unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
        assert!(!store.exists("demo"));
    }
}
