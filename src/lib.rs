/*

Label file (`time_stamp` entries are HH:MM:SS):

{
  "video_ID": "v.mp4",
  "time_stamp": [
    { "step_label": "incision", "start_time": "00:00:05", "end_time": "00:00:20" }
  ]
}

becomes a dataset with one sample `<dataset_path>/v.mp4` whose
`procedure_step` field holds one temporal detection per step.

*/

pub mod dataset;
pub mod detection;
pub mod file;
pub mod ingest;
pub mod labels;
pub mod metadata;
pub mod operator;
pub mod sample;
pub mod store;
pub mod timestamp;

pub use dataset::Dataset;
pub use detection::{TemporalDetection, TemporalDetections};
pub use ingest::{
    DISTINCT_LABELS_PATH, IngestOptions, PROCEDURE_STEP_FIELD, create_labeled_steps_dataset,
};
pub use labels::{StepEntry, StepLabelFile, load_label_file};
pub use metadata::{FileSystemProbe, MediaMetadata, MetadataProbe};
pub use operator::{IngestSummary, IngestTemporalLabels, Operator};
pub use sample::Sample;
pub use store::{CollectionStore, DirectoryStore, MemoryStore, StoreError};
