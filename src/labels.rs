/*

{
  "video_ID": "case_012.mp4",
  "time_stamp": [
    { "step_label": "incision", "start_time": "00:00:05", "end_time": "00:00:20" },
    { "step_label": "suture",   "start_time": "00:00:20", "end_time": "00:01:45" }
  ]
}

*/

use anyhow::{Context, Result};
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

/// A custom temporal label file: one video and its ordered procedure steps.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StepLabelFile {
    /// File name of the video, relative to the dataset directory.
    #[serde(rename = "video_ID")]
    pub video_id: String,
    pub time_stamp: Vec<StepEntry>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StepEntry {
    pub step_label: String,
    pub start_time: String,
    pub end_time: String,
}

impl StepLabelFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let label_file: StepLabelFile =
            serde_json::from_str(json).context("Failed to parse temporal label JSON")?;
        Ok(label_file)
    }

    pub fn num_steps(&self) -> usize {
        self.time_stamp.len()
    }
}

pub fn load_label_file(labels_path: impl AsRef<Path>) -> Result<StepLabelFile> {
    let labels_path = labels_path.as_ref();
    let json = fs::read_to_string(labels_path)
        .with_context(|| format!("Failed to read label file: {}", labels_path.display()))?;
    StepLabelFile::from_json_str(&json)
        .with_context(|| format!("Invalid label file: {}", labels_path.display()))
}
