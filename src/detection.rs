use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// A labeled span of a video, in whole seconds.
///
/// `end_second >= start_second` is expected but not enforced; inverted or
/// zero-length spans are stored as given.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TemporalDetection {
    pub label: String,
    pub start_second: u64,
    pub end_second: u64,
    /// 1-based `[first, last]` frame numbers, when the sample's frame rate is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<[u64; 2]>,
}

impl TemporalDetection {
    pub fn from_timestamps(timestamps: [u64; 2], label: impl Into<String>, sample: &Sample) -> Self {
        let [start_second, end_second] = timestamps;
        let support = sample.metadata().filter(|m| m.has_frame_rate()).and_then(|metadata| {
            let frame_rate = metadata.frame_rate?;
            let to_frame = |second: u64| {
                // the cast saturates at u64::MAX for very long spans
                let frame = ((second as f64 * frame_rate).round() as u64).saturating_add(1);
                match metadata.frame_count {
                    Some(count) if count > 0 => frame.min(count),
                    _ => frame,
                }
            };
            Some([to_frame(start_second), to_frame(end_second)])
        });

        TemporalDetection {
            label: label.into(),
            start_second,
            end_second,
            support,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.end_second.saturating_sub(self.start_second)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalDetections {
    pub detections: Vec<TemporalDetection>,
}

impl TemporalDetections {
    pub fn new(detections: Vec<TemporalDetection>) -> Self {
        TemporalDetections { detections }
    }
    pub fn len(&self) -> usize {
        self.detections.len()
    }
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &TemporalDetection> {
        self.detections.iter()
    }
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.label.as_str())
    }
}

impl<'a> IntoIterator for &'a TemporalDetections {
    type Item = &'a TemporalDetection;
    type IntoIter = std::slice::Iter<'a, TemporalDetection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
