use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MediaMetadata {
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub container_format: Option<String>, // e.g. "mkv", "mp4"

    // Stream info, only known when a decoding probe is plugged in
    #[serde(default, with = "humantime_serde")]
    pub duration: Option<Duration>,
    pub frame_rate: Option<f64>,
    pub frame_count: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MediaMetadata {
    pub fn has_frame_rate(&self) -> bool {
        self.frame_rate.is_some_and(|fps| fps > 0.0)
    }
}

/// Computes metadata for a media file.
///
/// Implementations that decode streams (ffprobe, symphonia, ...) live with
/// the host; this crate only ships [`FileSystemProbe`].
pub trait MetadataProbe {
    fn probe(&self, path: &Path) -> Result<MediaMetadata>;
}

/// Fills what the filesystem can tell without opening the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemProbe;

impl MetadataProbe for FileSystemProbe {
    fn probe(&self, path: &Path) -> Result<MediaMetadata> {
        let file_metadata = fs::metadata(path)
            .with_context(|| format!("Failed to stat media file: {}", path.display()))?;
        if !file_metadata.is_file() {
            anyhow::bail!("Not a regular file: {}", path.display());
        }

        let container_format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let mime_type = container_format
            .as_deref()
            .and_then(mime_type_for_extension)
            .map(str::to_owned);

        Ok(MediaMetadata {
            size_bytes: file_metadata.len(),
            mime_type,
            container_format,
            ..Default::default()
        })
    }
}

fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        "ts" => "video/mp2t",
        _ => return None,
    };
    Some(mime)
}
