use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub enum EntryKind {
    File(PathBuf),
    Directory(PathBuf),
    Other(PathBuf), // symlink, device, etc.
}

pub fn list_dir<P: AsRef<Path>>(path: P) -> Result<Vec<EntryKind>> {
    let entries = fs::read_dir(path.as_ref())
        .with_context(|| format!("Failed to read directory: {}", path.as_ref().display()))?;

    let mut results = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        let kind = if file_type.is_file() {
            EntryKind::File(path)
        } else if file_type.is_dir() {
            EntryKind::Directory(path)
        } else {
            EntryKind::Other(path)
        };
        results.push(kind);
    }

    Ok(results)
}

/// File stems of the `*.json` files directly inside `dir`, sorted.
pub fn list_json_stems(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut stems: Vec<String> = list_dir(dir)?
        .into_iter()
        .filter_map(|entry| match entry {
            EntryKind::File(path) if path.extension().is_some_and(|ext| ext == "json") => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned),
            _ => None,
        })
        .collect();
    stems.sort();
    Ok(stems)
}

/// Path of `relative` inside `base_dir`.
///
/// `relative` is always kept under `base_dir`: leading separators are
/// dropped instead of letting an absolute name replace the directory.
pub fn join_media_path(base_dir: impl AsRef<Path>, relative: &str) -> PathBuf {
    let relative = relative.trim_start_matches(['/', '\\']);
    base_dir.as_ref().join(relative)
}

/// Serializes `value` as pretty JSON next to `path`, then renames it into place.
pub fn write_json_atomically<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    let json = serde_json::to_string_pretty(value)?;
    writeln!(temp_file, "{}", json)?;
    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
