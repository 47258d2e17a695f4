//! Path utilities: scratch locations, segment naming and input expansion

use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::domain::errors::DomainError;

/// Name of the scratch subdirectory under the system temp location
pub const SCRATCH_DIR_NAME: &str = "highlight_reel_segments";

/// Extensions treated as video when expanding directories
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "ts", "avi"];

/// Default scratch directory for intermediate segments
pub fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join(SCRATCH_DIR_NAME)
}

/// Check whether a path carries one of the supported video extensions
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Expand directories into the video files they contain.
///
/// Plain paths are kept as given, including duplicates and paths that do
/// not exist (those are skipped later when probing fails).
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DomainError> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                DomainError::Io(format!("Failed to read {}: {}", input.display(), e))
            })?;
            if entry.file_type().is_file() && is_video_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

/// Generates collision-free file names for the segments of one run.
///
/// Names combine the source stem, the per-file segment index, a
/// nanosecond timestamp and a run-wide ordinal, so they stay unique across
/// concurrent writers and across runs sharing a scratch directory.
#[derive(Debug)]
pub struct SegmentNamer {
    dir: PathBuf,
    ordinal: u64,
}

impl SegmentNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ordinal: 0,
        }
    }

    /// Path for segment `index` of `source`
    pub fn next_path(&mut self, source: &Path, index: usize) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "segment".to_string());
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.ordinal += 1;

        self.dir.join(format!(
            "{}_seg_{}_{}_{}.mp4",
            stem, index, nanos, self.ordinal
        ))
    }
}
