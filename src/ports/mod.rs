// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for determining a source's duration
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file, in seconds
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError>;
}

/// Port for extracting one normalized segment.
///
/// Implementations must normalize output to a fixed profile so segments
/// can be concatenated, and must create the output directory as needed.
/// On success the returned string is the collaborator's diagnostic text.
#[async_trait]
pub trait TranscodePort: Send + Sync {
    async fn extract(
        &self,
        request: &SegmentRequest,
        acceleration: Acceleration,
    ) -> Result<String, DomainError>;
}

/// Port for merging normalized segments, in order, into one file
#[async_trait]
pub trait ConcatPort: Send + Sync {
    async fn concat(
        &self,
        segments: &[PathBuf],
        output_path: &Path,
        acceleration: Acceleration,
    ) -> Result<String, DomainError>;
}

/// Port for the UI/log boundary. All calls are fire-and-forget.
pub trait ReportPort: Send + Sync {
    /// Free-text log line
    fn log(&self, message: &str);

    /// Overall progress, 0-100
    fn progress(&self, percent: u32);

    /// Terminal outcome of a run; emitted once per run
    fn finished(&self, success: bool, message: &str);
}
