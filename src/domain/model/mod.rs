// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;


/// Concurrency cap for in-flight transcoder invocations
pub const MAX_CONCURRENT_EXTRACTIONS: usize = 4;

/// Share of overall progress assigned to the extraction phase
pub const EXTRACTION_PROGRESS_WEIGHT: u32 = 80;

/// Upper bound on segments drawn per file
pub const MAX_SEGMENTS_PER_FILE: u32 = 1000;

/// Upper bound on segment length, in seconds
pub const MAX_SEGMENT_SECONDS: u32 = 86_400;

/// Upper bound on the start offset, in minutes
pub const MAX_START_OFFSET_MIN: u32 = 1440;

/// Upper bound on the per-call wait, in seconds
pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;

/// Immutable description of one highlight run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Source videos, in planning order. Duplicates are allowed.
    pub files: Vec<PathBuf>,
    /// Inclusive lower bound on segments drawn per file
    pub count_min: u32,
    /// Inclusive upper bound on segments drawn per file
    pub count_max: u32,
    /// Inclusive lower bound on segment length, in seconds
    pub segment_min: u32,
    /// Inclusive upper bound on segment length, in seconds
    pub segment_max: u32,
    /// Minutes skipped at the start of every source
    pub start_offset_min: u32,
    /// Randomized placement instead of sequential packing
    pub random_time: bool,
    /// Shuffle the concatenation order across all files
    pub shuffle_segments: bool,
    /// Use the hardware-accelerated encode path
    pub gpu: bool,
    /// Destination of the merged artifact
    pub output_path: PathBuf,
    /// Override for the scratch directory holding intermediate segments
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible plans
    #[serde(default)]
    pub seed: Option<u64>,
    /// Remove surviving segments even when the run fails
    #[serde(default)]
    pub cleanup_on_failure: bool,
    /// Bounded wait for each external transcoder/concatenator call
    #[serde(default)]
    pub transcode_timeout_secs: Option<u64>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            count_min: 3,
            count_max: 5,
            segment_min: 5,
            segment_max: 10,
            start_offset_min: 0,
            random_time: false,
            shuffle_segments: false,
            gpu: false,
            output_path: PathBuf::from("output.mp4"),
            scratch_dir: None,
            seed: None,
            cleanup_on_failure: false,
            transcode_timeout_secs: None,
        }
    }
}

impl JobConfig {
    /// Check the bounds every run relies on
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.files.is_empty() {
            return Err(DomainError::BadArgs("No input files given".to_string()));
        }
        if self.count_min < 1 {
            return Err(DomainError::BadArgs(
                "count_min must be at least 1".to_string(),
            ));
        }
        if self.count_max > MAX_SEGMENTS_PER_FILE {
            return Err(DomainError::BadArgs(format!(
                "count_max must not exceed {}",
                MAX_SEGMENTS_PER_FILE
            )));
        }
        if self.count_min > self.count_max {
            return Err(DomainError::BadArgs(format!(
                "count_min ({}) must not exceed count_max ({})",
                self.count_min, self.count_max
            )));
        }
        if self.segment_min < 1 {
            return Err(DomainError::BadArgs(
                "segment_min must be at least 1 second".to_string(),
            ));
        }
        if self.segment_max > MAX_SEGMENT_SECONDS {
            return Err(DomainError::BadArgs(format!(
                "segment_max must not exceed {} seconds",
                MAX_SEGMENT_SECONDS
            )));
        }
        if self.segment_min > self.segment_max {
            return Err(DomainError::BadArgs(format!(
                "segment_min ({}) must not exceed segment_max ({})",
                self.segment_min, self.segment_max
            )));
        }
        if self.start_offset_min > MAX_START_OFFSET_MIN {
            return Err(DomainError::BadArgs(format!(
                "start_offset_min must not exceed {} minutes",
                MAX_START_OFFSET_MIN
            )));
        }
        if let Some(secs) = self.transcode_timeout_secs {
            if !(1..=MAX_TIMEOUT_SECONDS).contains(&secs) {
                return Err(DomainError::BadArgs(format!(
                    "transcode_timeout_secs must be between 1 and {}",
                    MAX_TIMEOUT_SECONDS
                )));
            }
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(DomainError::BadArgs("Output path cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Footage skipped at the start of every source, in seconds
    pub fn min_start_offset_seconds(&self) -> f64 {
        f64::from(self.start_offset_min) * 60.0
    }

    pub fn acceleration(&self) -> Acceleration {
        if self.gpu {
            Acceleration::Nvenc
        } else {
            Acceleration::Software
        }
    }

    /// Scratch directory for intermediate segment files
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(crate::utils::path::default_scratch_dir)
    }

    pub fn transcode_timeout(&self) -> Option<std::time::Duration> {
        self.transcode_timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// One planned extraction. Never mutated after planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub source_path: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub output_path: PathBuf,
}

impl SegmentRequest {
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }

    /// True when the segment lies inside a source of the given duration
    pub fn fits_within(&self, source_duration: f64) -> bool {
        self.start_seconds >= 0.0
            && self.duration_seconds > 0.0
            && self.end_seconds() <= source_duration
    }

    /// File name of the intermediate output, for log lines
    pub fn output_name(&self) -> String {
        file_name_lossy(&self.output_path)
    }
}

impl fmt::Display for SegmentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.3}s +{:.3}s]",
            self.source_path.display(),
            self.start_seconds,
            self.duration_seconds
        )
    }
}

/// Encoder path selected for transcoding and concatenation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceleration {
    /// libx264 on the CPU
    Software,
    /// NVIDIA NVENC
    Nvenc,
}

impl Acceleration {
    pub fn video_codec(&self) -> &'static str {
        match self {
            Acceleration::Software => "libx264",
            Acceleration::Nvenc => "h264_nvenc",
        }
    }

    /// Preset used when extracting segments
    pub fn extract_preset(&self) -> &'static str {
        match self {
            Acceleration::Software => "fast",
            Acceleration::Nvenc => "p7",
        }
    }

    /// Preset used for the final concatenation
    pub fn concat_preset(&self) -> &'static str {
        match self {
            Acceleration::Software => "medium",
            Acceleration::Nvenc => "p7",
        }
    }
}

/// Lifecycle state of a job session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// Terminal outcome of one run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed { output_path: PathBuf },
    Failed { message: String },
    Cancelled,
}

impl RunOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        RunOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// One-line message delivered with the `finished` report
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Completed { output_path } => output_path.display().to_string(),
            RunOutcome::Failed { message } => message.clone(),
            RunOutcome::Cancelled => "Cancelled".to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        match self {
            RunOutcome::Completed { .. } => SessionState::Completed,
            RunOutcome::Failed { .. } => SessionState::Failed,
            RunOutcome::Cancelled => SessionState::Cancelled,
        }
    }
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
