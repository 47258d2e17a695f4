//! Concatenation of surviving segments into the final artifact

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::{ConcatPort, ReportPort};

/// Lines of collaborator diagnostics carried into a failure message
const DIAGNOSTIC_TAIL_LINES: usize = 8;

/// Merges the segments that actually exist on disk, in planned order.
pub struct ConcatStage {
    concatenator: Arc<dyn ConcatPort>,
    reporter: Arc<dyn ReportPort>,
    timeout: Option<Duration>,
}

impl ConcatStage {
    pub fn new(concatenator: Arc<dyn ConcatPort>, reporter: Arc<dyn ReportPort>) -> Self {
        Self {
            concatenator,
            reporter,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Concatenate the survivors of `requests` into `output_path`.
    ///
    /// Segment files are deleted only when the merge succeeds.
    pub async fn run(
        &self,
        requests: &[SegmentRequest],
        output_path: &Path,
        acceleration: Acceleration,
    ) -> RunOutcome {
        let survivors = existing_segments(requests).await;
        if survivors.is_empty() {
            warn!(planned = requests.len(), "No segment survived extraction");
            return RunOutcome::failed("Extraction failed for all segments");
        }

        info!(
            survivors = survivors.len(),
            planned = requests.len(),
            output = %output_path.display(),
            "Concatenating segments"
        );
        self.reporter.log(&format!(
            "Concatenating {} of {} segments...",
            survivors.len(),
            requests.len()
        ));

        if let Err(err) = self.concat_bounded(&survivors, output_path, acceleration).await {
            return RunOutcome::failed(failure_message(&err));
        }

        self.reporter.progress(100);
        remove_segments(&survivors).await;
        RunOutcome::Completed {
            output_path: output_path.to_path_buf(),
        }
    }

    async fn concat_bounded(
        &self,
        segments: &[PathBuf],
        output_path: &Path,
        acceleration: Acceleration,
    ) -> Result<String, DomainError> {
        let call = self.concatenator.concat(segments, output_path, acceleration);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| DomainError::Timeout {
                    operation: "concat".to_string(),
                    seconds: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}

/// Planned outputs that exist as regular files, in planned order
pub async fn existing_segments(requests: &[SegmentRequest]) -> Vec<PathBuf> {
    let mut existing = Vec::with_capacity(requests.len());
    for request in requests {
        let is_file = tokio::fs::metadata(&request.output_path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            existing.push(request.output_path.clone());
        }
    }
    existing
}

/// Delete temporary segment files, logging (not failing on) errors
pub async fn remove_segments(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %err, "Failed to remove temporary segment");
        }
    }
}

fn failure_message(err: &DomainError) -> String {
    let tail = err
        .diagnostics()
        .map(|text| {
            let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
            let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
            lines[start..].join("\n")
        })
        .unwrap_or_default();

    if tail.is_empty() {
        format!("Concat failed: {}", err)
    } else {
        format!("Concat failed: {}\n{}", err, tail)
    }
}
