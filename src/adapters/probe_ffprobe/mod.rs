//! FFprobe adapter for media duration probing

use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::exec_ffmpeg::hidden_command;
use crate::domain::errors::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    program: OsString,
}

impl FfprobeAdapter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        let output = hidden_command(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(file_path)
            .output()
            .await
            .map_err(|e| DomainError::ProbeFailed {
                path: file_path.display().to_string(),
                message: format!("failed to launch ffprobe: {}", e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::ProbeFailed {
                path: file_path.display().to_string(),
                message: format!("ffprobe failed: {}, output: {}", output.status, stderr.trim()),
            });
        }

        let duration = parse_duration(&stdout).map_err(|message| DomainError::ProbeFailed {
            path: file_path.display().to_string(),
            message,
        })?;
        debug!(file = %file_path.display(), duration, "ffprobe duration");
        Ok(duration)
    }
}

/// Parse ffprobe's bare `format=duration` output
pub fn parse_duration(output: &str) -> Result<f64, String> {
    let trimmed = output.trim();
    let duration: f64 = trimmed
        .parse()
        .map_err(|e| format!("failed to parse duration '{}': {}", trimmed, e))?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(format!("invalid duration '{}'", trimmed));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("600.040000\n").unwrap(), 600.04);
        assert_eq!(parse_duration("  12\r\n").unwrap(), 12.0);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("inf").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_probe_error() {
        let adapter = FfprobeAdapter::new("definitely-not-a-real-ffprobe-binary");
        let err = adapter
            .probe_duration(Path::new("video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProbeFailed { .. }));
    }
}
