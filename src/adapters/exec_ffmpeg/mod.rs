//! FFmpeg execution adapter
//!
//! Extracts normalized segments and concatenates them by running the
//! `ffmpeg` executable.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::ffmpeg_seconds;

/// Normalization filter: fit into 1080p and pad to the full frame
const NORMALIZE_FILTER: &str =
    "scale=1920:1080:force_original_aspect_ratio=decrease,pad=1920:1080:(ow-iw)/2:(oh-ih)/2";
const OUTPUT_FRAME_RATE: &str = "30";

/// Build a command that is killed when dropped and, on Windows, does not
/// open a console window.
pub(crate) fn hidden_command<S: AsRef<OsStr>>(program: S) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    #[cfg(windows)]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}

/// FFmpeg-based transcoder and concatenator
pub struct FfmpegAdapter {
    program: OsString,
}

impl FfmpegAdapter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl TranscodePort for FfmpegAdapter {
    async fn extract(
        &self,
        request: &SegmentRequest,
        acceleration: Acceleration,
    ) -> Result<String, DomainError> {
        ensure_parent_dir(&request.output_path).await?;

        let args = extract_args(request, acceleration);
        debug!(segment = %request, ?args, "Running ffmpeg extract");
        let output = hidden_command(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| DomainError::TranscodeFailed {
                message: format!("failed to launch ffmpeg: {}", e),
                diagnostics: String::new(),
            })?;

        let diagnostics = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(DomainError::TranscodeFailed {
                message: format!("ffmpeg exited with {}", output.status),
                diagnostics,
            });
        }
        Ok(diagnostics)
    }
}

#[async_trait]
impl ConcatPort for FfmpegAdapter {
    async fn concat(
        &self,
        segments: &[PathBuf],
        output_path: &Path,
        acceleration: Acceleration,
    ) -> Result<String, DomainError> {
        ensure_parent_dir(output_path).await?;

        let list_dir = tempfile::Builder::new().prefix("concat_").tempdir()?;
        let list_path = list_dir.path().join("list.txt");
        tokio::fs::write(&list_path, concat_list(segments)?).await?;

        let args = concat_args(&list_path, output_path, acceleration);
        debug!(segments = segments.len(), ?args, "Running ffmpeg concat");
        let output = hidden_command(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| DomainError::ConcatFailed {
                message: format!("failed to launch ffmpeg: {}", e),
                diagnostics: String::new(),
            })?;

        let diagnostics = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(DomainError::ConcatFailed {
                message: format!("ffmpeg exited with {}", output.status),
                diagnostics,
            });
        }
        Ok(diagnostics)
    }
}

/// Arguments for extracting and normalizing one segment
pub fn extract_args(request: &SegmentRequest, acceleration: Acceleration) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-err_detect", "ignore_err", "-ignore_unknown", "-ss"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(ffmpeg_seconds(request.start_seconds).into());
    args.push("-i".into());
    args.push(request.source_path.clone().into_os_string());
    args.push("-t".into());
    args.push(ffmpeg_seconds(request.duration_seconds).into());
    args.extend(
        [
            "-vf",
            NORMALIZE_FILTER,
            "-r",
            OUTPUT_FRAME_RATE,
            "-c:v",
            acceleration.video_codec(),
            "-preset",
            acceleration.extract_preset(),
            "-c:a",
            "aac",
            "-ar",
            "44100",
            "-ac",
            "2",
            "-pix_fmt",
            "yuv420p",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(request.output_path.clone().into_os_string());
    args
}

/// Arguments for concatenating the segments named in `list_path`
pub fn concat_args(list_path: &Path, output_path: &Path, acceleration: Acceleration) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(list_path.as_os_str().to_os_string());
    args.extend(
        [
            "-c:v",
            acceleration.video_codec(),
            "-preset",
            acceleration.concat_preset(),
            "-c:a",
            "aac",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(output_path.as_os_str().to_os_string());
    args
}

/// Concat demuxer list: one quoted absolute path per line
pub fn concat_list(segments: &[PathBuf]) -> Result<String, DomainError> {
    let mut list = String::new();
    for segment in segments {
        let absolute = absolute_path(segment)?;
        let normalized = absolute.to_string_lossy().replace('\\', "/");
        list.push_str(&format!("file '{}'\n", normalized.replace('\'', "'\\''")));
    }
    Ok(list)
}

fn absolute_path(path: &Path) -> Result<PathBuf, DomainError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<(), DomainError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(dir).await?;
            Ok(())
        }
        _ => Ok(()),
    }
}
