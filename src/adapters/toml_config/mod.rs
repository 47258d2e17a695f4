// Config adapter - Job configuration layers from files and environment

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::JobConfig;
use crate::error::{ReelError, ReelResult};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(ReelError::UnsupportedConfigFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Partial job configuration. Unset fields fall through to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfigLayer {
    pub files: Option<Vec<PathBuf>>,
    pub count_min: Option<u32>,
    pub count_max: Option<u32>,
    pub segment_min: Option<u32>,
    pub segment_max: Option<u32>,
    pub start_offset_min: Option<u32>,
    pub random_time: Option<bool>,
    pub shuffle_segments: Option<bool>,
    pub gpu: Option<bool>,
    pub output_path: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub cleanup_on_failure: Option<bool>,
    pub transcode_timeout_secs: Option<u64>,
}

/// On-disk layout: every format nests the job under a `job` table
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    job: JobConfigLayer,
}

impl JobConfigLayer {
    /// Load a layer from a `.toml`, `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: &Path) -> ReelResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        info!(path = %path.display(), ?format, "Loading configuration file");
        Self::parse(&content, format)
    }

    /// Parse a layer from file content
    pub fn parse(content: &str, format: ConfigFormat) -> ReelResult<Self> {
        let file: ConfigFile = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(file.job)
    }

    /// Read the `REEL_*` environment variables
    pub fn from_env() -> ReelResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a layer from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ReelResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let layer = Self {
            files: None,
            count_min: parse_var(&lookup, "REEL_COUNT_MIN")?,
            count_max: parse_var(&lookup, "REEL_COUNT_MAX")?,
            segment_min: parse_var(&lookup, "REEL_SEGMENT_MIN")?,
            segment_max: parse_var(&lookup, "REEL_SEGMENT_MAX")?,
            start_offset_min: parse_var(&lookup, "REEL_START_OFFSET_MIN")?,
            random_time: bool_var(&lookup, "REEL_RANDOM_TIME")?,
            shuffle_segments: bool_var(&lookup, "REEL_SHUFFLE")?,
            gpu: bool_var(&lookup, "REEL_GPU")?,
            output_path: lookup("REEL_OUTPUT").map(PathBuf::from),
            scratch_dir: lookup("REEL_SCRATCH_DIR").map(PathBuf::from),
            seed: parse_var(&lookup, "REEL_SEED")?,
            cleanup_on_failure: None,
            transcode_timeout_secs: None,
        };

        if layer != Self::default() {
            info!("Applied environment configuration overrides");
        }
        Ok(layer)
    }

    /// Combine with a higher-precedence layer; its set fields win
    pub fn overlay(self, higher: JobConfigLayer) -> Self {
        Self {
            files: higher.files.or(self.files),
            count_min: higher.count_min.or(self.count_min),
            count_max: higher.count_max.or(self.count_max),
            segment_min: higher.segment_min.or(self.segment_min),
            segment_max: higher.segment_max.or(self.segment_max),
            start_offset_min: higher.start_offset_min.or(self.start_offset_min),
            random_time: higher.random_time.or(self.random_time),
            shuffle_segments: higher.shuffle_segments.or(self.shuffle_segments),
            gpu: higher.gpu.or(self.gpu),
            output_path: higher.output_path.or(self.output_path),
            scratch_dir: higher.scratch_dir.or(self.scratch_dir),
            seed: higher.seed.or(self.seed),
            cleanup_on_failure: higher.cleanup_on_failure.or(self.cleanup_on_failure),
            transcode_timeout_secs: higher
                .transcode_timeout_secs
                .or(self.transcode_timeout_secs),
        }
    }

    /// Fill `base` with every field this layer sets
    pub fn apply(self, base: JobConfig) -> JobConfig {
        JobConfig {
            files: self.files.unwrap_or(base.files),
            count_min: self.count_min.unwrap_or(base.count_min),
            count_max: self.count_max.unwrap_or(base.count_max),
            segment_min: self.segment_min.unwrap_or(base.segment_min),
            segment_max: self.segment_max.unwrap_or(base.segment_max),
            start_offset_min: self.start_offset_min.unwrap_or(base.start_offset_min),
            random_time: self.random_time.unwrap_or(base.random_time),
            shuffle_segments: self.shuffle_segments.unwrap_or(base.shuffle_segments),
            gpu: self.gpu.unwrap_or(base.gpu),
            output_path: self.output_path.unwrap_or(base.output_path),
            scratch_dir: self.scratch_dir.or(base.scratch_dir),
            seed: self.seed.or(base.seed),
            cleanup_on_failure: self.cleanup_on_failure.unwrap_or(base.cleanup_on_failure),
            transcode_timeout_secs: self.transcode_timeout_secs.or(base.transcode_timeout_secs),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> ReelResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ReelError::config(format!("Invalid value for {}: {}", key, value))),
        None => Ok(None),
    }
}

fn bool_var<F>(lookup: &F, key: &str) -> ReelResult<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ReelError::config(format!(
                "Invalid boolean value for {}: {}",
                key, value
            ))),
        },
        None => Ok(None),
    }
}
