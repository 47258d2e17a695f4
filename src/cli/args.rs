//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::adapters::toml_config::JobConfigLayer;
use crate::domain::model::{
    MAX_SEGMENTS_PER_FILE, MAX_SEGMENT_SECONDS, MAX_START_OFFSET_MIN, MAX_TIMEOUT_SECONDS,
};

fn parse_count(s: &str) -> Result<u32, String> {
    number_range(s, 1, MAX_SEGMENTS_PER_FILE)
}

fn parse_segment_seconds(s: &str) -> Result<u32, String> {
    number_range(s, 1, MAX_SEGMENT_SECONDS)
}

fn parse_offset_minutes(s: &str) -> Result<u32, String> {
    number_range(s, 0, MAX_START_OFFSET_MIN)
}

fn parse_timeout_seconds(s: &str) -> Result<u64, String> {
    number_range(s, 1, MAX_TIMEOUT_SECONDS)
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

/// Inputs and sampling policy shared by `run` and `plan`
#[derive(Args, Debug)]
pub struct PlanningArgs {
    /// Input video files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Minimum segments drawn per file
    #[arg(long, value_parser = parse_count)]
    pub count_min: Option<u32>,

    /// Maximum segments drawn per file
    #[arg(long, value_parser = parse_count)]
    pub count_max: Option<u32>,

    /// Minimum segment length (seconds)
    #[arg(long, value_parser = parse_segment_seconds)]
    pub segment_min: Option<u32>,

    /// Maximum segment length (seconds)
    #[arg(long, value_parser = parse_segment_seconds)]
    pub segment_max: Option<u32>,

    /// Minutes to skip at the start of every file
    #[arg(long, value_parser = parse_offset_minutes)]
    pub start_offset_min: Option<u32>,

    /// Place segments at random times instead of packing them sequentially
    #[arg(long)]
    pub random_time: bool,

    /// Shuffle segment order across all files
    #[arg(long)]
    pub shuffle: bool,

    /// Seed for reproducible plans
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for intermediate segment files
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,
}

impl PlanningArgs {
    pub fn to_layer(&self) -> JobConfigLayer {
        JobConfigLayer {
            files: Some(self.inputs.clone()),
            count_min: self.count_min,
            count_max: self.count_max,
            segment_min: self.segment_min,
            segment_max: self.segment_max,
            start_offset_min: self.start_offset_min,
            random_time: flag(self.random_time),
            shuffle_segments: flag(self.shuffle),
            seed: self.seed,
            scratch_dir: self.scratch_dir.clone(),
            ..Default::default()
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub planning: PlanningArgs,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use hardware-accelerated (NVENC) encoding
    #[arg(long)]
    pub gpu: bool,

    /// Remove leftover segments even when the run fails
    #[arg(long)]
    pub cleanup_on_failure: bool,

    /// Seconds to wait for each ffmpeg call before killing it
    #[arg(long, value_parser = parse_timeout_seconds)]
    pub timeout: Option<u64>,
}

impl RunArgs {
    pub fn to_layer(&self) -> JobConfigLayer {
        JobConfigLayer {
            output_path: self.output.clone(),
            gpu: flag(self.gpu),
            cleanup_on_failure: flag(self.cleanup_on_failure),
            transcode_timeout_secs: self.timeout,
            ..self.planning.to_layer()
        }
    }
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub planning: PlanningArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
