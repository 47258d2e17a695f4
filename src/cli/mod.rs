//! CLI module
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Highlight Reel
///
/// Samples segments from a set of videos and stitches them into one file.
#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(about = "Highlight Reel - sample segments from many videos into one")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format: text or json
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,

    /// Job configuration file (.toml, .json, .yaml)
    #[arg(long, global = true, env = "REEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan, extract and concatenate a highlight reel
    Run(args::RunArgs),
    /// Probe and plan only; print the segments that would be extracted
    Plan(args::PlanArgs),
    /// Print the duration of each input
    Probe(args::ProbeArgs),
}
