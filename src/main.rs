//! Highlight Reel CLI
//!
//! Samples segments from a set of source videos, extracts each one into a
//! normalized intermediate file and concatenates the survivors into one
//! output file.
//!
//! # Usage
//!
//! ```bash
//! reel run ./footage -o reel.mp4 --count-min 2 --count-max 4 --random-time
//! reel plan a.mp4 b.mkv --segment-min 5 --segment-max 10 --json
//! reel probe ./footage
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use highlight_reel::cli::{commands, Cli, Commands};
use highlight_reel::utils::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig {
        level: LogLevel::parse(&cli.log_level)?,
        format: LogFormat::parse(&cli.log_format)?,
        ..LoggingConfig::default()
    });

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Highlight Reel");

    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run(config_file, args).await,
        Commands::Plan(args) => commands::plan(config_file, args).await,
        Commands::Probe(args) => commands::probe(args).await,
    }
}
