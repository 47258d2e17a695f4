//! Configuration initialization and hierarchy management

use std::path::Path;

use tracing::{debug, info};

use crate::adapters::toml_config::JobConfigLayer;
use crate::domain::model::JobConfig;
use crate::error::ReelResult;
use crate::utils::path::expand_inputs;

/// Resolve a job configuration following precedence: CLI > Env > File > Defaults.
///
/// Input directories are expanded to the video files they contain and the
/// result is validated.
pub fn resolve_job_config(
    config_file: Option<&Path>,
    cli_layer: JobConfigLayer,
) -> ReelResult<JobConfig> {
    resolve_with_env(config_file, JobConfigLayer::from_env()?, cli_layer)
}

/// Same as [`resolve_job_config`] with an explicit environment layer
pub fn resolve_with_env(
    config_file: Option<&Path>,
    env_layer: JobConfigLayer,
    cli_layer: JobConfigLayer,
) -> ReelResult<JobConfig> {
    info!("Initializing configuration hierarchy");

    let file_layer = match config_file {
        Some(path) => JobConfigLayer::from_file(path)?,
        None => JobConfigLayer::default(),
    };

    let mut config = file_layer
        .overlay(env_layer)
        .overlay(cli_layer)
        .apply(JobConfig::default());

    config.files = expand_inputs(&config.files)?;
    config.validate()?;

    debug!(?config, "Resolved job configuration");
    Ok(config)
}
