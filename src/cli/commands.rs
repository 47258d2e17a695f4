//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::cli::args::{PlanArgs, ProbeArgs, RunArgs};
use crate::config_initialization::resolve_job_config;
use crate::domain::model::{RunOutcome, SegmentRequest};
use crate::utils::path::expand_inputs;
use crate::utils::time::format_hms;

/// Execute the run command
pub async fn run(config_file: Option<&Path>, args: RunArgs) -> Result<()> {
    let config = resolve_job_config(config_file, args.to_layer())
        .context("Failed to resolve job configuration")?;
    info!(
        files = config.files.len(),
        output = %config.output_path.display(),
        "Starting run"
    );

    let container = DefaultAppContainer::new();
    let session = container.job_session();
    let mut handle = session.start(config).context("Failed to start job")?;

    let outcome = loop {
        tokio::select! {
            joined = &mut handle => break joined.context("Job task failed")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                if session.stop() {
                    warn!("Stopping: waiting for in-flight segments to finish");
                }
            }
        }
    };

    match outcome {
        RunOutcome::Completed { output_path } => {
            println!("{}", output_path.display());
            Ok(())
        }
        RunOutcome::Cancelled => Err(anyhow::anyhow!("Run cancelled")),
        RunOutcome::Failed { message } => Err(anyhow::anyhow!(message)),
    }
}

/// Execute the plan command
pub async fn plan(config_file: Option<&Path>, args: PlanArgs) -> Result<()> {
    let config = resolve_job_config(config_file, args.planning.to_layer())
        .context("Failed to resolve job configuration")?;

    let container = DefaultAppContainer::new();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut requests = container.plan_interactor().plan(&config, &mut rng).await;
    if config.shuffle_segments {
        requests.shuffle(&mut rng);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&requests)
            .context("Failed to serialize plan to JSON")?;
        println!("{}", json);
    } else {
        display_plan(&requests);
    }

    info!(segments = requests.len(), "Plan completed");
    Ok(())
}

#[derive(Serialize)]
struct ProbeReport {
    path: PathBuf,
    duration_seconds: Option<f64>,
    error: Option<String>,
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs) -> Result<()> {
    let files = expand_inputs(&args.inputs).context("Failed to expand inputs")?;
    let probe_port = DefaultAppContainer::new().ports().probe;

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let report = match probe_port.probe_duration(&path).await {
            Ok(duration) => ProbeReport {
                path,
                duration_seconds: Some(duration),
                error: None,
            },
            Err(err) => ProbeReport {
                path,
                duration_seconds: None,
                error: Some(err.to_string()),
            },
        };
        reports.push(report);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize probe results to JSON")?;
        println!("{}", json);
    } else {
        for report in &reports {
            match (report.duration_seconds, &report.error) {
                (Some(duration), _) => {
                    println!("{}\t{}", format_hms(duration), report.path.display())
                }
                (None, Some(error)) => println!("error\t{}: {}", report.path.display(), error),
                (None, None) => {}
            }
        }
    }

    Ok(())
}

/// Display a plan in human-readable format
fn display_plan(requests: &[SegmentRequest]) {
    println!("Segment Plan");
    println!("============");
    if requests.is_empty() {
        println!("No segments planned");
        return;
    }

    for (i, request) in requests.iter().enumerate() {
        println!(
            "{:>4}  {} -> {} ({:.3}s)  {}",
            i + 1,
            format_hms(request.start_seconds),
            format_hms(request.end_seconds()),
            request.duration_seconds,
            request.source_path.display()
        );
    }

    let total: f64 = requests.iter().map(|r| r.duration_seconds).sum();
    println!();
    println!("{} segments, {} total", requests.len(), format_hms(total));
}
