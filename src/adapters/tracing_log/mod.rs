// Tracing reporter - Reporting sink backed by structured tracing events

use tracing::{error, info};

use crate::ports::*;

/// Reporting sink that turns log, progress and terminal events into
/// tracing events under the `reel::report` target.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for TracingReporter {
    fn log(&self, message: &str) {
        info!(target: "reel::report", "{}", message);
    }

    fn progress(&self, percent: u32) {
        info!(target: "reel::report", percent, "Progress {}%", percent);
    }

    fn finished(&self, success: bool, message: &str) {
        if success {
            info!(target: "reel::report", success, "Finished: {}", message);
        } else {
            error!(target: "reel::report", success, "Failed: {}", message);
        }
    }
}
