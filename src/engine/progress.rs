//! Progress accounting for concurrent extraction tasks

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::model::EXTRACTION_PROGRESS_WEIGHT;
use crate::ports::ReportPort;
use crate::utils::weighted_percent;

/// Shared counter of extraction tasks that reached a terminal state.
///
/// Every increment, together with the percentage and log line it
/// produces, happens inside one critical section, so reports are never
/// lost or interleaved. The counter only moves forward.
pub struct ExtractionProgress {
    done: Mutex<usize>,
    total: usize,
    reporter: Arc<dyn ReportPort>,
}

impl ExtractionProgress {
    pub fn new(total: usize, reporter: Arc<dyn ReportPort>) -> Self {
        Self {
            done: Mutex::new(0),
            total,
            reporter,
        }
    }

    /// Record one finished task and report it. Returns the new count.
    pub async fn complete(&self, message: &str) -> usize {
        let mut done = self.done.lock().await;
        *done += 1;
        let percent = weighted_percent(*done, self.total, EXTRACTION_PROGRESS_WEIGHT);
        self.reporter.progress(percent);
        self.reporter.log(message);
        *done
    }

    pub async fn done(&self) -> usize {
        *self.done.lock().await
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
