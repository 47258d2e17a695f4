//! Bounded-parallel segment extraction

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::cancel::CancelToken;
use crate::engine::progress::ExtractionProgress;
use crate::ports::{ReportPort, TranscodePort};

/// How the dispatch loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Every request was dispatched and has finished
    Finished { dispatched: usize },
    /// Cancellation was observed; undispatched requests never ran
    Cancelled { dispatched: usize, skipped: usize },
}

impl ExtractionStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractionStatus::Cancelled { .. })
    }

    pub fn dispatched(&self) -> usize {
        match self {
            ExtractionStatus::Finished { dispatched }
            | ExtractionStatus::Cancelled { dispatched, .. } => *dispatched,
        }
    }
}

/// Runs segment extractions through the transcoder with at most
/// `concurrency` invocations in flight.
///
/// A slot is acquired before each submission and the cancellation token is
/// checked right before the task is spawned. Per-segment failures are
/// logged and counted but never stop sibling tasks; callers find the
/// survivors by checking which output files exist.
pub struct ExtractionOrchestrator {
    transcoder: Arc<dyn TranscodePort>,
    reporter: Arc<dyn ReportPort>,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl ExtractionOrchestrator {
    pub fn new(transcoder: Arc<dyn TranscodePort>, reporter: Arc<dyn ReportPort>) -> Self {
        Self {
            transcoder,
            reporter,
            concurrency: MAX_CONCURRENT_EXTRACTIONS,
            timeout: None,
        }
    }

    /// Bound each transcoder call; the child process is killed on expiry
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract every request, returning once all dispatched tasks finished.
    ///
    /// A panic inside a task stops further submissions. Once every
    /// dispatched task has settled, the first panic is re-raised here so
    /// the session converts it into a failed run.
    pub async fn run(
        &self,
        requests: &[SegmentRequest],
        acceleration: Acceleration,
        token: &CancelToken,
    ) -> ExtractionStatus {
        let total = requests.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let progress = Arc::new(ExtractionProgress::new(total, Arc::clone(&self.reporter)));
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(total);
        let halt = CancelToken::new();

        info!(
            segments = total,
            concurrency = self.concurrency,
            "Starting segment extraction"
        );

        let mut status = ExtractionStatus::Finished { dispatched: total };
        for (index, request) in requests.iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            if halt.is_cancelled() {
                warn!(
                    dispatched = index,
                    "A segment task panicked, no further segments will be submitted"
                );
                break;
            }
            if token.is_cancelled() {
                warn!(
                    dispatched = index,
                    skipped = total - index,
                    "Cancellation requested, no further segments will be submitted"
                );
                status = ExtractionStatus::Cancelled {
                    dispatched: index,
                    skipped: total - index,
                };
                break;
            }

            let transcoder = Arc::clone(&self.transcoder);
            let progress = Arc::clone(&progress);
            let request = request.clone();
            let timeout = self.timeout;
            let halt = halt.clone();

            debug!(segment = %request, "Submitting segment");
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let _halt = HaltOnPanic(halt);
                let result = extract_bounded(transcoder.as_ref(), &request, acceleration, timeout).await;
                let message = match &result {
                    Ok(_) => format!("Extracted segment: {}", request.output_name()),
                    Err(err) => format!(
                        "Failed to extract {}: {}",
                        request.source_path.display(),
                        err
                    ),
                };
                if let Err(err) = &result {
                    warn!(segment = %request, error = %err, "Segment extraction failed");
                }
                progress.complete(&message).await;
            }));
        }

        let mut panic_payload = None;
        for handle in handles {
            if let Err(err) = handle.await {
                if err.is_panic() && panic_payload.is_none() {
                    panic_payload = Some(err.into_panic());
                }
            }
        }
        if let Some(payload) = panic_payload {
            std::panic::resume_unwind(payload);
        }

        let finished = progress.done().await;
        info!(
            finished,
            total = progress.total(),
            cancelled = status.is_cancelled(),
            "Segment extraction finished"
        );
        status
    }
}

/// Raises the halt signal when dropped during a panic
struct HaltOnPanic(CancelToken);

impl Drop for HaltOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.cancel();
        }
    }
}

async fn extract_bounded(
    transcoder: &dyn TranscodePort,
    request: &SegmentRequest,
    acceleration: Acceleration,
    timeout: Option<Duration>,
) -> Result<String, DomainError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, transcoder.extract(request, acceleration))
            .await
            .map_err(|_| DomainError::Timeout {
                operation: "extract".to_string(),
                seconds: limit.as_secs(),
            })?,
        None => transcoder.extract(request, acceleration).await,
    }
}
