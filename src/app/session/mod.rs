// Job session - Lifecycle, cancellation and terminal reporting of one run

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::plan_interactor::PlanInteractor;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::concat::{existing_segments, remove_segments};
use crate::engine::{CancelToken, ConcatStage, ExtractionOrchestrator};
use crate::ports::*;

/// Collaborators a run needs
#[derive(Clone)]
pub struct PipelinePorts {
    pub probe: Arc<dyn ProbePort>,
    pub transcoder: Arc<dyn TranscodePort>,
    pub concatenator: Arc<dyn ConcatPort>,
    pub reporter: Arc<dyn ReportPort>,
}

struct SessionInner {
    state: SessionState,
    token: Option<CancelToken>,
}

/// Owns the lifecycle of highlight runs: `Idle -> Running -> {Completed,
/// Failed, Cancelled}`, and back to `Running` on the next start.
///
/// Only one run may be active; starting while `Running` is rejected rather
/// than orphaning the active run's cancellation token.
pub struct JobSession {
    ports: PipelinePorts,
    inner: Arc<Mutex<SessionInner>>,
}

impl JobSession {
    pub fn new(ports: PipelinePorts) -> Self {
        Self {
            ports,
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                token: None,
            })),
        }
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Start a run on a background task. Must be called inside a Tokio
    /// runtime. The returned handle resolves to the run's outcome after
    /// `finished` has been reported.
    pub fn start(&self, config: JobConfig) -> Result<JoinHandle<RunOutcome>, DomainError> {
        config.validate()?;

        let token = {
            let mut inner = lock(&self.inner);
            if inner.state == SessionState::Running {
                return Err(DomainError::SessionBusy);
            }
            let token = CancelToken::new();
            inner.state = SessionState::Running;
            inner.token = Some(token.clone());
            token
        };

        info!(files = config.files.len(), "Job session started");
        let ports = self.ports.clone();
        let inner = Arc::clone(&self.inner);

        Ok(tokio::spawn(async move {
            let reporter = Arc::clone(&ports.reporter);
            let outcome = match tokio::spawn(run_job(ports, config, token)).await {
                Ok(outcome) => outcome,
                Err(err) if err.is_panic() => {
                    let detail = panic_detail(err.into_panic());
                    error!(panic = %detail, "Run panicked");
                    reporter.log(&format!("Panic: {}", detail));
                    RunOutcome::failed(format!("Critical error: {}", detail))
                }
                Err(err) => RunOutcome::failed(format!("Critical error: {}", err)),
            };

            {
                let mut inner = lock(&inner);
                inner.state = outcome.state();
                inner.token = None;
            }
            info!(state = ?outcome.state(), "Job session finished");
            reporter.finished(outcome.is_success(), &outcome.message());
            outcome
        }))
    }

    /// Signal the active run to stop submitting segments. Returns false
    /// when no run is active. Does not wait for acknowledgment.
    pub fn stop(&self) -> bool {
        let inner = lock(&self.inner);
        match (&inner.state, &inner.token) {
            (SessionState::Running, Some(token)) => {
                warn!("Stop requested; in-flight segments will finish");
                token.cancel();
                true
            }
            _ => false,
        }
    }
}

async fn run_job(ports: PipelinePorts, config: JobConfig, token: CancelToken) -> RunOutcome {
    let reporter = Arc::clone(&ports.reporter);
    reporter.log(&format!("Starting processing {} files...", config.files.len()));

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let planner = PlanInteractor::new(Arc::clone(&ports.probe), Arc::clone(&reporter));
    let mut requests = planner.plan(&config, &mut rng).await;
    if requests.is_empty() {
        return RunOutcome::failed("No segments to process");
    }

    if config.shuffle_segments {
        requests.shuffle(&mut rng);
    }
    let requests = Arc::new(requests);

    let phase = tokio::spawn(extract_and_concat(
        ports,
        Arc::clone(&requests),
        config.clone(),
        token,
    ));
    let outcome = match phase.await {
        Ok(outcome) => outcome,
        Err(err) => {
            apply_failure_cleanup(&config, &requests).await;
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
            return RunOutcome::failed(format!("Critical error: {}", err));
        }
    };

    if !outcome.is_success() {
        apply_failure_cleanup(&config, &requests).await;
    }
    outcome
}

async fn extract_and_concat(
    ports: PipelinePorts,
    requests: Arc<Vec<SegmentRequest>>,
    config: JobConfig,
    token: CancelToken,
) -> RunOutcome {
    let acceleration = config.acceleration();
    let timeout = config.transcode_timeout();

    let status = ExtractionOrchestrator::new(
        Arc::clone(&ports.transcoder),
        Arc::clone(&ports.reporter),
    )
    .with_timeout(timeout)
    .run(&requests, acceleration, &token)
    .await;

    if status.is_cancelled() {
        return RunOutcome::Cancelled;
    }
    ConcatStage::new(Arc::clone(&ports.concatenator), Arc::clone(&ports.reporter))
        .with_timeout(timeout)
        .run(&requests, &config.output_path, acceleration)
        .await
}

/// Remove or keep the segments a failed run left behind
async fn apply_failure_cleanup(config: &JobConfig, requests: &[SegmentRequest]) {
    let leftovers = existing_segments(requests).await;
    if config.cleanup_on_failure {
        remove_segments(&leftovers).await;
    } else if !leftovers.is_empty() {
        info!(
            count = leftovers.len(),
            dir = %config.scratch_dir().display(),
            "Leaving temporary segments on disk"
        );
    }
}

fn lock(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_detail(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
