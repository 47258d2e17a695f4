//! Highlight Reel Library
//!
//! Plans time segments across many source videos, extracts them with a
//! bounded pool of transcoder invocations and concatenates the survivors
//! into a single output file.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{JobSession, PipelinePorts};
pub use domain::errors::DomainError;
pub use domain::model::{Acceleration, JobConfig, RunOutcome, SegmentRequest, SessionState};
pub use domain::rules::{PlanSkip, SegmentPlanner};
pub use engine::{CancelToken, ConcatStage, ExtractionOrchestrator, ExtractionStatus};
pub use error::{ReelError, ReelResult};
