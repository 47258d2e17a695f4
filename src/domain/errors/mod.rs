// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments or job configuration
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Source duration could not be determined
    #[error("Probe failed for {path}: {message}")]
    ProbeFailed { path: String, message: String },

    /// Transcoder failed to produce one segment
    #[error("Extract failed: {message}")]
    TranscodeFailed { message: String, diagnostics: String },

    /// Concatenator failed to produce the final artifact
    #[error("Concat failed: {message}")]
    ConcatFailed { message: String, diagnostics: String },

    /// External call exceeded its bounded wait
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// A run is already in progress on this session
    #[error("A job is already running")]
    SessionBusy,

    /// File system failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl DomainError {
    /// Diagnostic text captured from an external collaborator, if any
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            DomainError::TranscodeFailed { diagnostics, .. }
            | DomainError::ConcatFailed { diagnostics, .. } => Some(diagnostics.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
