//! Execution engine: extraction pool, concatenation and progress accounting

pub mod cancel;
pub mod concat;
pub mod extractor;
pub mod progress;

pub use cancel::CancelToken;
pub use concat::ConcatStage;
pub use extractor::{ExtractionOrchestrator, ExtractionStatus};
pub use progress::ExtractionProgress;
