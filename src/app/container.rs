use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, FfprobeAdapter, TracingReporter};
use crate::app::plan_interactor::PlanInteractor;
use crate::app::session::{JobSession, PipelinePorts};
use crate::ports::{ConcatPort, ProbePort, ReportPort, TranscodePort};

/// Environment variable overriding the ffmpeg executable
pub const FFMPEG_ENV: &str = "REEL_FFMPEG";
/// Environment variable overriding the ffprobe executable
pub const FFPROBE_ENV: &str = "REEL_FFPROBE";

pub trait AppContainer: Send + Sync {
    fn ports(&self) -> PipelinePorts;
    fn plan_interactor(&self) -> PlanInteractor;
    fn job_session(&self) -> JobSession;
}

/// Wires the ffmpeg-backed adapters into the application layer
pub struct DefaultAppContainer {
    ports: PipelinePorts,
}

impl DefaultAppContainer {
    pub fn new() -> Self {
        let ffmpeg = std::env::var_os(FFMPEG_ENV).unwrap_or_else(|| "ffmpeg".into());
        let ffprobe = std::env::var_os(FFPROBE_ENV).unwrap_or_else(|| "ffprobe".into());

        let probe_port = Arc::new(FfprobeAdapter::new(ffprobe));
        let exec_port = Arc::new(FfmpegAdapter::new(ffmpeg));
        let report_port = Arc::new(TracingReporter::new());

        Self {
            ports: PipelinePorts {
                probe: probe_port as Arc<dyn ProbePort>,
                transcoder: Arc::clone(&exec_port) as Arc<dyn TranscodePort>,
                concatenator: exec_port as Arc<dyn ConcatPort>,
                reporter: report_port as Arc<dyn ReportPort>,
            },
        }
    }
}

impl Default for DefaultAppContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContainer for DefaultAppContainer {
    fn ports(&self) -> PipelinePorts {
        self.ports.clone()
    }

    fn plan_interactor(&self) -> PlanInteractor {
        PlanInteractor::new(
            Arc::clone(&self.ports.probe),
            Arc::clone(&self.ports.reporter),
        )
    }

    fn job_session(&self) -> JobSession {
        JobSession::new(self.ports.clone())
    }
}
