// Plan interactor - Probes every source and collects segment requests

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use crate::domain::model::*;
use crate::domain::rules::SegmentPlanner;
use crate::ports::*;
use crate::utils::path::SegmentNamer;

/// Interactor for the planning phase of a run
pub struct PlanInteractor {
    probe_port: Arc<dyn ProbePort>,
    report_port: Arc<dyn ReportPort>,
}

impl PlanInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, report_port: Arc<dyn ReportPort>) -> Self {
        Self {
            probe_port,
            report_port,
        }
    }

    /// Plan segments for every file of `config`, in file order.
    ///
    /// Files whose duration cannot be probed, or that are too short, are
    /// skipped with a logged reason.
    pub async fn plan<R: Rng + Send + ?Sized>(
        &self,
        config: &JobConfig,
        rng: &mut R,
    ) -> Vec<SegmentRequest> {
        let planner = SegmentPlanner::new(config);
        let mut namer = SegmentNamer::new(config.scratch_dir());
        let mut requests = Vec::new();

        for file in &config.files {
            let duration = match self.probe_port.probe_duration(file).await {
                Ok(duration) => duration,
                Err(err) => {
                    self.report_port
                        .log(&format!("Skipping {}: {}", file.display(), err));
                    continue;
                }
            };
            debug!(file = %file.display(), duration, "Probed source");

            match planner.plan_file(file, duration, rng, &mut namer) {
                Ok(planned) => {
                    info!(
                        file = %file.display(),
                        segments = planned.len(),
                        "Planned segments"
                    );
                    requests.extend(planned);
                }
                Err(skip) => {
                    self.report_port
                        .log(&format!("Skipping {}: {}", file.display(), skip));
                }
            }
        }

        requests
    }
}
