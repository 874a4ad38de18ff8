//! Global pipeline execution settings.

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::PipelineSettings;

use super::NAMESPACE;

#[derive(Debug)]
pub struct PipelineConfigDescs {
    workers: Desc,
    batch_size: Desc,
    batch_delay: Desc,
}

impl PipelineConfigDescs {
    pub fn new() -> Self {
        let desc =
            |name, help| Desc::new(NAMESPACE, "pipeline_config", name, help, MetricKind::Gauge, &[]);
        Self {
            workers: desc(
                "workers",
                "The number of workers that will, in parallel, execute the filter and output stages of the pipeline.",
            ),
            batch_size: desc(
                "batch_size",
                "The maximum number of events an individual worker thread will collect from inputs before attempting to execute its filters and outputs.",
            ),
            batch_delay: desc(
                "batch_delay_seconds",
                "How long to wait before dispatching an undersized batch to workers.",
            ),
        }
    }

    pub fn collect<'a>(&'a self, settings: &PipelineSettings, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(&self.workers, settings.workers as f64, vec![]));
        out.push(Sample::new(&self.batch_size, settings.batch_size as f64, vec![]));
        out.push(Sample::new(
            &self.batch_delay,
            settings.batch_delay as f64 / 1000.0,
            vec![],
        ));
    }
}
