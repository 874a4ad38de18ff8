//! Config reload outcome counters.

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::Reloads;

use super::NAMESPACE;

#[derive(Debug)]
pub struct ReloadsDescs {
    failures: Desc,
    successes: Desc,
}

impl ReloadsDescs {
    pub fn new() -> Self {
        let desc =
            |name, help| Desc::new(NAMESPACE, "reloads_config", name, help, MetricKind::Counter, &[]);
        Self {
            failures: desc("failures_total", "Number of failures during config reload."),
            successes: desc("successes_total", "Number of successful config reloads."),
        }
    }

    pub fn collect<'a>(&'a self, reloads: &Reloads, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(&self.failures, reloads.failures as f64, vec![]));
        out.push(Sample::new(&self.successes, reloads.successes as f64, vec![]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::SampleValue;

    #[test]
    fn emits_failure_and_success_counters() {
        let descs = ReloadsDescs::new();
        let mut samples = Vec::new();
        descs.collect(
            &Reloads {
                failures: 2,
                successes: 14,
            },
            &mut samples,
        );

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].desc.fq_name, "logstash_reloads_config_failures_total");
        assert_eq!(samples[0].value, SampleValue::Scalar(2.0));
        assert_eq!(samples[1].value, SampleValue::Scalar(14.0));
    }
}
