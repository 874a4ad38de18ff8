//! Node-level aggregate event counters.

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::Events;

use super::NAMESPACE;

#[derive(Debug)]
pub struct EventDescs {
    events_in: Desc,
    filtered: Desc,
    out: Desc,
    duration: Desc,
    queue_push_duration: Desc,
}

impl EventDescs {
    pub fn new() -> Self {
        let desc = |name, help| Desc::new(NAMESPACE, "event", name, help, MetricKind::Counter, &[]);
        Self {
            events_in: desc("in_total", "The total number of events in."),
            filtered: desc("filtered_total", "The total numbers of filtered."),
            out: desc("out_total", "The total number of events out."),
            duration: desc(
                "duration_seconds_total",
                "The total process duration time in seconds.",
            ),
            queue_push_duration: desc(
                "queue_push_duration_seconds_total",
                "The total in queue duration time in seconds.",
            ),
        }
    }

    pub fn collect<'a>(&'a self, events: &Events, out: &mut Vec<Sample<'a>>) {
        out.push(Sample::new(&self.events_in, events.events_in as f64, vec![]));
        out.push(Sample::new(&self.filtered, events.filtered as f64, vec![]));
        out.push(Sample::new(&self.out, events.out as f64, vec![]));
        out.push(Sample::new(
            &self.duration,
            events.duration_in_millis as f64 / 1000.0,
            vec![],
        ));
        out.push(Sample::new(
            &self.queue_push_duration,
            events.queue_push_duration_in_millis as f64 / 1000.0,
            vec![],
        ));
    }
}
