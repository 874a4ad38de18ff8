//! Per-pipeline metrics: aggregate event flow, queue state, and one sample
//! set per input, filter, and output plugin instance.
//!
//! The pipeline map carries no ordering guarantee, so emission order across
//! pipelines is non-deterministic and nothing may depend on it. Within one
//! pipeline, filter order is significant: the 0-based position in the filter
//! list is emitted as the `index` label. That index is the only available
//! disambiguator for filters without a configured id, with the documented
//! caveat that it shifts when the filter configuration changes.

use std::collections::HashMap;

use crate::exposition::{Desc, MetricKind, Sample};
use crate::stats::{FilterPlugin, InputPlugin, OutputPlugin, Pipeline};

use super::NAMESPACE;

#[derive(Debug)]
pub struct PipelineDescs {
    // Aggregate events
    events_in: Desc,
    filtered: Desc,
    out: Desc,
    duration: Desc,
    queue_push_duration: Desc,

    // Input plugins
    input_connections: Desc,
    input_queue_push_duration: Desc,
    input_out: Desc,

    // Filter plugins
    filter_duration: Desc,
    filter_in: Desc,
    filter_out: Desc,

    // Output plugins
    output_duration: Desc,
    output_in: Desc,
    output_out: Desc,

    // Queue
    queue_events: Desc,
    queue_size: Desc,
    queue_max_size: Desc,
}

impl PipelineDescs {
    pub fn new() -> Self {
        let desc = |name, help, kind, labels| Desc::new(NAMESPACE, "pipeline", name, help, kind, labels);
        Self {
            events_in: desc(
                "event_in_total",
                "The total number of events in.",
                MetricKind::Counter,
                &["pipeline"],
            ),
            filtered: desc(
                "event_filtered_total",
                "The total numbers of filtered.",
                MetricKind::Counter,
                &["pipeline"],
            ),
            out: desc(
                "event_out_total",
                "The total number of events out.",
                MetricKind::Counter,
                &["pipeline"],
            ),
            duration: desc(
                "event_duration_seconds_total",
                "The total process duration time in seconds.",
                MetricKind::Counter,
                &["pipeline"],
            ),
            queue_push_duration: desc(
                "event_queue_push_duration_seconds_total",
                "The total in queue duration time in seconds.",
                MetricKind::Counter,
                &["pipeline"],
            ),

            input_connections: desc(
                "input_connections",
                "The current number of connections.",
                MetricKind::Gauge,
                &["pipeline", "id", "name"],
            ),
            input_queue_push_duration: desc(
                "input_queue_push_seconds_total",
                "The total in queue duration time in seconds",
                MetricKind::Counter,
                &["pipeline", "id", "name"],
            ),
            input_out: desc(
                "input_out_total",
                "The total number of events out.",
                MetricKind::Counter,
                &["pipeline", "id", "name"],
            ),

            filter_duration: desc(
                "filter_duration_seconds_total",
                "The total process duration time in seconds",
                MetricKind::Counter,
                &["pipeline", "id", "name", "index"],
            ),
            filter_in: desc(
                "filter_in_total",
                "The total number of events in.",
                MetricKind::Counter,
                &["pipeline", "id", "name", "index"],
            ),
            filter_out: desc(
                "filter_out_total",
                "The total number of events out.",
                MetricKind::Counter,
                &["pipeline", "id", "name", "index"],
            ),

            output_duration: desc(
                "output_duration_seconds_total",
                "The total process duration time in seconds",
                MetricKind::Counter,
                &["pipeline", "id", "name"],
            ),
            output_in: desc(
                "output_in_total",
                "The total number of events in.",
                MetricKind::Counter,
                &["pipeline", "id", "name"],
            ),
            output_out: desc(
                "output_out_total",
                "The total number of events out.",
                MetricKind::Counter,
                &["pipeline", "id", "name"],
            ),

            queue_events: desc(
                "queue_event_count",
                "The current events in queue.",
                MetricKind::Gauge,
                &["pipeline", "queue_type"],
            ),
            queue_size: desc(
                "queue_size_bytes",
                "The current queue size in bytes.",
                MetricKind::Counter,
                &["pipeline", "queue_type"],
            ),
            queue_max_size: desc(
                "queue_max_size_bytes",
                "The max queue size in bytes.",
                MetricKind::Counter,
                &["pipeline", "queue_type"],
            ),
        }
    }

    pub fn collect<'a>(&'a self, pipelines: &HashMap<String, Pipeline>, out: &mut Vec<Sample<'a>>) {
        for (name, pipeline) in pipelines {
            self.collect_events(name, pipeline, out);
            self.collect_queue(name, pipeline, out);
            for plugin in &pipeline.plugins.inputs {
                self.collect_input(name, plugin, out);
            }
            for (index, plugin) in pipeline.plugins.filters.iter().enumerate() {
                self.collect_filter(name, index, plugin, out);
            }
            for plugin in &pipeline.plugins.outputs {
                self.collect_output(name, plugin, out);
            }
        }
    }

    fn collect_events<'a>(&'a self, name: &str, pipeline: &Pipeline, out: &mut Vec<Sample<'a>>) {
        let events = &pipeline.events;
        let labels = || vec![name.to_string()];
        out.push(Sample::new(&self.events_in, events.events_in as f64, labels()));
        out.push(Sample::new(&self.filtered, events.filtered as f64, labels()));
        out.push(Sample::new(&self.out, events.out as f64, labels()));
        out.push(Sample::new(
            &self.duration,
            events.duration_in_millis as f64 / 1000.0,
            labels(),
        ));
        out.push(Sample::new(
            &self.queue_push_duration,
            events.queue_push_duration_in_millis as f64 / 1000.0,
            labels(),
        ));
    }

    fn collect_queue<'a>(&'a self, name: &str, pipeline: &Pipeline, out: &mut Vec<Sample<'a>>) {
        let queue = &pipeline.queue;
        // An empty queue type means no active queue backend for this
        // pipeline; skip queue metrics entirely rather than emitting zeros.
        if queue.queue_type.is_empty() {
            return;
        }
        let labels = || vec![name.to_string(), queue.queue_type.clone()];
        out.push(Sample::new(&self.queue_events, queue.events_count as f64, labels()));
        out.push(Sample::new(&self.queue_size, queue.queue_size_in_bytes as f64, labels()));
        out.push(Sample::new(
            &self.queue_max_size,
            queue.max_queue_size_in_bytes as f64,
            labels(),
        ));
    }

    fn collect_input<'a>(&'a self, name: &str, plugin: &InputPlugin, out: &mut Vec<Sample<'a>>) {
        let labels = || vec![name.to_string(), plugin.id.clone(), plugin.name.clone()];
        out.push(Sample::new(
            &self.input_connections,
            plugin.current_connections as f64,
            labels(),
        ));
        out.push(Sample::new(
            &self.input_queue_push_duration,
            plugin.events.queue_push_duration_in_millis as f64 / 1000.0,
            labels(),
        ));
        out.push(Sample::new(&self.input_out, plugin.events.out as f64, labels()));
    }

    fn collect_filter<'a>(
        &'a self,
        name: &str,
        index: usize,
        plugin: &FilterPlugin,
        out: &mut Vec<Sample<'a>>,
    ) {
        let labels = || {
            vec![
                name.to_string(),
                plugin.id.clone(),
                plugin.name.clone(),
                index.to_string(),
            ]
        };
        out.push(Sample::new(
            &self.filter_duration,
            plugin.events.duration_in_millis as f64 / 1000.0,
            labels(),
        ));
        out.push(Sample::new(&self.filter_in, plugin.events.events_in as f64, labels()));
        out.push(Sample::new(&self.filter_out, plugin.events.out as f64, labels()));
    }

    fn collect_output<'a>(&'a self, name: &str, plugin: &OutputPlugin, out: &mut Vec<Sample<'a>>) {
        let labels = || vec![name.to_string(), plugin.id.clone(), plugin.name.clone()];
        out.push(Sample::new(
            &self.output_duration,
            plugin.events.duration_in_millis as f64 / 1000.0,
            labels(),
        ));
        out.push(Sample::new(&self.output_in, plugin.events.events_in as f64, labels()));
        out.push(Sample::new(&self.output_out, plugin.events.out as f64, labels()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::SampleValue;
    use crate::stats::NodeStats;

    fn pipelines_fixture() -> HashMap<String, Pipeline> {
        let stats: NodeStats = serde_json::from_str(
            r#"{
                "pipelines": {
                    "main": {
                        "events": {"in": 100, "filtered": 90, "out": 90,
                                   "duration_in_millis": 2500,
                                   "queue_push_duration_in_millis": 10},
                        "plugins": {
                            "inputs": [{"id": "beats-1", "name": "beats",
                                        "current_connections": 3,
                                        "events": {"queue_push_duration_in_millis": 10, "out": 100}}],
                            "filters": [{"id": "grok-1", "name": "grok",
                                         "events": {"in": 100, "duration_in_millis": 200, "out": 90}}],
                            "outputs": [{"id": "es-1", "name": "elasticsearch",
                                         "events": {"in": 90, "duration_in_millis": 800, "out": 90}}]
                        },
                        "queue": {"type": "memory", "events_count": 5,
                                  "queue_size_in_bytes": 1024, "max_queue_size_in_bytes": 4096}
                    },
                    "idle": {}
                }
            }"#,
        )
        .unwrap();
        stats.pipelines
    }

    fn sample_keys(samples: &[Sample<'_>]) -> Vec<(String, Vec<String>, String)> {
        let mut keys: Vec<_> = samples
            .iter()
            .map(|s| {
                let value = match s.value {
                    SampleValue::Scalar(v) => format!("{}", v),
                    SampleValue::Summary { count, sum } => format!("{}/{}", count, sum),
                };
                (s.desc.fq_name.clone(), s.labels.clone(), value)
            })
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn two_pipeline_sample_count_is_deterministic() {
        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines_fixture(), &mut samples);

        // "main": 5 event + 3 queue + 3 input + 3 filter + 3 output = 17
        // "idle": 5 event, no queue, no plugins
        assert_eq!(samples.len(), 22);
    }

    #[test]
    fn empty_queue_type_emits_no_queue_samples() {
        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines_fixture(), &mut samples);

        assert!(!samples
            .iter()
            .any(|s| s.desc.fq_name.starts_with("logstash_pipeline_queue")
                && s.labels[0] == "idle"));
    }

    #[test]
    fn queue_samples_share_the_pipeline_and_type_labels() {
        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines_fixture(), &mut samples);

        let queue: Vec<_> = samples
            .iter()
            .filter(|s| {
                s.desc.fq_name == "logstash_pipeline_queue_event_count"
                    || s.desc.fq_name == "logstash_pipeline_queue_size_bytes"
                    || s.desc.fq_name == "logstash_pipeline_queue_max_size_bytes"
            })
            .collect();
        assert_eq!(queue.len(), 3);
        for sample in queue {
            assert_eq!(sample.labels, vec!["main".to_string(), "memory".to_string()]);
        }
    }

    #[test]
    fn filter_position_labels_follow_sequence_order() {
        let mut pipelines = pipelines_fixture();
        let filters = r#"[
            {"id": "a", "name": "grok", "events": {"in": 1, "duration_in_millis": 1, "out": 1}},
            {"id": "b", "name": "mutate", "events": {"in": 2, "duration_in_millis": 2, "out": 2}},
            {"id": "c", "name": "date", "events": {"in": 3, "duration_in_millis": 3, "out": 3}}
        ]"#;
        pipelines.get_mut("main").unwrap().plugins.filters = serde_json::from_str(filters).unwrap();

        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines, &mut samples);

        let filter_samples: Vec<_> = samples
            .iter()
            .filter(|s| s.desc.fq_name == "logstash_pipeline_filter_in_total")
            .collect();
        assert_eq!(filter_samples.len(), 3);

        let positions: Vec<(&str, &str)> = filter_samples
            .iter()
            .map(|s| (s.labels[1].as_str(), s.labels[3].as_str()))
            .collect();
        assert_eq!(positions, vec![("a", "0"), ("b", "1"), ("c", "2")]);
    }

    #[test]
    fn input_and_output_samples_carry_identity_labels() {
        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines_fixture(), &mut samples);

        let input = samples
            .iter()
            .find(|s| s.desc.fq_name == "logstash_pipeline_input_queue_push_seconds_total")
            .unwrap();
        assert_eq!(
            input.labels,
            vec!["main".to_string(), "beats-1".to_string(), "beats".to_string()]
        );
        assert_eq!(input.value, SampleValue::Scalar(0.01));

        let output = samples
            .iter()
            .find(|s| s.desc.fq_name == "logstash_pipeline_output_duration_seconds_total")
            .unwrap();
        assert_eq!(output.value, SampleValue::Scalar(0.8));
    }

    #[test]
    fn repeated_collection_is_order_independent() {
        let descs = PipelineDescs::new();
        let pipelines = pipelines_fixture();

        let mut first = Vec::new();
        descs.collect(&pipelines, &mut first);

        // Rebuilding the map may iterate in a different order; the sample
        // sets must still be identical.
        let rebuilt: HashMap<String, Pipeline> =
            pipelines.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut second = Vec::new();
        descs.collect(&rebuilt, &mut second);

        assert_eq!(sample_keys(&first), sample_keys(&second));
    }

    #[test]
    fn duplicate_plugin_ids_are_forwarded_without_dedup() {
        let mut pipelines = pipelines_fixture();
        let main = pipelines.get_mut("main").unwrap();
        let dup = main.plugins.outputs[0].clone();
        main.plugins.outputs.push(dup);

        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&pipelines, &mut samples);

        let count = samples
            .iter()
            .filter(|s| {
                s.desc.fq_name == "logstash_pipeline_output_out_total" && s.labels[1] == "es-1"
            })
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn empty_pipeline_map_emits_nothing() {
        let descs = PipelineDescs::new();
        let mut samples = Vec::new();
        descs.collect(&HashMap::new(), &mut samples);
        assert!(samples.is_empty());
    }
}
