//! The decoded shape of one `/_node/stats` document.
//!
//! Every container carries `#[serde(default)]`, so a section that is absent
//! from the response decodes to zero values instead of failing. Only
//! syntactically invalid JSON is a decode error. Unknown fields are ignored,
//! which keeps the model tolerant of schema additions across Logstash
//! versions.

use std::collections::HashMap;

use serde::Deserialize;

/// One point-in-time statistics snapshot from a Logstash instance.
///
/// Constructed fresh per scrape by decoding the response body, read once by
/// the mappers, and discarded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeStats {
    pub host: String,
    pub version: String,
    pub http_address: String,
    pub id: String,
    pub name: String,
    pub ephemeral_id: String,
    /// Health status string: "green", "yellow" or "red". Anything else is
    /// treated as the worst case by the status mapping.
    pub status: String,

    pub pipeline: PipelineSettings,
    pub reloads: Reloads,
    pub jvm: Jvm,
    pub process: Process,
    pub events: Events,
    /// Pipelines keyed by name. Iteration order is unspecified by design;
    /// nothing downstream may depend on it.
    pub pipelines: HashMap<String, Pipeline>,
}

/// Global pipeline execution settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub workers: i64,
    pub batch_size: i64,
    pub batch_delay: i64,
}

/// Config reload outcome counters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reloads {
    pub failures: i64,
    pub successes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Jvm {
    pub threads: JvmThreads,
    pub mem: JvmMem,
    pub gc: JvmGc,
    pub uptime_in_millis: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmThreads {
    pub count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmMem {
    pub heap_used_percent: i64,
    pub heap_committed_in_bytes: i64,
    pub heap_used_in_bytes: i64,
    pub pools: JvmPools,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmPools {
    pub young: JvmPool,
    pub survivor: JvmPool,
    pub old: JvmPool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmPool {
    pub used_in_bytes: i64,
    pub committed_in_bytes: i64,
    pub max_in_bytes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmGc {
    pub collectors: GcCollectors,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GcCollectors {
    pub young: GcCollector,
    pub old: GcCollector,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GcCollector {
    pub collection_time_in_millis: i64,
    pub collection_count: u64,
}

/// OS-process level statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Process {
    pub open_file_descriptors: i64,
    pub max_file_descriptors: i64,
    pub mem: ProcessMem,
    pub cpu: ProcessCpu,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessMem {
    pub total_virtual_in_bytes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessCpu {
    pub total_in_millis: i64,
    pub percent: i64,
    pub load_average: LoadAverage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadAverage {
    #[serde(rename = "1m")]
    pub load_1m: f64,
    #[serde(rename = "5m")]
    pub load_5m: f64,
    #[serde(rename = "15m")]
    pub load_15m: f64,
}

/// Event flow counters. Used both at the node level and per pipeline.
///
/// All counters are cumulative within one Logstash lifetime and are trusted
/// as-is; no clamping of negative or decreasing values is performed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Events {
    #[serde(rename = "in")]
    pub events_in: i64,
    pub filtered: i64,
    pub out: i64,
    pub duration_in_millis: i64,
    pub queue_push_duration_in_millis: i64,
}

/// One named pipeline inside the monitored instance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub events: Events,
    pub plugins: Plugins,
    pub queue: Queue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Plugins {
    pub inputs: Vec<InputPlugin>,
    pub filters: Vec<FilterPlugin>,
    pub outputs: Vec<OutputPlugin>,
}

/// Persistent queue state for a pipeline.
///
/// An empty `queue_type` means the pipeline runs without a queue backend and
/// no queue metrics are emitted for it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Queue {
    #[serde(rename = "type")]
    pub queue_type: String,
    pub events_count: i64,
    pub queue_size_in_bytes: i64,
    pub max_queue_size_in_bytes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputPlugin {
    pub id: String,
    pub name: String,
    pub current_connections: i64,
    pub events: InputEvents,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputEvents {
    pub queue_push_duration_in_millis: i64,
    pub out: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterPlugin {
    pub id: String,
    pub name: String,
    pub events: PluginEvents,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputPlugin {
    pub id: String,
    pub name: String,
    pub events: PluginEvents,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginEvents {
    #[serde(rename = "in")]
    pub events_in: i64,
    pub duration_in_millis: i64,
    pub out: i64,
}
