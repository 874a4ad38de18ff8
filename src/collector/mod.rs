//! Scrape orchestration: fetch one stats snapshot, decode it, and drive
//! every mapper in a fixed order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;

use crate::client::StatsClient;
use crate::error::ExporterError;
use crate::exposition::{Desc, MetricKind, Sample};

pub mod event;
pub mod jvm;
pub mod pipeline_config;
pub mod pipelines;
pub mod process;
pub mod reloads;

/// Namespace prefix for every exported metric.
pub const NAMESPACE: &str = "logstash";

/// Collects all metrics for one scrape of the monitored instance.
///
/// Descriptors are built once here and reused for every cycle. The only
/// state carried across cycles is the meta-counter pair and the last
/// observed status; everything else is rebuilt from a fresh snapshot.
#[derive(Debug)]
pub struct Collector {
    client: StatsClient,
    /// Serializes scrape cycles; overlapping pulls from the monitoring
    /// system block until the running cycle completes.
    cycle: Mutex<()>,

    total_scrapes: AtomicU64,
    json_parse_failures: AtomicU64,
    status_value: AtomicU64,

    up: Desc,
    scrapes: Desc,
    parse_failures: Desc,
    status: Desc,
    info: Desc,
    build_info: Desc,

    jvm: jvm::JvmDescs,
    process: process::ProcessDescs,
    pipeline_config: pipeline_config::PipelineConfigDescs,
    reloads: reloads::ReloadsDescs,
    event: event::EventDescs,
    pipelines: pipelines::PipelineDescs,
}

impl Collector {
    /// Create a collector scraping `base_uri`. A trailing slash on the URI
    /// is stripped before the stats path is appended; a malformed URI is a
    /// fatal configuration error.
    pub fn new(base_uri: &str, timeout: Duration) -> Result<Self, ExporterError> {
        let client = StatsClient::new(base_uri, timeout)?;
        Ok(Self {
            client,
            cycle: Mutex::new(()),
            total_scrapes: AtomicU64::new(0),
            json_parse_failures: AtomicU64::new(0),
            status_value: AtomicU64::new(0),
            up: Desc::new(
                NAMESPACE,
                "",
                "up",
                "Was the last scrape of logstash successful.",
                MetricKind::Gauge,
                &[],
            ),
            scrapes: Desc::new(
                NAMESPACE,
                "exporter",
                "total_scrapes",
                "Current total logstash scrapes.",
                MetricKind::Counter,
                &[],
            ),
            parse_failures: Desc::new(
                NAMESPACE,
                "exporter",
                "json_parse_failures",
                "Number of errors while parsing JSON.",
                MetricKind::Counter,
                &[],
            ),
            status: Desc::new(
                NAMESPACE,
                "",
                "status",
                "Was the logstash status: 0 for Green; 1 for Yellow; 2 for Red.",
                MetricKind::Gauge,
                &[],
            ),
            info: Desc::new(
                NAMESPACE,
                "",
                "info",
                "A metric with a constant '1' value labeled by version, http_address, name, id and ephemeral_id from Logstash instance.",
                MetricKind::Gauge,
                &["version", "http_address", "name", "id", "ephemeral_id"],
            ),
            build_info: Desc::new(
                NAMESPACE,
                "exporter",
                "build_info",
                "A metric with a constant '1' value labeled by the exporter version.",
                MetricKind::Gauge,
                &["version"],
            ),
            jvm: jvm::JvmDescs::new(),
            process: process::ProcessDescs::new(),
            pipeline_config: pipeline_config::PipelineConfigDescs::new(),
            reloads: reloads::ReloadsDescs::new(),
            event: event::EventDescs::new(),
            pipelines: pipelines::PipelineDescs::new(),
        })
    }

    /// The upstream URL being scraped.
    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Run one collection cycle and return every resulting sample.
    ///
    /// The four meta-samples (up, scrape counter, parse-failure counter,
    /// status) plus the build-info sample are emitted on every cycle;
    /// subsystem samples only when fetch and decode both succeed.
    pub async fn collect(&self) -> Vec<Sample<'_>> {
        let _guard = self.cycle.lock().await;

        let mut samples = Vec::new();
        let up = self.scrape(&mut samples).await;

        samples.push(Sample::new(&self.up, up, vec![]));
        samples.push(Sample::new(
            &self.scrapes,
            self.total_scrapes.load(Ordering::Relaxed) as f64,
            vec![],
        ));
        samples.push(Sample::new(
            &self.parse_failures,
            self.json_parse_failures.load(Ordering::Relaxed) as f64,
            vec![],
        ));
        samples.push(Sample::new(
            &self.status,
            self.status_value.load(Ordering::Relaxed) as f64,
            vec![],
        ));
        samples.push(Sample::new(
            &self.build_info,
            1.0,
            vec![env!("CARGO_PKG_VERSION").to_string()],
        ));
        samples
    }

    async fn scrape<'a>(&'a self, out: &mut Vec<Sample<'a>>) -> f64 {
        self.total_scrapes.fetch_add(1, Ordering::Relaxed);

        let stats = match self.client.fetch().await {
            Ok(stats) => stats,
            Err(ExporterError::Decode(err)) => {
                warn!(error = %err, "can't parse stats json");
                self.json_parse_failures.fetch_add(1, Ordering::Relaxed);
                return 0.0;
            }
            Err(err) => {
                warn!(error = %err, endpoint = self.client.endpoint(), "can't scrape logstash");
                return 0.0;
            }
        };

        self.status_value
            .store(status_code(&stats.status), Ordering::Relaxed);

        out.push(Sample::new(
            &self.info,
            1.0,
            vec![
                stats.version.clone(),
                stats.http_address.clone(),
                stats.name.clone(),
                stats.id.clone(),
                stats.ephemeral_id.clone(),
            ],
        ));

        self.jvm.collect(&stats.jvm, out);
        self.process.collect(&stats.process, out);
        self.pipeline_config.collect(&stats.pipeline, out);
        self.reloads.collect(&stats.reloads, out);
        self.event.collect(&stats.events, out);
        self.pipelines.collect(&stats.pipelines, out);

        1.0
    }
}

/// Map a health status string to the exported gauge value. Unknown values,
/// including the empty string, are treated as the worst case.
pub fn status_code(status: &str) -> u64 {
    match status {
        "green" => 0,
        "yellow" => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::SampleValue;

    use std::convert::Infallible;
    use std::net::SocketAddr;

    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use tokio::net::TcpListener;

    const STATS_BODY: &str = r#"{
        "version": "6.5.4",
        "http_address": "127.0.0.1:9600",
        "id": "node-id",
        "name": "node-name",
        "ephemeral_id": "eph-id",
        "status": "yellow",
        "pipeline": {"workers": 4, "batch_size": 125, "batch_delay": 50},
        "reloads": {"failures": 0, "successes": 2},
        "jvm": {
            "threads": {"count": 20},
            "mem": {"heap_used_percent": 20, "heap_committed_in_bytes": 100, "heap_used_in_bytes": 20,
                    "pools": {"young": {}, "survivor": {}, "old": {}}},
            "gc": {"collectors": {"young": {"collection_time_in_millis": 100, "collection_count": 3},
                                   "old": {"collection_time_in_millis": 200, "collection_count": 1}}}
        },
        "process": {"open_file_descriptors": 90, "max_file_descriptors": 4096,
                    "mem": {"total_virtual_in_bytes": 1000},
                    "cpu": {"total_in_millis": 5000, "percent": 3,
                            "load_average": {"1m": 0.1, "5m": 0.2, "15m": 0.3}}},
        "events": {"in": 10, "filtered": 10, "out": 10,
                   "duration_in_millis": 100, "queue_push_duration_in_millis": 5},
        "pipelines": {
            "main": {
                "events": {"in": 10, "filtered": 10, "out": 10,
                           "duration_in_millis": 100, "queue_push_duration_in_millis": 5},
                "plugins": {
                    "inputs": [{"id": "in-1", "name": "beats", "current_connections": 1,
                                "events": {"queue_push_duration_in_millis": 5, "out": 10}}],
                    "filters": [{"id": "f-1", "name": "grok",
                                 "events": {"in": 10, "duration_in_millis": 50, "out": 10}}],
                    "outputs": [{"id": "out-1", "name": "stdout",
                                 "events": {"in": 10, "duration_in_millis": 40, "out": 10}}]
                },
                "queue": {"type": "memory", "events_count": 0,
                          "queue_size_in_bytes": 0, "max_queue_size_in_bytes": 0}
            }
        }
    }"#;

    async fn spawn_stub(status: u16, body: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let service = service_fn(move |_req| async move {
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(StatusCode::from_u16(status).unwrap())
                                .body(Full::new(Bytes::from_static(body.as_bytes())))
                                .unwrap(),
                        )
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        addr
    }

    fn scalar(samples: &[Sample<'_>], name: &str) -> f64 {
        samples
            .iter()
            .find(|s| s.desc.fq_name == name)
            .map(|s| match s.value {
                SampleValue::Scalar(v) => v,
                _ => panic!("scalar expected for {}", name),
            })
            .unwrap_or_else(|| panic!("no sample named {}", name))
    }

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(status_code("green"), 0);
        assert_eq!(status_code("yellow"), 1);
        assert_eq!(status_code("red"), 2);
        assert_eq!(status_code("purple"), 2);
        assert_eq!(status_code(""), 2);
    }

    #[tokio::test]
    async fn successful_cycle_emits_subsystem_samples() {
        let addr = spawn_stub(200, STATS_BODY).await;
        let collector =
            Collector::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        let samples = collector.collect().await;

        assert_eq!(scalar(&samples, "logstash_up"), 1.0);
        assert_eq!(scalar(&samples, "logstash_exporter_total_scrapes"), 1.0);
        assert_eq!(scalar(&samples, "logstash_exporter_json_parse_failures"), 0.0);
        assert_eq!(scalar(&samples, "logstash_status"), 1.0, "yellow maps to 1");

        let info = samples
            .iter()
            .find(|s| s.desc.fq_name == "logstash_info")
            .unwrap();
        assert_eq!(info.value, SampleValue::Scalar(1.0));
        assert_eq!(
            info.labels,
            vec!["6.5.4", "127.0.0.1:9600", "node-name", "node-id", "eph-id"]
        );

        assert_eq!(scalar(&samples, "logstash_jvm_threads_count"), 20.0);
        assert_eq!(scalar(&samples, "logstash_process_process_time_seconds"), 5.0);
        assert_eq!(scalar(&samples, "logstash_pipeline_config_workers"), 4.0);
        assert_eq!(scalar(&samples, "logstash_reloads_config_successes_total"), 2.0);
        assert_eq!(scalar(&samples, "logstash_event_in_total"), 10.0);
        assert!(samples
            .iter()
            .any(|s| s.desc.fq_name == "logstash_pipeline_filter_in_total"));
    }

    #[tokio::test]
    async fn failed_fetch_emits_only_meta_samples() {
        let addr = spawn_stub(503, "unavailable").await;
        let collector =
            Collector::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        let samples = collector.collect().await;

        // up, scrape counter, parse-failure counter, status, build info
        assert_eq!(samples.len(), 5);
        assert_eq!(scalar(&samples, "logstash_up"), 0.0);
        assert_eq!(scalar(&samples, "logstash_exporter_total_scrapes"), 1.0);
        assert_eq!(scalar(&samples, "logstash_exporter_json_parse_failures"), 0.0);
    }

    #[tokio::test]
    async fn invalid_json_increments_parse_failures() {
        let addr = spawn_stub(200, r#"{"version": "6.5"#).await;
        let collector =
            Collector::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        let samples = collector.collect().await;

        assert_eq!(samples.len(), 5);
        assert_eq!(scalar(&samples, "logstash_up"), 0.0);
        assert_eq!(scalar(&samples, "logstash_exporter_json_parse_failures"), 1.0);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_fetch_failure() {
        // Port 1 on loopback is expected to refuse connections.
        let collector =
            Collector::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();

        let samples = collector.collect().await;

        assert_eq!(scalar(&samples, "logstash_up"), 0.0);
        assert_eq!(scalar(&samples, "logstash_exporter_json_parse_failures"), 0.0);
    }

    #[tokio::test]
    async fn meta_counters_persist_across_cycles() {
        let addr = spawn_stub(503, "unavailable").await;
        let collector =
            Collector::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        collector.collect().await;
        let samples = collector.collect().await;
        assert_eq!(scalar(&samples, "logstash_exporter_total_scrapes"), 2.0);
    }

    #[tokio::test]
    async fn collecting_twice_yields_identical_subsystem_sets() {
        let addr = spawn_stub(200, STATS_BODY).await;
        let collector =
            Collector::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        let key = |s: &Sample<'_>| (s.desc.fq_name.clone(), s.labels.clone());
        let subsystem = |samples: &[Sample<'_>]| {
            let mut keys: Vec<_> = samples
                .iter()
                .filter(|s| !s.desc.fq_name.starts_with("logstash_exporter"))
                .filter(|s| s.desc.fq_name != "logstash_up")
                .map(key)
                .collect();
            keys.sort();
            keys
        };

        let first = subsystem(&collector.collect().await);
        let second = subsystem(&collector.collect().await);
        assert_eq!(first, second);
    }

    #[test]
    fn bad_uri_is_a_config_error() {
        let err = Collector::new("::not-a-uri::", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ExporterError::Config(_)));
    }
}
