//! # logstash-exporter
//!
//! Prometheus exporter for Logstash node statistics.
//!
//! The exporter polls a Logstash instance's `/_node/stats` endpoint once per
//! Prometheus scrape and republishes the nested JSON document as flat,
//! labeled samples under the `logstash_` namespace: node identity, JVM and
//! OS-process state, aggregate event flow, and per-pipeline metrics down to
//! individual input, filter, and output plugin instances.
//!
//! ## Architecture
//!
//! - [`stats`] — the typed shape of one stats document; absent fields decode
//!   to zero values so schema drift never breaks a scrape.
//! - [`exposition`] — metric descriptors, samples, and the Prometheus text
//!   format renderer.
//! - [`collector`] — the per-subsystem mappers and the orchestrator that
//!   drives one fetch-decode-map cycle per scrape.
//! - [`client`] / [`server`] — the upstream HTTP fetch and the exposition
//!   HTTP endpoint.
//!
//! Scrape failures are never surfaced as HTTP errors; the `logstash_up`
//! gauge and the exporter's own counters record them instead.

pub mod client;
pub mod collector;
pub mod error;
pub mod exposition;
pub mod server;
pub mod stats;

pub use client::StatsClient;
pub use collector::Collector;
pub use error::ExporterError;
pub use server::Server;
pub use stats::NodeStats;
