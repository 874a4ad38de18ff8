//! HTTP client for the Logstash node stats endpoint.

use std::time::Duration;

use reqwest::Client;

use crate::error::ExporterError;
use crate::stats::NodeStats;

const STATS_PATH: &str = "/_node/stats";

/// Fetches and decodes one stats snapshot per call.
///
/// The base URI is validated once at construction; a malformed URI is a
/// fatal configuration error. Each fetch is a single best-effort GET with
/// the configured timeout and no retries.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    endpoint: String,
}

impl StatsClient {
    pub fn new(base_uri: &str, timeout: Duration) -> Result<Self, ExporterError> {
        let base = base_uri.trim_end_matches('/');
        reqwest::Url::parse(base)
            .map_err(|e| ExporterError::Config(format!("invalid scrape URI '{}': {}", base_uri, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base, STATS_PATH),
        })
    }

    /// The full stats URL this client scrapes.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch one snapshot.
    ///
    /// Any transport failure or non-2xx status is a fetch error; a 2xx
    /// response with a body that is not valid JSON is a decode error. Absent
    /// fields inside valid JSON are not errors, they decode to zero values.
    pub async fn fetch(&self) -> Result<NodeStats, ExporterError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Http(format!(
                "stats endpoint returned status {}",
                status
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ExporterError::Decode(e.to_string()))
    }
}
