//! Error types for the exporter.

use thiserror::Error;

/// Errors that can occur while configuring the exporter or scraping stats.
///
/// Only `Config` is fatal; everything else is recovered per scrape cycle and
/// surfaced through the exporter's meta-metrics.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Invalid configuration, such as a malformed upstream URI.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HTTP request failed, including non-2xx upstream responses.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection to the upstream instance failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the upstream response.
    #[error("request timed out")]
    Timeout,

    /// The upstream response body was not valid JSON.
    #[error("failed to decode stats: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ExporterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExporterError::Timeout
        } else if err.is_connect() {
            ExporterError::Connection(err.to_string())
        } else {
            ExporterError::Http(err.to_string())
        }
    }
}
