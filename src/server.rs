//! HTTP server exposing the metrics endpoint.
//!
//! The metrics handler always answers 200: per-cycle scrape failures are
//! visible only through the exporter's meta-metrics, never as an HTTP error
//! to the scraping system.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::debug;

use crate::collector::Collector;
use crate::exposition;

/// The exporter's HTTP server. Binding is separate from serving so a bind
/// failure can abort startup with a fatal error.
pub struct Server {
    listener: TcpListener,
    metrics_path: String,
    collector: Arc<Collector>,
}

impl Server {
    pub async fn bind(
        addr: SocketAddr,
        metrics_path: impl Into<String>,
        collector: Arc<Collector>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            metrics_path: metrics_path.into(),
            collector,
        })
    }

    /// The locally bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Each connection is served on its own task.
    pub async fn serve(self) -> std::io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!(%peer, "accepted connection");

            let metrics_path = self.metrics_path.clone();
            let collector = self.collector.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let metrics_path = metrics_path.clone();
                    let collector = collector.clone();
                    async move { handle_request(req, &metrics_path, &collector).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!(error = %err, "connection error");
                }
            });
        }
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    metrics_path: &str,
    collector: &Collector,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();

    if path == metrics_path {
        let samples = collector.collect().await;
        let body = exposition::render(&samples);
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain; version=0.0.4; charset=utf-8")
            .body(Full::new(Bytes::from(body)))
            .unwrap())
    } else if path == "/" {
        let body = format!(
            "<html>\n<head><title>Logstash Exporter</title></head>\n<body>\n\
             <h1>Logstash Exporter</h1>\n<p><a href='{}'>Metrics</a></p>\n</body>\n</html>",
            metrics_path
        );
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Full::new(Bytes::from(body)))
            .unwrap())
    } else if path == "/healthz" {
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("OK")))
            .unwrap())
    } else {
        Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("Not Found")))
            .unwrap())
    }
}
