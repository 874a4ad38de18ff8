use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use logstash_exporter::{Collector, Server};

#[derive(Parser, Debug)]
#[command(name = "logstash-exporter")]
#[command(about = "Prometheus exporter for Logstash node statistics", version)]
struct Args {
    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9649")]
    listen_address: SocketAddr,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// URI on which to scrape logstash
    #[arg(long = "logstash.scrape-uri", default_value = "http://localhost:9600")]
    scrape_uri: String,

    /// Timeout in seconds for trying to get stats from logstash
    #[arg(long = "logstash.timeout", default_value = "5")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        scrape_uri = %args.scrape_uri,
        "starting logstash-exporter"
    );

    let collector = Collector::new(&args.scrape_uri, Duration::from_secs(args.timeout))
        .context("failed to create collector")?;

    let server = Server::bind(args.listen_address, args.telemetry_path, Arc::new(collector))
        .await
        .with_context(|| format!("failed to bind {}", args.listen_address))?;

    info!(address = %args.listen_address, "listening");
    server.serve().await.context("server error")?;
    Ok(())
}
