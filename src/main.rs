//! SmartEvent gateway.
//!
//! API backend for the abstract-submission site.
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │              SMARTEVENT GATEWAY               │
//!   Client Request         │  ┌──────────┐    ┌───────────────────────┐   │
//!   ───────────────────────┼─▶│  http    │───▶│ /api/proxy/{*path}    │───┼──▶ SmartEvent API
//!                          │  │ server   │    │  auth + body encoding │   │
//!                          │  │          │    └───────────────────────┘   │
//!                          │  │          │    ┌───────────────────────┐   │
//!                          │  │          │───▶│ /api/payment/verify   │   │
//!   Client Response        │  │          │    │  simulated stub       │   │
//!   ◀──────────────────────┼──│          │    └───────────────────────┘   │
//!                          │  └──────────┘                                │
//!                          │  config · observability · lifecycle          │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use smartevent_gateway::config::{load_config, load_from_env};
use smartevent_gateway::lifecycle::{signals, Shutdown};
use smartevent_gateway::observability::{logging, metrics};
use smartevent_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "smartevent-gateway")]
#[command(about = "API gateway for the abstract-submission site", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init(&config.observability);
    tracing::info!("smartevent-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        registration_endpoints = ?config.upstream.registration_endpoints,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    tracing::info!("Shutdown signal received, draining");
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
