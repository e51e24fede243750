//! HTTP request redirector.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                   REDIRECTOR                     │
//!                       │                                                  │
//!     Client Request    │  ┌──────────┐   mount?   ┌──────────────────┐    │
//!     ──────────────────┼─▶│  server  │───────────▶│ request          │    │
//!                       │  │ (axum)   │            │ translator       │    │
//!                       │  └────┬─────┘            └────────┬─────────┘    │
//!                       │       │ no mount                  │              │
//!                       │       ▼                           ▼              │
//!                       │  ┌──────────┐            ┌──────────────────┐    │
//!                       │  │ fallback │            │ transport        │────┼──▶ Upstream
//!                       │  └──────────┘            │ (hyper-util)     │◀───┼─── Server
//!                       │                          └────────┬─────────┘    │
//!     Client Response   │                          ┌────────▼─────────┐    │
//!     ◀─────────────────┼──────────────────────────│ response         │    │
//!                       │                          │ translator       │    │
//!                       │                          └──────────────────┘    │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_redirector::config::{load_config, ProxyConfig};
use request_redirector::lifecycle::{signals, Shutdown};
use request_redirector::observability::{logging, metrics};
use request_redirector::HttpServer;

/// Forward requests under configured path prefixes to named upstreams.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstreams = config.upstreams.len(),
        mounts = config.mounts.len(),
        "Configuration loaded"
    );
    if config.mounts.is_empty() {
        tracing::warn!("No mounts configured; every request gets the fallback response");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        res = &mut serving => res??,
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            serving.await??;
        }
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
