//! Records Service
//!
//! A thin HTTP API over an external key-value store, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                 RECORDS SERVICE                  │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ──────────────────┼─▶│  http   │───▶│ records  │───▶│  records   │   │
//!                     │  │ router  │    │  model   │    │  gateway   │   │
//!                     │  └─────────┘    └──────────┘    └─────┬──────┘   │
//!                     │                                       │          │
//!                     │                                       ▼          │
//!   Client Response   │  ┌─────────┐                    ┌────────────┐   │
//!   ◀─────────────────┼──│  http   │◀───────────────────│   store    │◀──┼──── Redis
//!                     │  │ error / │                    │  (KvStore) │   │
//!                     │  │  json   │                    └────────────┘   │
//!                     │  └─────────┘                                     │
//!                     │                                                  │
//!                     │  config · observability · lifecycle              │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use records_service::config::ServiceConfig;
use records_service::http::HttpServer;
use records_service::lifecycle::{self, signals, Shutdown};
use records_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "records-service")]
#[command(about = "HTTP API for records stored in Redis", long_about = None)]
struct Args {
    /// Optional TOML config file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ServiceConfig::from_env_and_file(args.config.as_deref())?;

    logging::init(&config.observability);

    tracing::info!("records-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_address = %config.store.address,
        key_prefix = %config.store.key_prefix,
        "Configuration loaded"
    );

    // Fatal on failure: no listener is bound without a reachable store.
    let store = lifecycle::connect_store(&config.store).await?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(config, store);
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    signals::forward_to(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
