//! Fan-out demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                 SERVICE NODE                  │
//!     GET /            │  ┌────────┐   ┌────────────┐   ┌───────────┐  │
//!     ─────────────────┼─▶│  http  │──▶│ aggregator │──▶│ dispatcher│──┼──▶ backend A
//!     backends/latency │  │ server │   │ resolve +  │   │ one task  │──┼──▶ backend B
//!     + trace headers  │  └────────┘   │  latency   │   │per backend│──┼──▶ backend C
//!                      │       ▲       └────────────┘   └─────┬─────┘  │
//!     JSON call tree   │       │        ┌──────────┐          │        │
//!     ◀────────────────┼───────┴────────│assembler │◀─────────┘        │
//!     or "N backends   │                └──────────┘   join all        │
//!        failed"       │                                               │
//!                      │  config · health · lifecycle · observability  │
//!                      └───────────────────────────────────────────────┘
//! ```
//!
//! Backends are other nodes running this same binary, so a deployment forms
//! a call tree whose shape is decided by `BACKENDS` and the `backends` header.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use fanout_service::config::load_config;
use fanout_service::http::HttpServer;
use fanout_service::lifecycle::{signals, startup, Shutdown};
use fanout_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fanout-service")]
#[command(about = "Demo service that fans requests out to its backends", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        app_name = %config.app_name,
        bind_address = %config.listener.bind_address,
        backends = ?config.backends,
        "Configuration loaded"
    );

    startup::init_delay(&config.startup).await;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
