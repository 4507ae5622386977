//! Newsroom API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  GATEWAY                     │
//!    Admin / site         │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!    ─────────────────────┼─▶│  http  │──▶│ admin /  │──▶│ upstream  │───┼──▶ Backend
//!                         │  │ server │   │ client   │   │ client    │   │    REST API
//!    ◀────────────────────┼──│        │◀──│ handlers │◀──│ + retries │◀──┼───
//!                         │  └────────┘   └──────────┘   └───────────┘   │
//!                         │   cors · limits · request id · metrics       │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use newsroom_gateway::config::{load_config, GatewayConfig};
use newsroom_gateway::http::HttpServer;
use newsroom_gateway::lifecycle::{wait_for_signal, Shutdown};
use newsroom_gateway::observability::{init_logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "newsroom-gateway", version, about = "API gateway for the newsroom admin and site")]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        backend_timeout_ms = config.timeouts.backend_ms,
        max_retries = config.retries.max_retries,
        "newsroom-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let receiver = shutdown.subscribe();
    tokio::spawn(wait_for_signal(shutdown));

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
