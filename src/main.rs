//! secure-api-proxy
//!
//! A bearer-token gate in front of one upstream HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                 SECURE API PROXY                 │
//!   Client Request    │  ┌────────┐   ┌──────────┐   ┌──────────────┐    │
//!   ──────────────────┼─▶│  http  │──▶│ pipeline │──▶│   upstream   │────┼──▶ Target
//!                     │  │ server │   │health/   │   │  forwarder   │    │    Service
//!   Client Response   │  └────────┘   │cors/auth │   │  + client    │    │
//!   ◀─────────────────┼───────────────┴──────────┴───│  (pooled)    │◀───┼───
//!                     │                              └──────────────┘    │
//!                     │  ┌────────┐ ┌──────────┐ ┌───────────┐           │
//!                     │  │ config │ │ security │ │ lifecycle │           │
//!                     │  └────────┘ └──────────┘ └───────────┘           │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use secure_api_proxy::config::{load_config, SystemEnv};
use secure_api_proxy::observability;
use secure_api_proxy::{HttpServer, ProxyConfig, Shutdown};

#[derive(Parser)]
#[command(name = "secure-api-proxy")]
#[command(about = "Authenticating reverse proxy for a single upstream", version)]
struct Args {
    /// Optional TOML file; environment variables override it.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref(), &SystemEnv) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = observability::init(&config.observability) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Proxy failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.listener.socket_addr()?;
    let server = HttpServer::new(config)?;

    observability::log_startup(server.config());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
