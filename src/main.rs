//! Demo server for the request timeout guard.
//!
//! ```text
//! GET /            → "ok" immediately
//! GET /sleep/{ms}  → "ok" after sleeping, or the fallback once the guard fires
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use timeout_guard::config::{read_config, validate_config, AppConfig, ConfigError};
use timeout_guard::observability::{logging, metrics};
use timeout_guard::HttpServer;

/// Serve demo routes behind a per-request timeout guard.
#[derive(Debug, Parser)]
#[command(name = "timeout-guard", version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
}

/// Read the file, apply CLI overrides, then validate once.
fn load(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };

    if let Some(ms) = args.timeout_ms {
        config.timeout.timeout_ms = ms;
    }
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout_ms = config.timeout.timeout_ms,
        policy = ?config.timeout.policy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    HttpServer::new(config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
