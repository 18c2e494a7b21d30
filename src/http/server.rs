//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router with the demo handlers
//! - Wire up middleware (timeout guard, tracing)
//! - Bind server to listener and run until shutdown

use std::future::Future;
use std::time::Duration;

use axum::{extract::Path, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::guard::TimeoutGuard;
use crate::http::layer::TimeoutGuardLayer;

/// HTTP server running the demo routes behind a timeout guard.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let guard = config.timeout.to_guard();
        let router = Self::build_router(guard);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(guard: TimeoutGuard) -> Router {
        Router::new()
            .route("/", get(ok_handler))
            .route("/sleep/{ms}", get(sleep_handler))
            .layer(TimeoutGuardLayer::from_guard(guard))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_with_shutdown(listener, shutdown_signal()).await
    }

    /// Run the server until `signal` resolves.
    pub async fn run_with_shutdown<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.config.timeout.timeout_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn ok_handler() -> &'static str {
    "ok"
}

/// Sleeps for the requested number of milliseconds, then replies.
async fn sleep_handler(Path(ms): Path<u64>) -> &'static str {
    tracing::debug!(sleep_ms = ms, "Handler sleeping");
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "ok"
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
