//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use timeout_guard::config::AppConfig;
use timeout_guard::HttpServer;

/// A running demo server; shuts down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the demo server on an ephemeral port.
pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server
            .run_with_shutdown(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        _shutdown: tx,
    }
}

/// Config with the given timeout and everything else default.
pub fn config_with_timeout(timeout_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.timeout.timeout_ms = timeout_ms;
    config
}
