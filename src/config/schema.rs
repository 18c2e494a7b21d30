//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::guard::{FallbackPolicy, TimeoutGuard};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request timeout guard settings.
    pub timeout: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Which built-in fallback policy to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// 408, gated on headers not yet sent.
    #[default]
    RequestTimeout,
    /// 503, always written.
    ServiceUnavailable,
}

/// Timeout guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request time budget in milliseconds.
    pub timeout_ms: u64,

    /// Base fallback policy.
    pub policy: PolicyKind,

    /// Override for the fallback status code.
    pub status: Option<u16>,

    /// Override for the fallback body.
    pub fallback_body: Option<String>,

    /// Override for logging of suppressed writes.
    pub log_suppressed: Option<bool>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            policy: PolicyKind::default(),
            status: None,
            fallback_body: None,
            log_suppressed: None,
        }
    }
}

impl TimeoutConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolve the configured policy and its overrides.
    ///
    /// An invalid status override is ignored here; `validate_config`
    /// rejects it before a config is accepted.
    pub fn fallback_policy(&self) -> FallbackPolicy {
        let mut policy = match self.policy {
            PolicyKind::RequestTimeout => FallbackPolicy::request_timeout(),
            PolicyKind::ServiceUnavailable => FallbackPolicy::service_unavailable(),
        };

        if let Some(status) = self.status.and_then(|code| StatusCode::from_u16(code).ok()) {
            policy = policy.with_status(status);
        }
        if let Some(body) = &self.fallback_body {
            policy = policy.with_body(body.clone());
        }
        if let Some(enabled) = self.log_suppressed {
            policy = policy.log_suppressed(enabled);
        }
        policy
    }

    /// Build the guard factory for this configuration.
    pub fn to_guard(&self) -> TimeoutGuard {
        TimeoutGuard::with_policy(self.duration(), self.fallback_policy())
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
