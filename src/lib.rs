//! Per-request timeout guard for axum/tower services.
//!
//! A [`TimeoutGuard`] arms a timer for each request. When the timer fires
//! before the handler finishes, a fallback response is written exactly once
//! and every later write from the handler is dropped.

pub mod config;
pub mod guard;
pub mod http;
pub mod observability;

pub use config::AppConfig;
pub use guard::{Completion, FallbackPolicy, GuardState, GuardedResponse, TimeoutGuard};
pub use http::{HttpServer, ResponseWriter, TimeoutGuardLayer};
