//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! guard + layer produce:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (fallback and suppression counters)
//! ```

pub mod logging;
pub mod metrics;
