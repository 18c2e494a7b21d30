//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → layer.rs (arm a guard per request, race handler vs. timer)
//!     → handler response, or fallback written into response.rs's ResponseSlot
//!     → Send to client
//! ```

pub mod layer;
pub mod response;
pub mod server;

pub use layer::{TimeoutGuardLayer, TimeoutGuardService};
pub use response::{BufferedResponse, ResponseSlot, ResponseWriter, WriteError};
pub use server::HttpServer;
