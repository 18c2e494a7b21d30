//! Timeout guard subsystem.
//!
//! # Data Flow
//! ```text
//! TimeoutGuard (one per router, holds duration + policy)
//!     → arm(writer) per request
//!         → spawns timer task
//!         → returns GuardedResponse<W> wrapping the writer
//!
//! Handler writes:
//!     → GuardedResponse::{send, send_status, status}
//!     → forwarded while Active, dropped once TimedOut
//!
//! Timer expiry (Active only):
//!     → flag set → fallback written through the original writer
//!
//! Handler done:
//!     → complete() aborts the timer
//! ```
//!
//! # Design Decisions
//! - Flag check and write happen under one lock, so exactly one side wins
//! - The fallback bypasses the guarded surface and goes to the raw writer
//! - Cancellation is explicit; nothing relies on the host clearing timers

pub mod guarded;
pub mod policy;

pub use guarded::{Completion, GuardState, GuardedResponse, TimeoutGuard};
pub use policy::{FallbackPolicy, FALLBACK_BODY};
