//! Per-request guard and the guarded response decorator.
//!
//! # State Transitions
//! ```text
//! Active → TimedOut: timer expires before complete()
//! Active → (disposed): complete() or drop aborts the timer; state stays Active
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::guard::policy::FallbackPolicy;
use crate::http::response::{ResponseWriter, WriteError, TEXT_PLAIN};
use crate::observability::metrics;

/// Observable state of one guarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Active,
    TimedOut,
}

/// Outcome reported by [`GuardedResponse::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The handler finished first; the timer was cancelled.
    Finished,
    /// The fallback path was already taken.
    TimedOut,
}

/// Factory for per-request guards.
///
/// Cheap to clone; one instance is usually shared by a whole router.
#[derive(Debug, Clone)]
pub struct TimeoutGuard {
    duration: Duration,
    policy: Arc<FallbackPolicy>,
}

impl TimeoutGuard {
    /// Guard with the default (408) policy.
    pub fn new(duration: Duration) -> Self {
        Self::with_policy(duration, FallbackPolicy::default())
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn with_policy(duration: Duration, policy: FallbackPolicy) -> Self {
        Self {
            duration,
            policy: Arc::new(policy),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Take over `writer` and start the timer.
    ///
    /// Must be called from within a tokio runtime. The timer task runs in
    /// the caller's current span.
    pub fn arm<W>(&self, writer: W) -> GuardedResponse<W>
    where
        W: ResponseWriter + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(GuardState::Active);
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                writer,
                timed_out: false,
                disposed: false,
            }),
            state_tx,
            policy: Arc::clone(&self.policy),
            duration: self.duration,
        });

        let timer = {
            let shared = Arc::clone(&shared);
            let duration = self.duration;
            tokio::spawn(
                async move {
                    tokio::time::sleep(duration).await;
                    shared.fire();
                }
                .in_current_span(),
            )
        };

        GuardedResponse {
            shared,
            state_rx,
            timer,
        }
    }
}

struct Shared<W> {
    inner: Mutex<Inner<W>>,
    state_tx: watch::Sender<GuardState>,
    policy: Arc<FallbackPolicy>,
    duration: Duration,
}

struct Inner<W> {
    writer: W,
    timed_out: bool,
    disposed: bool,
}

impl<W> Shared<W> {
    // A panicking writer must not wedge the guard.
    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: ResponseWriter> Shared<W> {
    fn fire(&self) {
        let mut inner = self.lock();
        if inner.timed_out || inner.disposed {
            return;
        }
        inner.timed_out = true;
        self.state_tx.send_replace(GuardState::TimedOut);

        let timeout_ms = saturating_millis(self.duration);
        let policy = &self.policy;

        if policy.requires_headers_unsent() && inner.writer.headers_sent() {
            tracing::info!(timeout_ms, "Request timed out after headers were sent");
            return;
        }

        tracing::warn!(timeout_ms, status = %policy.status(), "Request Timeout");
        metrics::record_fallback(policy.status());

        inner.writer.set_status(policy.status());
        inner.writer.set_content_type(TEXT_PLAIN);
        if let Err(err) = inner.writer.send(policy.body().clone()) {
            tracing::error!(timeout_ms, error = %err, "Failed to write timeout fallback");
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A response handle whose writes become no-ops once the timer fires.
///
/// Every method takes `&self`, so the handle can be shared between the
/// handler and whatever drives the request.
pub struct GuardedResponse<W> {
    shared: Arc<Shared<W>>,
    state_rx: watch::Receiver<GuardState>,
    timer: JoinHandle<()>,
}

impl<W: ResponseWriter> GuardedResponse<W> {
    /// Write the body, unless the request already timed out.
    pub fn send(&self, body: impl Into<Bytes>) -> Result<&Self, WriteError> {
        self.forward("send", |writer| writer.send(body.into()))
    }

    /// Finish with `status` and its reason phrase, unless timed out.
    pub fn send_status(&self, status: StatusCode) -> Result<&Self, WriteError> {
        self.forward("send_status", |writer| writer.send_status(status))
    }

    /// Set the status code, unless timed out.
    pub fn status(&self, status: StatusCode) -> &Self {
        let mut inner = self.shared.lock();
        if inner.timed_out {
            drop(inner);
            self.suppressed("status");
        } else {
            inner.writer.set_status(status);
        }
        self
    }

    fn forward<F>(&self, operation: &'static str, write: F) -> Result<&Self, WriteError>
    where
        F: FnOnce(&mut W) -> Result<(), WriteError>,
    {
        let mut inner = self.shared.lock();
        if inner.timed_out {
            drop(inner);
            self.suppressed(operation);
            return Ok(self);
        }
        write(&mut inner.writer)?;
        Ok(self)
    }

    fn suppressed(&self, operation: &'static str) {
        metrics::record_suppressed(operation);
        if self.shared.policy.logs_suppressed() {
            tracing::info!(operation, "Suppressed write after request timeout");
        }
    }

    /// Disposal hook for normal completion: cancels the pending timer.
    pub fn complete(&self) -> Completion {
        let mut inner = self.shared.lock();
        inner.disposed = true;
        self.timer.abort();
        if inner.timed_out {
            Completion::TimedOut
        } else {
            Completion::Finished
        }
    }

    /// Read access to the underlying handle.
    pub fn with_writer<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.shared.lock().writer)
    }
}

impl<W> GuardedResponse<W> {
    pub fn state(&self) -> GuardState {
        *self.state_rx.borrow()
    }

    pub fn is_timed_out(&self) -> bool {
        self.state() == GuardState::TimedOut
    }

    /// Resolves once the fallback path has been taken.
    ///
    /// Never resolves for a request that completes in time.
    pub async fn timed_out(&self) {
        let mut rx = self.state_rx.clone();
        let reached = rx.wait_for(|state| *state == GuardState::TimedOut).await.is_ok();
        if !reached {
            std::future::pending::<()>().await;
        }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.shared.policy
    }
}

impl<W> Drop for GuardedResponse<W> {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

impl<W> fmt::Debug for GuardedResponse<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedResponse")
            .field("state", &self.state())
            .field("timeout", &self.shared.duration)
            .finish_non_exhaustive()
    }
}
