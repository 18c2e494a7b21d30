//! Tower integration for the timeout guard.
//!
//! # Responsibilities
//! - Arm a guard around every request passing through the layer
//! - Return the inner response when the handler wins the race
//! - Return the fallback written by the timer when it does not
//!
//! # Design Decisions
//! - The fallback travels through a `ResponseSlot`, the same path a
//!   handler-side writer would use
//! - The handler runs as its own task and always runs to completion; a
//!   result that arrives after the deadline is discarded
//! - Once the timer has fired, the fallback is the response, whether the
//!   handler later returns a response or an error

use std::task::{Context, Poll};
use std::time::Duration;

use axum::{http::Request, response::Response};
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tower::{Layer, Service};
use tracing::Instrument;

use crate::guard::{Completion, FallbackPolicy, TimeoutGuard};
use crate::http::response::ResponseSlot;

/// Applies a [`TimeoutGuard`] to every request.
#[derive(Debug, Clone)]
pub struct TimeoutGuardLayer {
    guard: TimeoutGuard,
}

impl TimeoutGuardLayer {
    /// Layer with the default (408) policy.
    pub fn new(timeout: Duration) -> Self {
        Self::from_guard(TimeoutGuard::new(timeout))
    }

    pub fn with_policy(timeout: Duration, policy: FallbackPolicy) -> Self {
        Self::from_guard(TimeoutGuard::with_policy(timeout, policy))
    }

    pub fn from_guard(guard: TimeoutGuard) -> Self {
        Self { guard }
    }
}

impl<S> Layer<S> for TimeoutGuardLayer {
    type Service = TimeoutGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutGuardService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

/// Service produced by [`TimeoutGuardLayer`].
#[derive(Debug, Clone)]
pub struct TimeoutGuardService<S> {
    inner: S,
    guard: TimeoutGuard,
}

impl<S> TimeoutGuardService<S> {
    pub fn new(inner: S, guard: TimeoutGuard) -> Self {
        Self { inner, guard }
    }
}

impl<S, B> Service<Request<B>> for TimeoutGuardService<S>
where
    S: Service<Request<B>, Response = Response>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let span = tracing::info_span!(
            "timeout_guard",
            method = %request.method(),
            uri = %request.uri(),
        );
        let guard = self.guard.clone();
        let handler = self.inner.call(request);

        Box::pin(
            async move {
                let (slot, fallback) = ResponseSlot::channel();
                let res = guard.arm(slot);
                let mut handler = tokio::spawn(handler.in_current_span());

                let outcome = tokio::select! {
                    biased;
                    joined = &mut handler => Some(joined),
                    _ = res.timed_out() => None,
                };

                let result = match outcome {
                    Some(Ok(result)) => result,
                    Some(Err(err)) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                    Some(Err(err)) => {
                        tracing::error!(error = %err, "Handler task cancelled");
                        res.complete();
                        return Ok(guard.policy().to_response());
                    }
                    None => {
                        let response = take_fallback(fallback, &guard).await;
                        tokio::spawn(
                            async move {
                                let _ = handler.await;
                                res.complete();
                                tracing::debug!("Discarding handler result produced after timeout");
                            }
                            .in_current_span(),
                        );
                        return Ok(response);
                    }
                };

                match res.complete() {
                    Completion::Finished => result,
                    Completion::TimedOut => {
                        tracing::debug!("Discarding handler result produced after timeout");
                        Ok(take_fallback(fallback, &guard).await)
                    }
                }
            }
            .instrument(span),
        )
    }
}

async fn take_fallback(fallback: oneshot::Receiver<Response>, guard: &TimeoutGuard) -> Response {
    // Only empty if the fallback write itself failed.
    fallback
        .await
        .unwrap_or_else(|_| guard.policy().to_response())
}
