//! Fallback policies.
//!
//! Two policies exist because deployments disagree on what a timed-out
//! request should look like on the wire:
//!
//! | policy                | status | gated on headers | logs suppressed writes |
//! |-----------------------|--------|------------------|------------------------|
//! | `request_timeout`     | 408    | yes              | yes                    |
//! | `service_unavailable` | 503    | no               | no                     |
//!
//! Both send the plain-text body `Request Timeout`.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::http::response::TEXT_PLAIN;

/// Body written by every built-in policy.
pub const FALLBACK_BODY: &str = "Request Timeout";

/// What the guard writes when a request runs out of time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    status: StatusCode,
    body: Bytes,
    require_headers_unsent: bool,
    log_suppressed: bool,
}

impl FallbackPolicy {
    /// 408, skipped when the handler already committed headers.
    pub fn request_timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            body: Bytes::from_static(FALLBACK_BODY.as_bytes()),
            require_headers_unsent: true,
            log_suppressed: true,
        }
    }

    /// 503, written unconditionally. A write that fails because headers
    /// are already out is reported as a transport error and swallowed.
    pub fn service_unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Bytes::from_static(FALLBACK_BODY.as_bytes()),
            require_headers_unsent: false,
            log_suppressed: false,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn require_headers_unsent(mut self, required: bool) -> Self {
        self.require_headers_unsent = required;
        self
    }

    pub fn log_suppressed(mut self, enabled: bool) -> Self {
        self.log_suppressed = enabled;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn requires_headers_unsent(&self) -> bool {
        self.require_headers_unsent
    }

    pub fn logs_suppressed(&self) -> bool {
        self.log_suppressed
    }

    /// Build the fallback as a standalone response.
    pub fn to_response(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        response
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::request_timeout()
    }
}
