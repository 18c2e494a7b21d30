//! Response handles the guard can protect.
//!
//! # Responsibilities
//! - Define the write surface of an in-flight response (`ResponseWriter`)
//! - Provide a one-shot handle that resolves into an axum `Response`
//! - Provide an in-memory handle that records every transport write
//!
//! # Design Decisions
//! - Writes are synchronous; the guard holds a lock across check-and-write
//! - The first `send` commits the headers; later sends fail with `AlreadySent`
//!   and later status/content-type changes are ignored
//! - `send_status` mirrors the usual "status plus reason phrase" shortcut

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use thiserror::Error;
use tokio::sync::oneshot;

/// Content type used for fallback and `send_status` bodies.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Transport error raised by a response handle.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response already sent")]
    AlreadySent,

    #[error("client went away before the response was written")]
    Closed,

    #[error("invalid content type {0:?}")]
    InvalidContentType(String),
}

/// The write-capable surface of one in-flight response.
pub trait ResponseWriter {
    /// Whether the status line and headers have been committed.
    fn headers_sent(&self) -> bool;

    /// Set the status code for the next write.
    fn set_status(&mut self, status: StatusCode);

    /// Set the `Content-Type` for the next write.
    fn set_content_type(&mut self, mime: &str);

    /// Write the body and finish the response.
    fn send(&mut self, body: Bytes) -> Result<(), WriteError>;

    /// Finish the response with `status` and its reason phrase as body.
    fn send_status(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.set_status(status);
        self.set_content_type(TEXT_PLAIN);
        let reason = status.canonical_reason().unwrap_or("");
        self.send(Bytes::from_static(reason.as_bytes()))
    }
}

/// Handle whose single write is delivered as an axum `Response`.
///
/// Used by the tower layer: the fallback written by the timer comes out of
/// the receiver returned by [`ResponseSlot::channel`].
#[derive(Debug)]
pub struct ResponseSlot {
    status: StatusCode,
    content_type: Option<String>,
    tx: Option<oneshot::Sender<Response>>,
}

impl ResponseSlot {
    /// Create a slot and the receiver its response is delivered on.
    pub fn channel() -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        let slot = Self {
            status: StatusCode::OK,
            content_type: None,
            tx: Some(tx),
        };
        (slot, rx)
    }
}

impl ResponseWriter for ResponseSlot {
    fn headers_sent(&self) -> bool {
        self.tx.is_none()
    }

    fn set_status(&mut self, status: StatusCode) {
        if !self.headers_sent() {
            self.status = status;
        }
    }

    fn set_content_type(&mut self, mime: &str) {
        if !self.headers_sent() {
            self.content_type = Some(mime.to_string());
        }
    }

    fn send(&mut self, body: Bytes) -> Result<(), WriteError> {
        let tx = self.tx.take().ok_or(WriteError::AlreadySent)?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        if let Some(mime) = &self.content_type {
            let value = HeaderValue::from_str(mime)
                .map_err(|_| WriteError::InvalidContentType(mime.clone()))?;
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }

        tx.send(response).map_err(|_| WriteError::Closed)
    }
}

/// In-memory handle that records what reached the transport.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Option<Bytes>,
    writes: usize,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: None,
            body: None,
            writes: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Body of the committed response, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Number of bodies that reached the transport.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_sent(&self) -> bool {
        self.body.is_some()
    }

    fn set_status(&mut self, status: StatusCode) {
        if !self.headers_sent() {
            self.status = status;
        }
    }

    fn set_content_type(&mut self, mime: &str) {
        if !self.headers_sent() {
            self.content_type = Some(mime.to_string());
        }
    }

    fn send(&mut self, body: Bytes) -> Result<(), WriteError> {
        if self.body.is_some() {
            return Err(WriteError::AlreadySent);
        }
        self.body = Some(body);
        self.writes += 1;
        Ok(())
    }
}
