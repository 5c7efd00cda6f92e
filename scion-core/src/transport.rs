//! Transport abstraction between the host pipeline and the engine.
//!
//! The bridge translates the host's request/response types into these and
//! back, so the engine never depends on any particular host server.

use std::{
    io::Cursor,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};

use crate::error::EngineError;

/// Per-request capability flag for synchronous body access.
///
/// Disabled by default; the host opts a request back in for engine
/// compatibility. Clones share the underlying flag, so the copy stored in
/// the host request's extensions and the copy carried by the engine request
/// observe the same state.
#[derive(Debug, Clone, Default)]
pub struct BodyControl {
    allow_blocking: Arc<AtomicBool>,
}

impl BodyControl {
    /// Create a flag in the disabled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable synchronous body access.
    ///
    /// Idempotent: enabling an already enabled flag leaves it enabled; there
    /// is deliberately no way to disable it again mid-request.
    pub fn allow(&self) {
        self.allow_blocking.store(true, Ordering::Release);
    }

    /// Return `true` if synchronous body access is currently permitted.
    #[must_use]
    pub fn is_blocking_allowed(&self) -> bool {
        self.allow_blocking.load(Ordering::Acquire)
    }
}

/// A request as seen by the engine.
///
/// The body has already been buffered by the bridge; handlers read it either
/// as bytes or, when the request's [`BodyControl`] permits, through a
/// synchronous reader.
#[derive(Debug)]
pub struct EngineRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    body_control: BodyControl,
}

impl EngineRequest {
    /// Assemble a request from already-translated parts.
    #[must_use]
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        body: Bytes,
        body_control: BodyControl,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body,
            body_control,
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The buffered request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The capability flag governing synchronous body access.
    #[must_use]
    pub fn body_control(&self) -> &BodyControl {
        &self.body_control
    }

    /// Read the body through a synchronous `std::io::Read`.
    ///
    /// # Errors
    /// Returns [`EngineError::BlockingIoDisabled`] unless the request's
    /// [`BodyControl`] has been enabled.
    pub fn blocking_reader(&self) -> Result<impl std::io::Read + '_, EngineError> {
        if !self.body_control.is_blocking_allowed() {
            return Err(EngineError::BlockingIoDisabled);
        }
        Ok(Cursor::new(self.body.as_ref()))
    }
}

/// A response produced by an engine handler.
#[derive(Debug)]
pub struct EngineResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl EngineResponse {
    /// Create an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a `200 OK` plain-text response.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body.into()),
        }
    }

    /// Add a header, replacing any previous value under the same name.
    #[must_use]
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decompose into status, headers, and body for translation back into
    /// the host's response type.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}
