//! The network boundary.
//!
//! # Design
//! `Transport` executes exactly one HTTP exchange. Any response the server
//! produces, whatever its status, is a successful transport result; only
//! failures to obtain a response (timeouts, refused connections, broken
//! streams) are errors. Retrying and status interpretation live above this
//! layer, so a test can swap in a scripted transport and exercise them
//! without a socket.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A failed attempt to obtain an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Executes a single HTTP request. Implementations must give up and return
/// `TransportError::Timeout` once `timeout` has elapsed.
pub trait Transport {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        (**self).send(request, timeout)
    }
}

/// Blocking transport backed by `ureq`.
///
/// Status codes are returned as data (`http_status_as_error(false)`). The
/// timeout is applied per request, so one agent serves any retry policy.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, ?timeout, "sending request");

        let url = request.url.as_str();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(url), request, timeout).call(),
            (HttpMethod::Delete, _) => prepare(self.agent.delete(url), request, timeout).call(),
            (HttpMethod::Post, Some(body)) => {
                prepare(self.agent.post(url), request, timeout).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => prepare(self.agent.post(url), request, timeout).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                prepare(self.agent.put(url), request, timeout).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => prepare(self.agent.put(url), request, timeout).send_empty(),
        };

        let mut response = result.map_err(TransportError::from)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::from)?;
        Ok(HttpResponse { status, body })
    }
}

/// Attach the request headers and bound the whole exchange by `timeout`.
fn prepare<B>(
    builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
    timeout: Duration,
) -> ureq::RequestBuilder<B> {
    let mut builder = builder.config().timeout_global(Some(timeout)).build();
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(t) => TransportError::Timeout(t.to_string()),
            ureq::Error::Io(e) => e.into(),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                TransportError::Connection(err.to_string())
            }
            other => TransportError::Io(other.to_string()),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                TransportError::Timeout(err.to_string())
            }
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => TransportError::Connection(err.to_string()),
            _ => TransportError::Io(err.to_string()),
        }
    }
}
