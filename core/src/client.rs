//! The dispatcher every API operation goes through.
//!
//! # Design
//! `Client` decides, per call, between two paths:
//!
//! - **immediate**: build the URL, serialize the body, send it through the
//!   `RetryingSender`, reject non-2xx statuses and hand back the body text;
//! - **batched**: when batch mode is on, record the call in the client's
//!   `BatchRegistry` and return `CallResult::Queued` with the position its
//!   outcome will occupy.
//!
//! `send_batch_api_request` flushes the registry through the immediate path
//! as a single POST to the batch endpoint. The pending list is taken out of
//! the registry before sending, so a failed submission loses those calls.
//!
//! Batch state sits behind a mutex so each registry operation is atomic, but
//! there is still only one batch per client; threads sharing a client share
//! its batch.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::batch::{BatchOutcome, BatchRegistry, PendingCall, BATCH_RESOURCE};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::request::{QueryParams, RequestBuilder};
use crate::retry::{RetryPolicy, RetryingSender};
use crate::transport::{Transport, UreqTransport};

/// Result of dispatching one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult<T> {
    /// The call was sent and answered.
    Completed(T),
    /// The call was added to the pending batch. Its outcome will be at
    /// `position` in the list returned by `send_batch_api_request`.
    Queued { position: usize },
}

impl<T> CallResult<T> {
    pub fn is_queued(&self) -> bool {
        matches!(self, CallResult::Queued { .. })
    }

    pub fn completed(self) -> Option<T> {
        match self {
            CallResult::Completed(value) => Some(value),
            CallResult::Queued { .. } => None,
        }
    }

    pub fn queued_position(&self) -> Option<usize> {
        match self {
            CallResult::Completed(_) => None,
            CallResult::Queued { position } => Some(*position),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallResult<U> {
        match self {
            CallResult::Completed(value) => CallResult::Completed(f(value)),
            CallResult::Queued { position } => CallResult::Queued { position },
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<CallResult<U>, E> {
        match self {
            CallResult::Completed(value) => f(value).map(CallResult::Completed),
            CallResult::Queued { position } => Ok(CallResult::Queued { position }),
        }
    }
}

impl CallResult<String> {
    /// Deserialize a completed response body as `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<CallResult<T>, ApiError> {
        self.try_map(|body| decode_body(&body))
    }
}

/// Blocking client for the email API.
#[derive(Debug)]
pub struct Client<T = UreqTransport> {
    requests: RequestBuilder,
    sender: RetryingSender<T>,
    batch: Mutex<BatchRegistry>,
}

impl Client<UreqTransport> {
    /// Client using `ureq`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            requests: RequestBuilder::new(&config),
            sender: RetryingSender::new(transport, config.retry),
            batch: Mutex::new(BatchRegistry::new(config.max_batch_requests)),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.sender.policy()
    }

    pub fn transport(&self) -> &T {
        self.sender.transport()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// GET `resource`, with `query` appended as a query string.
    pub fn get(&self, resource: &str, query: &QueryParams<'_>) -> Result<CallResult<String>, ApiError> {
        let path = format!(
            "{}{}",
            self.requests.build_path(resource),
            RequestBuilder::build_query_string(query)
        );
        self.dispatch(HttpMethod::Get, path, None)
    }

    pub fn put<B: Serialize + ?Sized>(&self, resource: &str, body: &B) -> Result<CallResult<String>, ApiError> {
        let body = to_value(body)?;
        self.dispatch(HttpMethod::Put, self.requests.build_path(resource), Some(body))
    }

    pub fn post<B: Serialize + ?Sized>(&self, resource: &str, body: &B) -> Result<CallResult<String>, ApiError> {
        let body = to_value(body)?;
        self.dispatch(HttpMethod::Post, self.requests.build_path(resource), Some(body))
    }

    /// POST without a request body.
    pub fn post_empty(&self, resource: &str) -> Result<CallResult<String>, ApiError> {
        self.dispatch(HttpMethod::Post, self.requests.build_path(resource), None)
    }

    pub fn delete(&self, resource: &str) -> Result<CallResult<String>, ApiError> {
        self.dispatch(HttpMethod::Delete, self.requests.build_path(resource), None)
    }

    fn dispatch(&self, method: HttpMethod, path: String, body: Option<Value>) -> Result<CallResult<String>, ApiError> {
        {
            let mut batch = self.batch.lock();
            if batch.is_active() {
                let position = batch.add(PendingCall::new(method, path, body))?;
                return Ok(CallResult::Queued { position });
            }
        }
        self.send_now(method, &path, body.as_ref()).map(CallResult::Completed)
    }

    /// The immediate path: send with retries and reject non-2xx responses.
    fn send_now(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<String, ApiError> {
        let body = body
            .map(|b| serde_json::to_string(b).map_err(|e| ApiError::Serialization(e.to_string())))
            .transpose()?;
        let request = HttpRequest {
            method,
            url: self.requests.build_url(path),
            headers: self.requests.standard_headers(body.is_some()),
            body,
        };

        let response = self.sender.send(&request)?;
        debug!(%method, path, status = response.status, "received response");
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    // -----------------------------------------------------------------------
    // Batch mode
    // -----------------------------------------------------------------------

    /// Enter batch mode with an empty batch, discarding anything pending.
    pub fn start_new_batch_request(&self) {
        self.batch.lock().start();
    }

    /// Send calls immediately again, keeping the pending batch.
    pub fn pause_batch_request(&self) {
        self.batch.lock().pause();
    }

    /// Go back to queueing calls onto the kept batch.
    pub fn resume_batch_request(&self) {
        self.batch.lock().resume();
    }

    /// Leave batch mode and discard the pending batch.
    pub fn abort_batch_request(&self) {
        self.batch.lock().abort();
    }

    pub fn is_batch_api_mode_enabled(&self) -> bool {
        self.batch.lock().is_active()
    }

    /// Snapshot of the calls currently waiting in the batch.
    pub fn pending_batch_requests(&self) -> Vec<PendingCall> {
        self.batch.lock().pending().to_vec()
    }

    pub fn override_maximum_batch_requests(&self, max_requests: usize) {
        self.batch.lock().override_max_requests(max_requests);
    }

    pub fn set_maximum_batch_requests_to_default(&self) {
        self.batch.lock().reset_max_requests();
    }

    pub fn get_maximum_batch_requests(&self) -> usize {
        self.batch.lock().max_requests()
    }

    /// Submit every pending call as one request to the batch endpoint.
    ///
    /// Leaves batch mode and empties the pending list before sending, whether
    /// or not the submission succeeds. Outcome `i` answers the `i`-th queued
    /// call.
    pub fn send_batch_api_request(&self) -> Result<Vec<BatchOutcome>, ApiError> {
        let calls = self.batch.lock().take_for_submission();
        info!(calls = calls.len(), "submitting batch");

        let body = to_value(&calls)?;
        let path = self.requests.build_path(BATCH_RESOURCE);
        let response = self.send_now(HttpMethod::Post, &path, Some(&body))?;

        let outcomes: Vec<BatchOutcome> = decode_body(&response)?;
        if outcomes.len() != calls.len() {
            return Err(ApiError::BatchResponseMismatch {
                expected: calls.len(),
                actual: outcomes.len(),
            });
        }
        Ok(outcomes)
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
