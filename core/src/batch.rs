//! Batch mode state and the batch endpoint's wire types.
//!
//! # Design
//! While batch mode is active the dispatcher records each call as a
//! `PendingCall` instead of sending it. Submission posts the whole pending
//! list to `/api/{version}/batch` as one JSON array; the server answers with
//! one `BatchOutcome` per call, in submission order. Outcome bodies are kept
//! as raw JSON and only bound to a type when the caller asks, so a single
//! batch can mix templates, receipts, customers and anything else.
//!
//! The registry belongs to a single `Client`. Starting a new batch discards
//! whatever was pending.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Batch capacity of a freshly configured client.
pub const DEFAULT_MAX_BATCH_REQUESTS: usize = 10;

/// Resource name of the batch endpoint, relative to `/api/{version}/`.
pub const BATCH_RESOURCE: &str = "batch";

/// A buffered call, exactly as it is submitted to the batch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCall {
    /// Full resource path, including any query string.
    pub path: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PendingCall {
    pub fn new(method: HttpMethod, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            path: path.into(),
            method,
            body,
        }
    }
}

/// The server's answer for one call of a submitted batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub path: String,
    pub status_code: u16,
    pub method: String,
    #[serde(default)]
    pub body: Value,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decode the body as `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::Deserialization(format!("{} {}: {e}", self.method, self.path)))
    }

    /// Decode the body as `T`, turning a non-2xx outcome into the same
    /// `ApiError::Http` an immediate call would have produced.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Http {
                status: self.status_code,
                body: self.body.to_string(),
            });
        }
        self.decode()
    }
}

/// Batch mode flag, pending calls and capacity for one client.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRegistry {
    active: bool,
    pending: Vec<PendingCall>,
    max_requests: usize,
    default_max_requests: usize,
}

impl Default for BatchRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BATCH_REQUESTS)
    }
}

impl BatchRegistry {
    /// Inactive, empty registry whose capacity (and reset value) is
    /// `max_requests`.
    pub fn new(max_requests: usize) -> Self {
        Self {
            active: false,
            pending: Vec::new(),
            max_requests,
            default_max_requests: max_requests,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pending(&self) -> &[PendingCall] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Enter batch mode with an empty batch. Anything still pending is
    /// dropped without being sent.
    pub fn start(&mut self) {
        if !self.pending.is_empty() {
            info!(discarded = self.pending.len(), "starting new batch, discarding pending calls");
        }
        self.active = true;
        self.pending.clear();
    }

    /// Leave batch mode, keeping pending calls for a later `resume`.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Re-enter batch mode; new calls append after the kept ones.
    pub fn resume(&mut self) {
        self.active = true;
    }

    /// Leave batch mode and drop every pending call.
    pub fn abort(&mut self) {
        info!(discarded = self.pending.len(), "aborting batch");
        self.active = false;
        self.pending.clear();
    }

    /// Append `call` and return its position in the batch. Fails without
    /// changing anything when the batch is already at capacity.
    pub fn add(&mut self, call: PendingCall) -> Result<usize, ApiError> {
        if self.pending.len() >= self.max_requests {
            return Err(ApiError::BatchCapacityExceeded {
                limit: self.max_requests,
            });
        }
        let position = self.pending.len();
        debug!(method = %call.method, path = %call.path, position, "queued batch call");
        self.pending.push(call);
        Ok(position)
    }

    /// Leave batch mode and hand over every pending call, leaving the
    /// registry empty.
    pub fn take_for_submission(&mut self) -> Vec<PendingCall> {
        self.active = false;
        std::mem::take(&mut self.pending)
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Change the capacity. The server enforces its own limit; no bound is
    /// applied here. Calls already pending are kept even if they exceed the
    /// new capacity.
    pub fn override_max_requests(&mut self, max_requests: usize) {
        self.max_requests = max_requests;
    }

    pub fn reset_max_requests(&mut self) {
        self.max_requests = self.default_max_requests;
    }
}
