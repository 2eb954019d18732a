//! Error types for the API client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body,
//! so callers can inspect exactly what the server said. Transport failures
//! never reach callers one by one: the retrying sender collects them and
//! surfaces `RetriesExhausted` once every attempt has failed.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A call was issued in batch mode while the pending batch was full.
    /// Nothing was queued and nothing was sent.
    #[error("batch is full: at most {limit} requests may be queued")]
    BatchCapacityExceeded { limit: usize },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Every transport attempt failed. Holds one entry per attempt, in order.
    #[error("request failed after {} attempts: {}", .attempts.len(), last_failure(.attempts))]
    RetriesExhausted { attempts: Vec<TransportError> },

    /// The batch endpoint returned a different number of outcomes than calls
    /// were submitted.
    #[error("batch response has {actual} outcomes, expected {expected}")]
    BatchResponseMismatch { expected: usize, actual: usize },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn last_failure(attempts: &[TransportError]) -> String {
    attempts
        .last()
        .map(ToString::to_string)
        .unwrap_or_else(|| "no attempts made".to_string())
}
