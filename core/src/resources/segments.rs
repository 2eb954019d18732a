use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StatusResponse;
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

/// Send a template to every customer in a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSend {
    pub email_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_data: Option<Value>,
}

impl<T: Transport> Client<T> {
    pub fn list_segments(&self) -> Result<CallResult<Vec<Segment>>, ApiError> {
        self.get("segments", &[])?.decode()
    }

    pub fn send_segment(&self, segment_id: &str, send: &SegmentSend) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post(&format!("segments/{segment_id}/send"), send)?.decode()
    }
}
