//! Delivery logs for sent emails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::StatusResponse;
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub id: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    #[serde(default)]
    pub email_name: Option<String>,
    #[serde(default)]
    pub email_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Filters for listing logs. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    /// Only logs created after this unix timestamp.
    pub created_gt: Option<i64>,
    /// Only logs created before this unix timestamp.
    pub created_lt: Option<i64>,
}

impl LogQuery {
    fn params(&self) -> Vec<(&'static str, Value)> {
        let mut params = Vec::new();
        if let Some(count) = self.count {
            params.push(("count", json!(count)));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", json!(offset)));
        }
        if let Some(created_gt) = self.created_gt {
            params.push(("created_gt", json!(created_gt)));
        }
        if let Some(created_lt) = self.created_lt {
            params.push(("created_lt", json!(created_lt)));
        }
        params
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    log_id: &'a str,
}

impl<T: Transport> Client<T> {
    pub fn list_logs(&self, query: &LogQuery) -> Result<CallResult<Vec<Log>>, ApiError> {
        self.get("logs", &query.params())?.decode()
    }

    pub fn get_log(&self, log_id: &str) -> Result<CallResult<Log>, ApiError> {
        self.get(&format!("logs/{log_id}"), &[])?.decode()
    }

    pub fn get_log_events(&self, log_id: &str) -> Result<CallResult<Vec<LogEvent>>, ApiError> {
        self.get(&format!("logs/{log_id}/events"), &[])?.decode()
    }

    /// Send the email recorded in a log again.
    pub fn resend_log(&self, log_id: &str) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post("resend", &ResendRequest { log_id })?.decode()
    }
}
