//! Sending and rendering emails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Recipient, Sender};
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

/// A single templated email to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Template id.
    pub email_id: String,
    pub recipient: Recipient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
}

impl Email {
    pub fn new(email_id: impl Into<String>, recipient: Recipient) -> Self {
        Self {
            email_id: email_id.into(),
            recipient,
            email_data: None,
            sender: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            tags: Vec::new(),
            version_name: None,
            locale: None,
            esp_account: None,
            headers: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.email_data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub email: Option<SentEmail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEmail {
    pub name: String,
    #[serde(default)]
    pub version_name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default)]
    pub template_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Fail rendering on missing template variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTemplate {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    pub subject: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub text: String,
}

impl<T: Transport> Client<T> {
    pub fn send_email(&self, email: &Email) -> Result<CallResult<SendReceipt>, ApiError> {
        self.post("send", email)?.decode()
    }

    pub fn render_template(&self, request: &RenderRequest) -> Result<CallResult<RenderedTemplate>, ApiError> {
        self.post("render", request)?.decode()
    }
}
