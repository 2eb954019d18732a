//! Typed wrappers for each API resource.
//!
//! Every operation here is a thin layer over the dispatcher: pick a method
//! and resource path, then decode the body into the resource's model. In
//! batch mode they all return `CallResult::Queued`, and the matching
//! `BatchOutcome` can be decoded into the same model type later.

pub mod customers;
pub mod drip_campaigns;
pub mod emails;
pub mod esp_accounts;
pub mod logs;
pub mod segments;
pub mod snippets;
pub mod templates;

use serde::{Deserialize, Serialize};

/// Generic acknowledgement returned by delete/activate style endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub status: String,
}

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }
}

/// Sender override for an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}
