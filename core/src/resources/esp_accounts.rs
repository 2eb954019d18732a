//! Email service provider accounts that deliver outgoing mail.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::request::RAW_QUERY_PARAM;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EspType {
    Sendgrid,
    Mailgun,
    Mandrill,
    Postmark,
    Ses,
    Mailjet,
    Sparkpost,
    Smtp,
}

impl EspType {
    pub fn as_str(self) -> &'static str {
        match self {
            EspType::Sendgrid => "sendgrid",
            EspType::Mailgun => "mailgun",
            EspType::Mandrill => "mandrill",
            EspType::Postmark => "postmark",
            EspType::Ses => "ses",
            EspType::Mailjet => "mailjet",
            EspType::Sparkpost => "sparkpost",
            EspType::Smtp => "smtp",
        }
    }
}

impl fmt::Display for EspType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspAccount {
    pub id: String,
    pub name: String,
    pub esp_type: EspType,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspAccountList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status: String,
    pub esp_accounts: Vec<EspAccount>,
}

#[derive(Serialize)]
struct SetDefault<'a> {
    esp_id: &'a str,
}

impl<T: Transport> Client<T> {
    /// List accounts, optionally only those of one provider.
    pub fn list_esp_accounts(&self, esp_type: Option<EspType>) -> Result<CallResult<Vec<EspAccount>>, ApiError> {
        let query: Vec<(&str, Value)> = esp_type
            .map(|t| (RAW_QUERY_PARAM, Value::String(t.as_str().to_string())))
            .into_iter()
            .collect();
        let result: CallResult<EspAccountList> = self.get("esp_accounts", &query)?.decode()?;
        Ok(result.map(|list| list.esp_accounts))
    }

    /// Make `esp_id` the account used when a send names none.
    pub fn set_default_esp_account(&self, esp_id: &str) -> Result<CallResult<EspAccount>, ApiError> {
        self.post("esp_accounts/set_default", &SetDefault { esp_id })?.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client;

    #[test]
    fn filter_is_sent_unquoted() {
        let c = client();
        c.transport().respond(
            200,
            r#"{"success":true,"status":"OK","esp_accounts":[{"id":"esp_1","name":"Main","esp_type":"sendgrid","default":true}]}"#,
        );

        let accounts = c
            .list_esp_accounts(Some(EspType::Sendgrid))
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].esp_type, EspType::Sendgrid);
        assert!(c.transport().sent()[0]
            .url
            .ends_with("/api/v1/esp_accounts?esp_type=sendgrid"));
    }

    #[test]
    fn no_filter_means_no_query() {
        let c = client();
        c.transport().respond(200, r#"{"esp_accounts":[]}"#);
        c.list_esp_accounts(None).unwrap();
        assert!(c.transport().sent()[0].url.ends_with("/api/v1/esp_accounts"));
    }

    #[test]
    fn batched_listing_stays_queued() {
        let c = client();
        c.start_new_batch_request();
        let result = c.list_esp_accounts(Some(EspType::Ses)).unwrap();
        assert_eq!(result.queued_position(), Some(0));
        assert_eq!(
            c.pending_batch_requests()[0].path,
            "/api/v1/esp_accounts?esp_type=ses"
        );
    }
}
