//! Drip campaigns: multi-step email sequences a recipient is enrolled in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Recipient, Sender, StatusResponse};
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripCampaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_email_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drip_steps: Vec<DripStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripStep {
    pub id: String,
    pub email_id: String,
    #[serde(default)]
    pub delay_seconds: u64,
}

/// Enrolment of one recipient into a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DripActivation {
    pub recipient: Recipient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp_account: Option<String>,
}

impl DripActivation {
    pub fn new(recipient: Recipient) -> Self {
        Self {
            recipient,
            sender: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            email_data: None,
            tags: Vec::new(),
            locale: None,
            esp_account: None,
        }
    }
}

#[derive(Serialize)]
struct RecipientAddress<'a> {
    recipient_address: &'a str,
}

impl<T: Transport> Client<T> {
    pub fn list_drip_campaigns(&self) -> Result<CallResult<Vec<DripCampaign>>, ApiError> {
        self.get("drip_campaigns", &[])?.decode()
    }

    pub fn get_drip_campaign(&self, campaign_id: &str) -> Result<CallResult<DripCampaign>, ApiError> {
        self.get(&format!("drip_campaigns/{campaign_id}"), &[])?.decode()
    }

    pub fn activate_drip_campaign(
        &self,
        campaign_id: &str,
        activation: &DripActivation,
    ) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post(&format!("drip_campaigns/{campaign_id}/activate"), activation)?
            .decode()
    }

    /// Remove `recipient_address` from one campaign.
    pub fn deactivate_drip_campaign(
        &self,
        campaign_id: &str,
        recipient_address: &str,
    ) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post(
            &format!("drip_campaigns/{campaign_id}/deactivate"),
            &RecipientAddress { recipient_address },
        )?
        .decode()
    }

    /// Remove `recipient_address` from every campaign.
    pub fn deactivate_all_drip_campaigns(&self, recipient_address: &str) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post("drip_campaigns/deactivate", &RecipientAddress { recipient_address })?
            .decode()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::tests::client;

    #[test]
    fn get_campaign_with_steps() {
        let c = client();
        c.transport().respond(
            200,
            r#"{"id":"dc_1","name":"Onboarding","enabled":true,"drip_steps":[{"id":"dcs_1","email_id":"tem_1","delay_seconds":86400}]}"#,
        );
        let campaign = c.get_drip_campaign("dc_1").unwrap().completed().unwrap();
        assert!(campaign.enabled);
        assert_eq!(campaign.drip_steps[0].delay_seconds, 86400);
    }

    #[test]
    fn activate_and_deactivate_bodies() {
        let c = client();
        let activation = DripActivation::new(Recipient::new("ada@example.com"));
        c.activate_drip_campaign("dc_1", &activation).unwrap();
        c.deactivate_drip_campaign("dc_1", "ada@example.com").unwrap();
        c.deactivate_all_drip_campaigns("ada@example.com").unwrap();

        let sent = c.transport().sent();
        assert!(sent[0].url.ends_with("/api/v1/drip_campaigns/dc_1/activate"));
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"recipient": {"address": "ada@example.com"}}));

        assert!(sent[1].url.ends_with("/api/v1/drip_campaigns/dc_1/deactivate"));
        assert!(sent[2].url.ends_with("/api/v1/drip_campaigns/deactivate"));
        let body: Value = serde_json::from_str(sent[2].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"recipient_address": "ada@example.com"}));
    }
}
