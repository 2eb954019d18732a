//! Email templates and their versions.

use serde::{Deserialize, Serialize};

use super::StatusResponse;
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub versions: Vec<TemplateVersionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVersionSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Full content of one template version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Payload for creating a template together with its first version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl<T: Transport> Client<T> {
    pub fn list_templates(&self) -> Result<CallResult<Vec<Template>>, ApiError> {
        self.get("templates", &[])?.decode()
    }

    pub fn get_template(&self, template_id: &str) -> Result<CallResult<Template>, ApiError> {
        self.get(&format!("templates/{template_id}"), &[])?.decode()
    }

    pub fn get_template_version(
        &self,
        template_id: &str,
        version_id: &str,
    ) -> Result<CallResult<TemplateVersion>, ApiError> {
        self.get(&format!("templates/{template_id}/versions/{version_id}"), &[])?
            .decode()
    }

    pub fn create_template(&self, template: &NewTemplate) -> Result<CallResult<Template>, ApiError> {
        self.post("templates", template)?.decode()
    }

    pub fn update_template_version(
        &self,
        template_id: &str,
        version_id: &str,
        version: &TemplateVersion,
    ) -> Result<CallResult<TemplateVersion>, ApiError> {
        self.put(&format!("templates/{template_id}/versions/{version_id}"), version)?
            .decode()
    }

    pub fn delete_template(&self, template_id: &str) -> Result<CallResult<StatusResponse>, ApiError> {
        self.delete(&format!("templates/{template_id}"))?.decode()
    }
}
