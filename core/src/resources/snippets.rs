//! Reusable template fragments.

use serde::{Deserialize, Serialize};

use super::StatusResponse;
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<i64>,
}

/// Create or update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetContent {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetResponse {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    pub snippet: Snippet,
}

impl<T: Transport> Client<T> {
    pub fn list_snippets(&self) -> Result<CallResult<Vec<Snippet>>, ApiError> {
        self.get("snippets", &[])?.decode()
    }

    pub fn get_snippet(&self, snippet_id: &str) -> Result<CallResult<Snippet>, ApiError> {
        self.get(&format!("snippets/{snippet_id}"), &[])?.decode()
    }

    pub fn create_snippet(&self, content: &SnippetContent) -> Result<CallResult<SnippetResponse>, ApiError> {
        self.post("snippets", content)?.decode()
    }

    pub fn update_snippet(
        &self,
        snippet_id: &str,
        content: &SnippetContent,
    ) -> Result<CallResult<SnippetResponse>, ApiError> {
        self.put(&format!("snippets/{snippet_id}"), content)?.decode()
    }

    pub fn delete_snippet(&self, snippet_id: &str) -> Result<CallResult<StatusResponse>, ApiError> {
        self.delete(&format!("snippets/{snippet_id}"))?.decode()
    }
}
