//! Customer records, keyed by email address.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StatusResponse;
use crate::client::{CallResult, Client};
use crate::error::ApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

impl Customer {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            data: None,
            locale: None,
            created: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    pub customer: Customer,
}

impl<T: Transport> Client<T> {
    pub fn get_customer(&self, email: &str) -> Result<CallResult<CustomerResponse>, ApiError> {
        self.get(&format!("customers/{email}"), &[])?.decode()
    }

    /// Create the customer, or replace the data of an existing one.
    pub fn upsert_customer(&self, customer: &Customer) -> Result<CallResult<StatusResponse>, ApiError> {
        self.post("customers", customer)?.decode()
    }

    pub fn delete_customer(&self, email: &str) -> Result<CallResult<StatusResponse>, ApiError> {
        self.delete(&format!("customers/{email}"))?.decode()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::tests::client;
    use crate::http::HttpMethod;

    #[test]
    fn get_customer_unwraps_envelope() {
        let c = client();
        c.transport().respond(
            200,
            r#"{"success":true,"status":"OK","customer":{"email":"ada@example.com","data":{"plan":"pro"},"locale":"en-US"}}"#,
        );
        let response = c.get_customer("ada@example.com").unwrap().completed().unwrap();
        assert_eq!(response.customer.data, Some(json!({"plan": "pro"})));
        assert!(c.transport().sent()[0].url.ends_with("/api/v1/customers/ada@example.com"));
    }

    #[test]
    fn upsert_and_delete() {
        let c = client();
        c.transport().respond(200, r#"{"success":true,"status":"OK"}"#);
        c.transport().respond(200, r#"{"success":true,"status":"OK"}"#);

        let mut customer = Customer::new("ada@example.com");
        customer.data = Some(json!({"plan": "pro"}));
        assert!(c.upsert_customer(&customer).unwrap().completed().unwrap().success);
        assert!(c.delete_customer("ada@example.com").unwrap().completed().unwrap().success);

        let sent = c.transport().sent();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[1].method, HttpMethod::Delete);
    }

    #[test]
    fn missing_customer_is_not_found() {
        let c = client();
        c.transport().respond(404, r#"{"error":"customer not found"}"#);
        assert!(c.get_customer("nobody@example.com").unwrap_err().is_not_found());
    }
}
