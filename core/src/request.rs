//! Path, query string and header construction shared by the immediate and
//! batched call paths.

use serde_json::Value;

use crate::config::{ClientConfig, API_CLIENT_HEADER, API_KEY_HEADER};

/// Query parameter whose value is written as a bare token instead of JSON.
pub const RAW_QUERY_PARAM: &str = "esp_type";

/// Ordered query parameters. Values are JSON-encoded when rendered.
pub type QueryParams<'a> = [(&'a str, Value)];

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    api_version: String,
    api_key: String,
    client_id: String,
}

impl RequestBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
            client_id: config.client_id(),
        }
    }

    /// `/api/{version}/{resource}`.
    pub fn build_path(&self, resource: &str) -> String {
        format!(
            "/api/{}/{}",
            self.api_version,
            resource.trim_start_matches('/')
        )
    }

    /// Render `params` as `?k1=v1&k2=v2` in the given order, or an empty
    /// string when there are none.
    ///
    /// Values are JSON-encoded (`5`, `true`, `"text"`), except `esp_type`
    /// which is emitted unquoted. Nothing is percent-encoded.
    pub fn build_query_string(params: &QueryParams<'_>) -> String {
        if params.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{name}={}", encode_query_value(name, value)))
            .collect();
        format!("?{}", pairs.join("&"))
    }

    /// Absolute URL for an already built path.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Headers sent with every immediate request. `Content-Type` is only
    /// added when the request carries a body.
    pub fn standard_headers(&self, has_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
            (API_CLIENT_HEADER.to_string(), self.client_id.clone()),
        ];
        if has_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }
}

fn encode_query_value(name: &str, value: &Value) -> String {
    match value {
        Value::String(raw) if name == RAW_QUERY_PARAM => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(&ClientConfig::new("test_key"))
    }

    #[test]
    fn path_includes_api_version() {
        assert_eq!(builder().build_path("templates"), "/api/v1/templates");
        assert_eq!(builder().build_path("/templates/tem_1"), "/api/v1/templates/tem_1");
    }

    #[test]
    fn empty_query_string() {
        assert_eq!(RequestBuilder::build_query_string(&[]), "");
    }

    #[test]
    fn esp_type_is_unquoted() {
        let query = RequestBuilder::build_query_string(&[
            ("count", json!(5)),
            ("esp_type", json!("sendgrid")),
        ]);
        assert_eq!(query, "?count=5&esp_type=sendgrid");
    }

    #[test]
    fn other_strings_are_json_encoded_in_order() {
        let query = RequestBuilder::build_query_string(&[
            ("locale", json!("en-US")),
            ("offset", json!(10)),
            ("active", json!(true)),
        ]);
        assert_eq!(query, r#"?locale="en-US"&offset=10&active=true"#);
    }

    #[test]
    fn url_joins_base_and_path() {
        let b = builder();
        let url = b.build_url(&b.build_path("send"));
        assert_eq!(url, "https://api.sendwithus.com:443/api/v1/send");
    }

    #[test]
    fn standard_headers_carry_key_and_client() {
        let headers = builder().standard_headers(false);
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("X-SWU-API-KEY".to_string(), "test_key".to_string())));
        assert!(headers
            .iter()
            .any(|(k, v)| k == "X-SWU-API-CLIENT" && v.starts_with("rust-")));
        assert!(!headers.iter().any(|(k, _)| k == "Content-Type"));

        let with_body = builder().standard_headers(true);
        assert!(with_body.contains(&("Content-Type".to_string(), "application/json".to_string())));
    }
}
