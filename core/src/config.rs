//! Client configuration.
//!
//! `ClientConfig::new` gives the production defaults; `from_env` reads the
//! `SWU_*` environment variables on top of them.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::batch::DEFAULT_MAX_BATCH_REQUESTS;
use crate::error::ApiError;
use crate::retry::RetryPolicy;

pub const DEFAULT_API_HOST: &str = "api.sendwithus.com";
pub const DEFAULT_API_PORT: u16 = 443;
pub const DEFAULT_API_PROTO: &str = "https";
pub const DEFAULT_API_VERSION: &str = "v1";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-SWU-API-KEY";
/// Header identifying the client library and its version.
pub const API_CLIENT_HEADER: &str = "X-SWU-API-CLIENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_host: String,
    pub api_port: u16,
    pub api_proto: String,
    pub api_version: String,
    pub retry: RetryPolicy,
    /// Capacity a fresh client starts with, and the value
    /// `set_maximum_batch_requests_to_default` restores.
    pub max_batch_requests: usize,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            api_proto: DEFAULT_API_PROTO.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            retry: RetryPolicy::default(),
            max_batch_requests: DEFAULT_MAX_BATCH_REQUESTS,
        }
    }

    /// Build a config from `SWU_API_KEY` (required) and the optional
    /// `SWU_API_HOST`, `SWU_API_PORT`, `SWU_API_PROTO`, `SWU_API_VERSION`,
    /// `SWU_RETRY_COUNT`, `SWU_RETRY_INTERVAL_MS`, `SWU_TIMEOUT_MS` and
    /// `SWU_MAX_BATCH_REQUESTS` variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_key = lookup("SWU_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::Config("SWU_API_KEY is not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Some(host) = lookup("SWU_API_HOST") {
            config.api_host = host;
        }
        if let Some(port) = parse_var::<u16>(&lookup, "SWU_API_PORT")? {
            config.api_port = port;
        }
        if let Some(proto) = lookup("SWU_API_PROTO") {
            config.api_proto = proto;
        }
        if let Some(version) = lookup("SWU_API_VERSION") {
            config.api_version = version;
        }
        if let Some(count) = parse_var::<u32>(&lookup, "SWU_RETRY_COUNT")? {
            config.retry = config.retry.with_max_attempts(count);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWU_RETRY_INTERVAL_MS")? {
            config.retry.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SWU_TIMEOUT_MS")? {
            config.retry.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<usize>(&lookup, "SWU_MAX_BATCH_REQUESTS")? {
            config.max_batch_requests = max;
        }
        Ok(config)
    }

    /// `{proto}://{host}:{port}`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.api_proto,
            self.api_host.trim_end_matches('/'),
            self.api_port
        )
    }

    /// Value sent in the client-identification header.
    pub fn client_id(&self) -> String {
        format!("rust-{}", env!("CARGO_PKG_VERSION"))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ApiError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ApiError::Config(format!("{name}={raw:?}: {e}"))),
    }
}
