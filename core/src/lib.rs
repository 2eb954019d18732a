//! Blocking client for a transactional-email REST API.
//!
//! # Overview
//! Every operation (templates, emails, customers, segments, drip campaigns,
//! snippets, logs, ESP accounts) funnels through one dispatcher, `Client`.
//! Calls are either sent immediately, with bounded retries on transport
//! failures, or, while batch mode is on, buffered and later submitted
//! together as a single request to the batch endpoint.
//!
//! # Design
//! - `Transport` is the only network boundary; `UreqTransport` is the
//!   default, tests script their own.
//! - Batch state lives in each `Client`, so independent clients never share
//!   a batch.
//! - Batch outcomes keep their bodies as raw JSON; callers decode each one
//!   into whatever type the matching call returns.
//!
//! ```no_run
//! use swu_core::{Client, ClientConfig, Email, Recipient, Template};
//!
//! # fn main() -> Result<(), swu_core::ApiError> {
//! let client = Client::new(ClientConfig::from_env()?);
//!
//! client.start_new_batch_request();
//! client.get_template("tem_1")?;
//! client.send_email(&Email::new("tem_1", Recipient::new("ada@example.com")))?;
//! let outcomes = client.send_batch_api_request()?;
//!
//! let template: Template = outcomes[0].decode()?;
//! println!("{} -> {}", template.name, outcomes[1].status_code);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod resources;
pub mod retry;
pub mod transport;

pub use batch::{BatchOutcome, BatchRegistry, PendingCall, DEFAULT_MAX_BATCH_REQUESTS};
pub use client::{CallResult, Client};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{QueryParams, RequestBuilder};
pub use resources::customers::{Customer, CustomerResponse};
pub use resources::drip_campaigns::{DripActivation, DripCampaign, DripStep};
pub use resources::emails::{Email, RenderRequest, RenderedTemplate, SendReceipt, SentEmail};
pub use resources::esp_accounts::{EspAccount, EspAccountList, EspType};
pub use resources::logs::{Log, LogEvent, LogQuery};
pub use resources::segments::{Segment, SegmentSend};
pub use resources::snippets::{Snippet, SnippetContent, SnippetResponse};
pub use resources::templates::{NewTemplate, Template, TemplateVersion, TemplateVersionSummary};
pub use resources::{Recipient, Sender, StatusResponse};
pub use retry::{RetryPolicy, RetryingSender};
pub use transport::{Transport, TransportError, UreqTransport};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
