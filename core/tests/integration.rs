//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the real client
//! (`UreqTransport`, retries, dispatcher, batch mode) over HTTP. Covers the
//! immediate path, error statuses, and a full batch round trip whose
//! outcomes are decoded back into resource types.

use std::net::SocketAddr;
use std::time::Duration;

use swu_core::{
    ApiError, Client, ClientConfig, Customer, CustomerResponse, Email, EspType, NewTemplate,
    Recipient, RetryPolicy, SendReceipt, SnippetContent, StatusResponse, Template,
};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::new("test_key");
    config.api_proto = "http".to_string();
    config.api_host = addr.ip().to_string();
    config.api_port = addr.port();
    config.retry = RetryPolicy::default()
        .with_max_attempts(2)
        .with_retry_delay(Duration::from_millis(10))
        .with_attempt_timeout(Duration::from_secs(5));
    config
}

fn welcome_template() -> NewTemplate {
    NewTemplate {
        name: "Welcome".to_string(),
        subject: "Hello {{ name }}".to_string(),
        html: "<p>Hello {{ name }}</p>".to_string(),
        text: None,
        locale: None,
    }
}

#[test]
fn immediate_calls_round_trip() {
    let client = Client::new(config_for(start_server()));

    // Step 1: no templates yet.
    let templates = client.list_templates().unwrap().completed().unwrap();
    assert!(templates.is_empty());

    // Step 2: create one and read it back.
    let created = client
        .create_template(&welcome_template())
        .unwrap()
        .completed()
        .unwrap();
    let fetched = client.get_template(&created.id).unwrap().completed().unwrap();
    assert_eq!(fetched, created);

    // Step 3: send with it.
    let email = Email::new(created.id.clone(), Recipient::new("ada@example.com"));
    let receipt = client.send_email(&email).unwrap().completed().unwrap();
    assert!(receipt.success);
    let log_id = receipt.receipt_id.expect("receipt id");
    let log = client.get_log(&log_id).unwrap().completed().unwrap();
    assert_eq!(log.recipient_address.as_deref(), Some("ada@example.com"));

    // Step 4: delete, then it is gone.
    let deleted = client.delete_template(&created.id).unwrap().completed().unwrap();
    assert!(deleted.success);
    let err = client.get_template(&created.id).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn error_status_carries_raw_body() {
    let client = Client::new(config_for(start_server()));

    let email = Email::new("tem_missing", Recipient::new("ada@example.com"));
    match client.send_email(&email).unwrap_err() {
        ApiError::Http { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, r#"{"error":"unknown email_id tem_missing"}"#);
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[test]
fn esp_type_filter_reaches_server_unquoted() {
    let client = Client::new(config_for(start_server()));

    let accounts = client
        .list_esp_accounts(Some(EspType::Mailgun))
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "esp_mailgun");
}

#[test]
fn batch_round_trip_decodes_each_outcome() {
    let client = Client::new(config_for(start_server()));
    let template = client
        .create_template(&welcome_template())
        .unwrap()
        .completed()
        .unwrap();

    client.start_new_batch_request();
    let calls = [
        client.get_template(&template.id).unwrap().queued_position(),
        client
            .send_email(&Email::new(template.id.clone(), Recipient::new("ada@example.com")))
            .unwrap()
            .queued_position(),
        client
            .upsert_customer(&Customer::new("ada@example.com"))
            .unwrap()
            .queued_position(),
        client
            .get_customer("ada@example.com")
            .unwrap()
            .queued_position(),
        client.get_template("tem_missing").unwrap().queued_position(),
    ];
    assert_eq!(calls, [Some(0), Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(client.pending_batch_requests().len(), 5);

    let outcomes = client.send_batch_api_request().unwrap();
    assert!(!client.is_batch_api_mode_enabled());
    assert!(client.pending_batch_requests().is_empty());
    assert_eq!(outcomes.len(), 5);

    let methods: Vec<&str> = outcomes.iter().map(|o| o.method.as_str()).collect();
    assert_eq!(methods, ["GET", "POST", "POST", "GET", "GET"]);
    assert_eq!(outcomes[0].path, format!("/api/v1/templates/{}", template.id));

    let fetched: Template = outcomes[0].decode().unwrap();
    assert_eq!(fetched.id, template.id);
    let receipt: SendReceipt = outcomes[1].decode().unwrap();
    assert!(receipt.success);
    let upserted: StatusResponse = outcomes[2].decode().unwrap();
    assert!(upserted.success);
    let customer: CustomerResponse = outcomes[3].decode().unwrap();
    assert_eq!(customer.customer.email, "ada@example.com");

    assert_eq!(outcomes[4].status_code, 404);
    assert!(outcomes[4].clone().into_result::<Template>().unwrap_err().is_not_found());

    // Batch mode is off again: the next call goes out immediately.
    let again = client.get_template(&template.id).unwrap();
    assert!(!again.is_queued());
}

#[test]
fn pause_sends_immediately_and_resume_appends() {
    let client = Client::new(config_for(start_server()));

    client.start_new_batch_request();
    client
        .create_snippet(&SnippetContent {
            name: "footer".to_string(),
            body: "<p>Bye</p>".to_string(),
        })
        .unwrap();

    client.pause_batch_request();
    let snippets = client.list_snippets().unwrap().completed().unwrap();
    assert!(snippets.is_empty(), "the queued create has not been sent yet");

    client.resume_batch_request();
    assert_eq!(client.list_snippets().unwrap().queued_position(), Some(1));

    let outcomes = client.send_batch_api_request().unwrap();
    let listed: Vec<swu_core::Snippet> = outcomes[1].decode().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "footer");
}

#[test]
fn capacity_limit_rejects_extra_calls() {
    let client = Client::new(config_for(start_server()));
    client.override_maximum_batch_requests(2);

    client.start_new_batch_request();
    client.list_templates().unwrap();
    client.list_snippets().unwrap();
    let err = client.list_esp_accounts(None).unwrap_err();
    assert!(matches!(err, ApiError::BatchCapacityExceeded { limit: 2 }));

    let outcomes = client.send_batch_api_request().unwrap();
    assert_eq!(outcomes.len(), 2);
}

#[test]
fn aborted_batch_submits_nothing() {
    let client = Client::new(config_for(start_server()));

    client.start_new_batch_request();
    client.list_templates().unwrap();
    client.abort_batch_request();

    assert!(client.send_batch_api_request().unwrap().is_empty());
}

#[test]
fn unreachable_server_exhausts_retries() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = Client::new(config_for(addr));

    match client.list_templates().unwrap_err() {
        ApiError::RetriesExhausted { attempts } => assert_eq!(attempts.len(), 2),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}
