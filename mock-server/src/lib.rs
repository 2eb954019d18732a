use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower::ServiceExt;
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-swu-api-key";
pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub versions: Vec<TemplateVersion>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateVersion {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct SnippetContent {
    pub name: String,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Deserialize)]
pub struct Address {
    pub address: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub email_id: String,
    pub recipient: Address,
    #[serde(default)]
    pub email_data: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Log {
    pub id: String,
    pub email_id: String,
    pub email_name: String,
    pub recipient_address: String,
    pub recipient_name: Option<String>,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EspAccount {
    pub id: String,
    pub name: String,
    pub esp_type: String,
    pub default: bool,
}

/// One call inside a batch request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchCall {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub body: Option<Value>,
}

/// One entry of a batch response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub path: String,
    pub status_code: u16,
    pub method: String,
    pub body: Value,
}

#[derive(Default)]
pub struct Store {
    templates: BTreeMap<String, Template>,
    snippets: BTreeMap<String, Snippet>,
    customers: BTreeMap<String, Customer>,
    logs: BTreeMap<String, Log>,
    esp_accounts: Vec<EspAccount>,
}

impl Store {
    fn seeded() -> Self {
        Self {
            esp_accounts: vec![
                EspAccount {
                    id: "esp_sendgrid".to_string(),
                    name: "Primary".to_string(),
                    esp_type: "sendgrid".to_string(),
                    default: true,
                },
                EspAccount {
                    id: "esp_mailgun".to_string(),
                    name: "Backup".to_string(),
                    esp_type: "mailgun".to_string(),
                    default: false,
                },
            ],
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error response body: `{"error": "<message>"}`.
pub struct ApiFailure(StatusCode, String);

impl ApiFailure {
    fn not_found(what: &str) -> Self {
        Self(StatusCode::NOT_FOUND, format!("{what} not found"))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiFailure>;

/// Batched calls are replayed through `api`, which checks the key itself.
#[derive(Clone)]
struct BatchState {
    api: Router,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let api = api_routes(db).layer(middleware::from_fn(require_api_key));
    let batch_routes = Router::new()
        .route(&format!("{API_PREFIX}/batch"), post(batch))
        .layer(middleware::from_fn(require_api_key))
        .with_state(BatchState { api: api.clone() });
    api.merge(batch_routes)
}

fn api_routes(db: Db) -> Router {
    Router::new()
        .route(
            &format!("{API_PREFIX}/templates"),
            get(list_templates).post(create_template),
        )
        .route(
            &format!("{API_PREFIX}/templates/{{id}}"),
            get(get_template).delete(delete_template),
        )
        .route(
            &format!("{API_PREFIX}/templates/{{id}}/versions/{{version_id}}"),
            get(get_template_version),
        )
        .route(
            &format!("{API_PREFIX}/snippets"),
            get(list_snippets).post(create_snippet),
        )
        .route(
            &format!("{API_PREFIX}/snippets/{{id}}"),
            get(get_snippet).put(update_snippet).delete(delete_snippet),
        )
        .route(&format!("{API_PREFIX}/customers"), post(upsert_customer))
        .route(
            &format!("{API_PREFIX}/customers/{{email}}"),
            get(get_customer).delete(delete_customer),
        )
        .route(&format!("{API_PREFIX}/send"), post(send_email))
        .route(&format!("{API_PREFIX}/logs/{{id}}"), get(get_log))
        .route(&format!("{API_PREFIX}/esp_accounts"), get(list_esp_accounts))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    if request.headers().get(API_KEY_HEADER).is_none() {
        return ApiFailure(StatusCode::UNAUTHORIZED, "missing API key".to_string()).into_response();
    }
    next.run(request).await
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn ok() -> Json<Value> {
    Json(json!({ "success": true, "status": "OK" }))
}

// --- templates ---

async fn list_templates(State(db): State<Db>) -> Json<Vec<Template>> {
    Json(db.read().await.templates.values().cloned().collect())
}

async fn create_template(State(db): State<Db>, Json(input): Json<NewTemplate>) -> Json<Template> {
    let template = Template {
        id: new_id("tem"),
        name: input.name.clone(),
        versions: vec![TemplateVersion {
            id: new_id("ver"),
            name: input.name,
            subject: input.subject,
            html: input.html,
            text: input.text,
        }],
    };
    db.write()
        .await
        .templates
        .insert(template.id.clone(), template.clone());
    Json(template)
}

async fn get_template(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Template> {
    let store = db.read().await;
    store
        .templates
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("template"))
}

async fn get_template_version(
    State(db): State<Db>,
    Path((id, version_id)): Path<(String, String)>,
) -> ApiResult<TemplateVersion> {
    let store = db.read().await;
    let template = store
        .templates
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("template"))?;
    template
        .versions
        .iter()
        .find(|v| v.id == version_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("version"))
}

async fn delete_template(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Value> {
    db.write()
        .await
        .templates
        .remove(&id)
        .map(|_| ok())
        .ok_or_else(|| ApiFailure::not_found("template"))
}

// --- snippets ---

async fn list_snippets(State(db): State<Db>) -> Json<Vec<Snippet>> {
    Json(db.read().await.snippets.values().cloned().collect())
}

async fn create_snippet(State(db): State<Db>, Json(input): Json<SnippetContent>) -> Json<Value> {
    let snippet = Snippet {
        id: new_id("snp"),
        name: input.name,
        body: input.body,
    };
    db.write()
        .await
        .snippets
        .insert(snippet.id.clone(), snippet.clone());
    Json(json!({ "success": true, "status": "OK", "snippet": snippet }))
}

async fn get_snippet(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Snippet> {
    let store = db.read().await;
    store
        .snippets
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("snippet"))
}

async fn update_snippet(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<SnippetContent>,
) -> ApiResult<Value> {
    let mut store = db.write().await;
    let snippet = store
        .snippets
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("snippet"))?;
    snippet.name = input.name;
    snippet.body = input.body;
    Ok(Json(json!({ "success": true, "status": "OK", "snippet": snippet })))
}

async fn delete_snippet(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Value> {
    db.write()
        .await
        .snippets
        .remove(&id)
        .map(|_| ok())
        .ok_or_else(|| ApiFailure::not_found("snippet"))
}

// --- customers ---

async fn upsert_customer(State(db): State<Db>, Json(customer): Json<Customer>) -> Json<Value> {
    db.write()
        .await
        .customers
        .insert(customer.email.clone(), customer);
    ok()
}

async fn get_customer(State(db): State<Db>, Path(email): Path<String>) -> ApiResult<Value> {
    let store = db.read().await;
    let customer = store
        .customers
        .get(&email)
        .ok_or_else(|| ApiFailure::not_found("customer"))?;
    Ok(Json(json!({ "success": true, "status": "OK", "customer": customer })))
}

async fn delete_customer(State(db): State<Db>, Path(email): Path<String>) -> ApiResult<Value> {
    db.write()
        .await
        .customers
        .remove(&email)
        .map(|_| ok())
        .ok_or_else(|| ApiFailure::not_found("customer"))
}

// --- send / logs ---

async fn send_email(State(db): State<Db>, Json(input): Json<SendRequest>) -> ApiResult<Value> {
    let mut store = db.write().await;
    let template = store.templates.get(&input.email_id).cloned().ok_or_else(|| {
        ApiFailure(
            StatusCode::BAD_REQUEST,
            format!("unknown email_id {}", input.email_id),
        )
    })?;

    let log = Log {
        id: new_id("log"),
        email_id: template.id.clone(),
        email_name: template.name.clone(),
        recipient_address: input.recipient.address,
        recipient_name: input.recipient.name,
        status: "sent".to_string(),
    };
    store.logs.insert(log.id.clone(), log.clone());

    let version_name = template.versions.first().map(|v| v.name.clone());
    Ok(Json(json!({
        "success": true,
        "status": "OK",
        "receipt_id": log.id,
        "email": { "name": template.name, "version_name": version_name },
    })))
}

async fn get_log(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Log> {
    let store = db.read().await;
    store
        .logs
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("log"))
}

// --- esp accounts ---

async fn list_esp_accounts(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let accounts: Vec<&EspAccount> = store
        .esp_accounts
        .iter()
        .filter(|a| params.get("esp_type").map_or(true, |t| *t == a.esp_type))
        .collect();
    Json(json!({ "success": true, "status": "OK", "esp_accounts": accounts }))
}

// --- batch ---

async fn batch(
    State(state): State<BatchState>,
    headers: HeaderMap,
    Json(calls): Json<Vec<BatchCall>>,
) -> Json<Vec<BatchResult>> {
    let api_key = headers.get(API_KEY_HEADER);
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        results.push(replay(&state.api, call, api_key).await);
    }
    Json(results)
}

/// Run one batched call through the API router, carrying the caller's API
/// key, and capture its answer.
async fn replay(api: &Router, call: BatchCall, api_key: Option<&HeaderValue>) -> BatchResult {
    let body = call
        .body
        .as_ref()
        .map(|b| Body::from(b.to_string()))
        .unwrap_or_else(Body::empty);
    let mut request = axum::http::Request::builder()
        .method(call.method.as_str())
        .uri(call.path.as_str())
        .header(CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        request = request.header(API_KEY_HEADER, key.clone());
    }
    let request = request.body(body);

    let (status_code, body) = match request {
        Ok(request) => {
            let response = match api.clone().oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            let status = response.status().as_u16();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap_or_default();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }
        Err(e) => (400, json!({ "error": e.to_string() })),
    };

    BatchResult {
        path: call.path,
        status_code,
        method: call.method,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_call_body_is_optional() {
        let call: BatchCall =
            serde_json::from_str(r#"{"path":"/api/v1/templates","method":"GET"}"#).unwrap();
        assert!(call.body.is_none());
        assert_eq!(call.method, "GET");
    }

    #[test]
    fn batch_result_wire_format() {
        let result = BatchResult {
            path: "/api/v1/templates".to_string(),
            status_code: 200,
            method: "GET".to_string(),
            body: json!([]),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"path": "/api/v1/templates", "status_code": 200, "method": "GET", "body": []})
        );
    }

    #[test]
    fn send_request_requires_recipient() {
        let result: Result<SendRequest, _> = serde_json::from_str(r#"{"email_id":"tem_1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn seeded_store_has_esp_accounts() {
        let store = Store::seeded();
        assert_eq!(store.esp_accounts.len(), 2);
        assert!(store.templates.is_empty());
    }

    fn list_call() -> BatchCall {
        BatchCall {
            path: format!("{API_PREFIX}/templates"),
            method: "GET".to_string(),
            body: None,
        }
    }

    #[tokio::test]
    async fn replay_forwards_the_api_key() {
        let api = api_routes(Arc::new(RwLock::new(Store::seeded())))
            .layer(middleware::from_fn(require_api_key));
        let key = HeaderValue::from_static("test_key");

        let result = replay(&api, list_call(), Some(&key)).await;
        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, json!([]));

        let result = replay(&api, list_call(), None).await;
        assert_eq!(result.status_code, 401);
        assert_eq!(result.body, json!({"error": "missing API key"}));
    }

    #[test]
    fn ids_carry_prefix() {
        let id = new_id("tem");
        assert!(id.starts_with("tem_"));
        assert_eq!(id.len(), "tem_".len() + 32);
    }
}
