//! In-memory stand-in for the provisioning API, used by integration tests.
//!
//! Routes live under `/v1` and require `Authorization: Bearer <token>`;
//! `/region` answers without authentication. Failures use the API's error
//! envelope `{"error": {"message", "code", "param", "type"}}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Token accepted by [`app`].
pub const API_TOKEN: &str = "mock-api-token";

pub const PRIMARY_REGION: &str = "ams";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Database {
    #[serde(rename = "DbId")]
    pub id: String,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "Name")]
    pub name: String,
    pub group: String,
    #[serde(rename = "primaryRegion")]
    pub primary_region: String,
    pub regions: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub archived: bool,
    pub locations: Vec<String>,
    pub name: String,
    pub primary: String,
    pub uuid: String,
}

#[derive(Deserialize)]
pub struct CreateDatabase {
    pub name: String,
    pub group: String,
}

#[derive(Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub expiration: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    databases: Arc<RwLock<HashMap<String, Database>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
}

impl AppState {
    /// Empty state with a single `default` group.
    pub fn new(token: &str) -> Self {
        let default = new_group("default", PRIMARY_REGION);
        Self {
            token: token.into(),
            databases: Arc::default(),
            groups: Arc::new(RwLock::new(HashMap::from([(default.name.clone(), default)]))),
        }
    }
}

pub fn app() -> Router {
    app_with_state(AppState::new(API_TOKEN))
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/organizations/{org}/databases", get(list_databases).post(create_database))
        .route("/organizations/{org}/databases/dumps", post(upload_dump))
        .route(
            "/organizations/{org}/databases/{name}",
            get(get_database).delete(delete_database),
        )
        .route("/organizations/{org}/databases/{name}/auth/tokens", post(create_database_token))
        .route("/organizations/{org}/databases/{name}/auth/rotate", post(rotate_database_tokens))
        .route("/organizations/{org}/databases/{name}/instances", get(list_instances))
        .route("/organizations/{org}/databases/{name}/instances/{instance}", get(get_instance))
        .route("/organizations/{org}/databases/{name}/usage", get(database_usage))
        .route("/organizations/{org}/groups", get(list_groups).post(create_group))
        .route("/organizations/{org}/groups/{group}", get(get_group))
        .route("/organizations/{org}/groups/{group}/auth/rotate", post(rotate_group_tokens))
        .route("/organizations/{org}/audit-logs", get(audit_logs))
        .route("/auth/validate", get(validate_token))
        .route("/locations", get(list_locations))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .nest("/v1", api)
        .route("/region", get(closest_region))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn api_error(status: StatusCode, error: serde_json::Value) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn not_found(what: &str) -> Response {
    api_error(
        StatusCode::NOT_FOUND,
        json!({ "message": format!("{what} not found"), "code": 404 }),
    )
}

fn new_group(name: &str, location: &str) -> Group {
    Group {
        archived: false,
        locations: vec![location.to_string()],
        name: name.to_string(),
        primary: location.to_string(),
        uuid: Uuid::new_v4().to_string(),
    }
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return api_error(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "token is invalid or missing", "code": 401 }),
        );
    }
    next.run(request).await
}

async fn list_databases(State(state): State<AppState>, Path(_org): Path<String>) -> Json<serde_json::Value> {
    let databases = state.databases.read().await;
    let mut list: Vec<&Database> = databases.values().collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    Json(json!({ "databases": list }))
}

async fn create_database(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(input): Json<CreateDatabase>,
) -> Response {
    if !state.groups.read().await.contains_key(&input.group) {
        return not_found("group");
    }
    let mut databases = state.databases.write().await;
    if databases.contains_key(&input.name) {
        return api_error(
            StatusCode::CONFLICT,
            json!({
                "message": ["database already exists", input.name],
                "code": "conflict",
                "param": "name",
                "type": "invalid_request_error",
            }),
        );
    }
    let database = Database {
        id: Uuid::new_v4().to_string(),
        hostname: format!("{}-{org}.mock.local", input.name),
        name: input.name.clone(),
        group: input.group,
        primary_region: PRIMARY_REGION.to_string(),
        regions: vec![PRIMARY_REGION.to_string()],
        kind: "logical".to_string(),
        version: "0.24.0".to_string(),
    };
    databases.insert(input.name, database.clone());
    Json(json!({ "database": database })).into_response()
}

async fn get_database(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    match state.databases.read().await.get(&name) {
        Some(database) => Json(json!({ "database": database })).into_response(),
        None => not_found("database"),
    }
}

async fn delete_database(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    match state.databases.write().await.remove(&name) {
        Some(_) => Json(json!({ "database": name })).into_response(),
        None => not_found("database"),
    }
}

async fn create_database_token(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> Response {
    if !state.databases.read().await.contains_key(&name) {
        return not_found("database");
    }
    let authorization = query.authorization.unwrap_or_else(|| "full-access".to_string());
    if authorization != "full-access" && authorization != "read-only" {
        return api_error(
            StatusCode::BAD_REQUEST,
            json!({ "message": "invalid authorization", "code": 400, "param": "authorization" }),
        );
    }
    let expiration = query.expiration.unwrap_or_else(|| "never".to_string());
    Json(json!({ "jwt": format!("{name}.{authorization}.{expiration}") })).into_response()
}

async fn rotate_database_tokens(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    if state.databases.read().await.contains_key(&name) {
        StatusCode::OK.into_response()
    } else {
        not_found("database")
    }
}

/// Every database has a single primary instance in its primary region.
fn primary_instance(database: &Database) -> serde_json::Value {
    json!({
        "uuid": database.id,
        "name": database.primary_region,
        "hostname": format!("{}-{}", database.primary_region, database.hostname),
        "region": database.primary_region,
        "type": "primary",
    })
}

async fn list_instances(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    match state.databases.read().await.get(&name) {
        Some(database) => Json(json!({ "instances": [primary_instance(database)] })).into_response(),
        None => not_found("database"),
    }
}

async fn get_instance(
    State(state): State<AppState>,
    Path((_org, name, instance)): Path<(String, String, String)>,
) -> Response {
    match state.databases.read().await.get(&name) {
        Some(database) if database.primary_region == instance => {
            Json(json!({ "instance": primary_instance(database) })).into_response()
        }
        Some(_) => not_found("instance"),
        None => not_found("database"),
    }
}

#[derive(Deserialize)]
pub struct UsageQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Counters are fixed; only the shape of the period is checked.
async fn database_usage(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
    Query(query): Query<UsageQuery>,
) -> Response {
    let Some(database) = state.databases.read().await.get(&name).cloned() else {
        return not_found("database");
    };
    if query.from.is_some() != query.to.is_some() {
        return api_error(
            StatusCode::BAD_REQUEST,
            json!({ "message": "from and to must be set together", "code": 400 }),
        );
    }
    let usage = json!({ "rows_read": 0, "rows_writen": 0, "storage_bytes": 4096 });
    let mut instance = primary_instance(&database);
    instance["usage"] = usage.clone();
    Json(json!({
        "database": { "uuid": database.id, "instances": [instance], "total": usage }
    }))
    .into_response()
}

async fn upload_dump(Path(_org): Path<String>, body: Bytes) -> Response {
    if body.is_empty() {
        return api_error(
            StatusCode::BAD_REQUEST,
            json!({ "message": "dump is empty", "code": 400 }),
        );
    }
    Json(json!({ "dump_url": format!("file:///dumps/{}.sql", body.len()) })).into_response()
}

async fn list_groups(State(state): State<AppState>, Path(_org): Path<String>) -> Json<serde_json::Value> {
    let groups = state.groups.read().await;
    let mut list: Vec<&Group> = groups.values().collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    Json(json!({ "groups": list }))
}

async fn create_group(
    State(state): State<AppState>,
    Path(_org): Path<String>,
    Json(input): Json<CreateGroup>,
) -> Response {
    let mut groups = state.groups.write().await;
    if groups.contains_key(&input.name) {
        return api_error(
            StatusCode::CONFLICT,
            json!({ "message": "group already exists", "code": "conflict", "param": "name" }),
        );
    }
    let group = new_group(&input.name, &input.location);
    groups.insert(input.name, group.clone());
    Json(json!({ "group": group })).into_response()
}

async fn get_group(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    match state.groups.read().await.get(&name) {
        Some(group) => Json(json!({ "group": group })).into_response(),
        None => not_found("group"),
    }
}

async fn rotate_group_tokens(
    State(state): State<AppState>,
    Path((_org, name)): Path<(String, String)>,
) -> Response {
    if state.groups.read().await.contains_key(&name) {
        StatusCode::OK.into_response()
    } else {
        not_found("group")
    }
}

/// Always fails with a body that is not an error envelope.
async fn audit_logs(Path(_org): Path<String>) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "audit logs are temporarily unavailable").into_response()
}

async fn validate_token() -> Json<serde_json::Value> {
    Json(json!({ "exp": -1 }))
}

async fn list_locations() -> Json<serde_json::Value> {
    Json(json!({
        "locations": {
            "ams": "Amsterdam, Netherlands",
            "fra": "Frankfurt, Germany",
            "iad": "Ashburn, Virginia (US)",
        }
    }))
}

async fn closest_region() -> Json<serde_json::Value> {
    Json(json!({ "server": PRIMARY_REGION, "client": PRIMARY_REGION }))
}
