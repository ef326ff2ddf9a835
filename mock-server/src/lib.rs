//! In-memory imitation of the Swiftype REST API used by integration tests.
//!
//! Every route lives under `/api/v1/` with a `.json` suffix. Requests must
//! authenticate with the test API key, the test access token or the test
//! user; anything else gets a 401.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const API_KEY: &str = "a-test-api-key";
pub const ACCESS_TOKEN: &str = "6cf7fbd297f00a8e3863a0595f55ff7d141cbef2fcbe00159d0f7403649b384e";
pub const USERNAME: &str = "some_user";
pub const PASSWORD: &str = "some_password";
/// Base64 of `some_user:some_password`.
pub const BASIC_CREDENTIALS: &str = "c29tZV91c2VyOnNvbWVfcGFzc3dvcmQ=";

const DEFAULT_PER_PAGE: usize = 20;

#[derive(Debug, Default)]
pub struct Engine {
    pub name: String,
    pub document_types: BTreeMap<String, BTreeMap<String, Value>>,
    pub domains: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub engines: BTreeMap<String, Engine>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Pagination {
    fn apply<T: Clone>(&self, items: Vec<T>) -> Vec<T> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        items
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let documents = "/engines/{engine}/document_types/{document_type}/documents";
    let api = Router::new()
        .route("/engines.json", get(list_engines).post(create_engine))
        .route("/engines/{engine}", get(get_engine).delete(delete_engine))
        .route(
            "/engines/{engine}/document_types.json",
            get(list_document_types).post(create_document_type),
        )
        .route(
            "/engines/{engine}/document_types/{document_type}",
            get(get_document_type).delete(delete_document_type),
        )
        .route(
            &format!("{documents}.json"),
            get(list_documents).post(create_document),
        )
        .route(&format!("{documents}/bulk_create.json"), post(bulk_create_documents))
        .route(&format!("{documents}/bulk_destroy.json"), post(bulk_destroy_documents))
        .route(
            &format!("{documents}/{{document}}"),
            get(get_document).delete(delete_document),
        )
        .route("/engines/{engine}/search.json", get(search))
        .route(
            "/engines/{engine}/domains.json",
            get(list_domains).post(create_domain),
        )
        .route(
            "/engines/{engine}/domains/{domain}",
            get(get_domain).delete(delete_domain),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(db);
    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

async fn require_auth(request: Request, next: Next) -> Response {
    debug!(method = %request.method(), path = request.uri().path(), "request");
    let params = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(params)| params)
        .unwrap_or_default();
    if is_authorized(request.headers(), &params) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "You need to sign in or sign up before continuing."})),
        )
            .into_response()
    }
}

pub fn is_authorized(headers: &HeaderMap, params: &HashMap<String, String>) -> bool {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return value == format!("Bearer {ACCESS_TOKEN}")
            || value == format!("Basic {BASIC_CREDENTIALS}");
    }
    params.get("auth_token").map(String::as_str) == Some(API_KEY)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strips the `.json` suffix from the last path segment.
fn resource(segment: &str) -> Result<&str, StatusCode> {
    segment.strip_suffix(".json").ok_or(StatusCode::NOT_FOUND)
}

fn unprocessable(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"error": message})),
    )
        .into_response()
}

fn engine_json(engine: &Engine) -> Value {
    let document_count: usize = engine.document_types.values().map(BTreeMap::len).sum();
    json!({
        "name": engine.name,
        "slug": engine.name,
        "document_count": document_count,
    })
}

fn document_type_json(name: &str, documents: &BTreeMap<String, Value>) -> Value {
    json!({
        "name": name,
        "slug": name,
        "document_count": documents.len(),
    })
}

fn matches_query(document: &Value, query: &str) -> bool {
    query.is_empty() || query == "*" || document.to_string().contains(query)
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

async fn list_engines(State(db): State<Db>, Query(pagination): Query<Pagination>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(pagination.apply(store.engines.values().map(engine_json).collect()))
}

async fn create_engine(State(db): State<Db>, Json(input): Json<Value>) -> Response {
    let Some(name) = input["engine"]["name"].as_str() else {
        return unprocessable("Name can't be blank");
    };
    let mut store = db.write().await;
    if store.engines.contains_key(name) {
        return unprocessable("Name has already been taken");
    }
    let engine = Engine {
        name: name.to_string(),
        ..Engine::default()
    };
    let body = engine_json(&engine);
    store.engines.insert(name.to_string(), engine);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_engine(State(db): State<Db>, Path(engine): Path<String>) -> Result<Json<Value>, StatusCode> {
    let name = resource(&engine)?;
    let store = db.read().await;
    store
        .engines
        .get(name)
        .map(|engine| Json(engine_json(engine)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_engine(State(db): State<Db>, Path(engine): Path<String>) -> Result<StatusCode, StatusCode> {
    let name = resource(&engine)?;
    let mut store = db.write().await;
    store
        .engines
        .remove(name)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

async fn list_document_types(
    State(db): State<Db>,
    Path(engine): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let store = db.read().await;
    let engine = store.engines.get(&engine).ok_or(StatusCode::NOT_FOUND)?;
    let types = engine
        .document_types
        .iter()
        .map(|(name, documents)| document_type_json(name, documents))
        .collect();
    Ok(Json(pagination.apply(types)))
}

async fn create_document_type(
    State(db): State<Db>,
    Path(engine): Path<String>,
    Json(input): Json<Value>,
) -> Result<Response, StatusCode> {
    let Some(name) = input["document_type"]["name"].as_str() else {
        return Ok(unprocessable("Name can't be blank"));
    };
    let mut store = db.write().await;
    let engine = store.engines.get_mut(&engine).ok_or(StatusCode::NOT_FOUND)?;
    if engine.document_types.contains_key(name) {
        return Ok(unprocessable("Name has already been taken"));
    }
    engine.document_types.insert(name.to_string(), BTreeMap::new());
    let body = document_type_json(name, &BTreeMap::new());
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn get_document_type(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let name = resource(&document_type)?;
    let store = db.read().await;
    let documents = store
        .engines
        .get(&engine)
        .and_then(|engine| engine.document_types.get(name))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(document_type_json(name, documents)))
}

async fn delete_document_type(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let name = resource(&document_type)?;
    let mut store = db.write().await;
    store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.document_types.remove(name))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

async fn list_documents(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let store = db.read().await;
    let documents = store
        .engines
        .get(&engine)
        .and_then(|engine| engine.document_types.get(&document_type))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(pagination.apply(documents.values().cloned().collect())))
}

async fn create_document(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Response, StatusCode> {
    let document = input["document"].clone();
    let Some(external_id) = document["external_id"].as_str().map(str::to_string) else {
        return Ok(unprocessable("External can't be blank"));
    };
    let mut store = db.write().await;
    let documents = store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.document_types.get_mut(&document_type))
        .ok_or(StatusCode::NOT_FOUND)?;
    documents.insert(external_id, document.clone());
    Ok((StatusCode::CREATED, Json(document)).into_response())
}

async fn bulk_create_documents(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Vec<bool>>, StatusCode> {
    let mut store = db.write().await;
    let documents = store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.document_types.get_mut(&document_type))
        .ok_or(StatusCode::NOT_FOUND)?;
    let results = input["documents"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|document| match document["external_id"].as_str() {
            Some(external_id) => {
                documents.insert(external_id.to_string(), document.clone());
                true
            }
            None => false,
        })
        .collect();
    Ok(Json(results))
}

async fn bulk_destroy_documents(
    State(db): State<Db>,
    Path((engine, document_type)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Vec<bool>>, StatusCode> {
    let mut store = db.write().await;
    let documents = store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.document_types.get_mut(&document_type))
        .ok_or(StatusCode::NOT_FOUND)?;
    let results = input["documents"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|id| id.as_str().is_some_and(|id| documents.remove(id).is_some()))
        .collect();
    Ok(Json(results))
}

async fn get_document(
    State(db): State<Db>,
    Path((engine, document_type, document)): Path<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let id = resource(&document)?;
    let store = db.read().await;
    store
        .engines
        .get(&engine)
        .and_then(|engine| engine.document_types.get(&document_type))
        .and_then(|documents| documents.get(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_document(
    State(db): State<Db>,
    Path((engine, document_type, document)): Path<(String, String, String)>,
) -> Result<StatusCode, StatusCode> {
    let id = resource(&document)?;
    let mut store = db.write().await;
    store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.document_types.get_mut(&document_type))
        .and_then(|documents| documents.remove(id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// The query arrives as a JSON body on a GET.
async fn search(
    State(db): State<Db>,
    Path(engine): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let input: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).map_err(|_| StatusCode::BAD_REQUEST)?
    };
    let query = input["q"].as_str().unwrap_or_default();

    let store = db.read().await;
    let engine = store.engines.get(&engine).ok_or(StatusCode::NOT_FOUND)?;
    let mut records = serde_json::Map::new();
    let mut info = serde_json::Map::new();
    for (name, documents) in &engine.document_types {
        let hits: Vec<Value> = documents
            .values()
            .filter(|document| matches_query(document, query))
            .cloned()
            .collect();
        info.insert(
            name.clone(),
            json!({"query": query, "total_result_count": hits.len()}),
        );
        records.insert(name.clone(), Value::Array(hits));
    }
    Ok(Json(json!({"records": records, "info": info})))
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

async fn list_domains(State(db): State<Db>, Path(engine): Path<String>) -> Result<Json<Vec<Value>>, StatusCode> {
    let store = db.read().await;
    let engine = store.engines.get(&engine).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(engine.domains.values().cloned().collect()))
}

async fn create_domain(
    State(db): State<Db>,
    Path(engine): Path<String>,
    Json(input): Json<Value>,
) -> Result<Response, StatusCode> {
    let Some(url) = input["domain"]["submitted_url"].as_str() else {
        return Ok(unprocessable("Submitted url can't be blank"));
    };
    let mut store = db.write().await;
    let engine = store.engines.get_mut(&engine).ok_or(StatusCode::NOT_FOUND)?;
    let id = Uuid::new_v4().simple().to_string();
    let domain = json!({"id": id, "submitted_url": url});
    engine.domains.insert(id, domain.clone());
    Ok((StatusCode::CREATED, Json(domain)).into_response())
}

async fn get_domain(
    State(db): State<Db>,
    Path((engine, domain)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let id = resource(&domain)?;
    let store = db.read().await;
    store
        .engines
        .get(&engine)
        .and_then(|engine| engine.domains.get(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_domain(
    State(db): State<Db>,
    Path((engine, domain)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let id = resource(&domain)?;
    let mut store = db.write().await;
    store
        .engines
        .get_mut(&engine)
        .and_then(|engine| engine.domains.remove(id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
