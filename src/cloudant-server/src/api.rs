use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use base64::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use cloudant_core::design::design_id;
use cloudant_core::{ClusterInfo, CloudantError, CreateIndexRequest, DocumentResponse, Query};

use crate::config::ServerConfig;
use crate::store::{Store, WriteResult};

/// Shared application state
pub struct AppState {
    pub store: Mutex<Store>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Mutex::new(Store::new()),
            config,
        }
    }
}

/// Service error rendered as `{"error": ..., "reason": ...}` with its status
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] CloudantError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Debug, Deserialize)]
pub struct WriteParams {
    pub rev: Option<String>,
    pub batch: Option<String>,
}

impl WriteParams {
    fn is_batch(&self) -> bool {
        self.batch.as_deref() == Some("ok")
    }
}

/// Check Basic credentials when the server is configured with some
fn authorize(req: &HttpRequest, config: &ServerConfig) -> Result<(), ApiError> {
    let Some((username, password)) = config.credentials() else {
        return Ok(());
    };

    let supplied = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    match supplied.as_deref().and_then(|s| s.split_once(':')) {
        Some((u, p)) if u == username && p == password => Ok(()),
        _ => {
            tracing::warn!("Rejected credentials");
            Err(CloudantError::new(
                401,
                "401 Unauthorized",
                "unauthorized",
                "Name or password is incorrect.",
            )
            .into())
        }
    }
}

/// Decode a JSON request body, insisting on a JSON content type
fn json_body<T: DeserializeOwned>(req: &HttpRequest, body: &[u8]) -> Result<T, ApiError> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !is_json {
        return Err(CloudantError::new(
            415,
            "415 Unsupported Media Type",
            "bad_content_type",
            "Content-Type must be application/json",
        )
        .into());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        CloudantError::new(400, "400 Bad Request", "bad_request", "invalid UTF-8 JSON").into()
    })
}

fn document_body(req: &HttpRequest, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match json_body::<Value>(req, body)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(CloudantError::new(
            400,
            "400 Bad Request",
            "bad_request",
            "Document must be a JSON object",
        )
        .into()),
    }
}

/// `{ok, id, rev}`; batch writes are acknowledged without a revision
fn write_response(written: WriteResult, batch: bool) -> HttpResponse {
    let (mut builder, rev) = if batch {
        (HttpResponse::Accepted(), String::new())
    } else {
        (HttpResponse::Created(), written.rev)
    };

    builder.json(DocumentResponse {
        id: written.id,
        rev,
        ok: true,
        result: String::new(),
    })
}

/// GET /
#[tracing::instrument(skip(req, state))]
pub async fn cluster_info(req: HttpRequest, state: web::Data<AppState>) -> ApiResult {
    authorize(&req, &state.config)?;

    Ok(HttpResponse::Ok().json(ClusterInfo {
        couchdb: "Welcome".to_string(),
        version: "2.1.1".to_string(),
        cloudant_build: Some("emulator".to_string()),
        vendor: Some(json!({"name": "cloudant-server", "version": env!("CARGO_PKG_VERSION")})),
    }))
}

/// GET /_all_dbs
#[tracing::instrument(skip(req, state))]
pub async fn list_databases(req: HttpRequest, state: web::Data<AppState>) -> ApiResult {
    authorize(&req, &state.config)?;

    let store = state.store.lock().await;
    Ok(HttpResponse::Ok().json(store.list_databases()))
}

/// PUT /{db}
#[tracing::instrument(skip(req, state))]
pub async fn create_database(
    path: web::Path<String>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;

    let mut store = state.store.lock().await;
    store.create_database(&path)?;
    Ok(HttpResponse::Created().json(json!({"ok": true})))
}

/// DELETE /{db}
#[tracing::instrument(skip(req, state))]
pub async fn delete_database(
    path: web::Path<String>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;

    let mut store = state.store.lock().await;
    store.delete_database(&path)?;
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}

/// POST /{db}[?batch=ok]
#[tracing::instrument(skip(body, req, state))]
pub async fn create_document(
    path: web::Path<String>,
    params: web::Query<WriteParams>,
    body: web::Bytes,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;
    let doc = document_body(&req, &body)?;

    let mut store = state.store.lock().await;
    let written = store.create_document(&path, doc)?;
    Ok(write_response(written, params.is_batch()))
}

async fn read_document(db: &str, id: &str, req: &HttpRequest, state: &AppState) -> ApiResult {
    authorize(req, &state.config)?;

    let store = state.store.lock().await;
    Ok(HttpResponse::Ok().json(store.get_document(db, id)?))
}

async fn write_document(
    db: &str,
    id: &str,
    params: &WriteParams,
    body: &[u8],
    req: &HttpRequest,
    state: &AppState,
) -> ApiResult {
    authorize(req, &state.config)?;
    let doc = document_body(req, body)?;

    let mut store = state.store.lock().await;
    let written = store.put_document(db, id, params.rev.as_deref(), doc)?;
    Ok(write_response(written, params.is_batch()))
}

async fn remove_document(
    db: &str,
    id: &str,
    params: &WriteParams,
    req: &HttpRequest,
    state: &AppState,
) -> ApiResult {
    authorize(req, &state.config)?;

    let mut store = state.store.lock().await;
    let deleted = store.delete_document(db, id, params.rev.as_deref())?;
    Ok(HttpResponse::Ok().json(DocumentResponse {
        id: deleted.id,
        rev: deleted.rev,
        ok: true,
        result: String::new(),
    }))
}

/// GET /{db}/{doc_id}
#[tracing::instrument(skip(req, state))]
pub async fn get_document(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, id) = path.into_inner();
    read_document(&db, &id, &req, &state).await
}

/// PUT /{db}/{doc_id}?rev=...[&batch=ok]
#[tracing::instrument(skip(body, req, state))]
pub async fn put_document(
    path: web::Path<(String, String)>,
    params: web::Query<WriteParams>,
    body: web::Bytes,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, id) = path.into_inner();
    write_document(&db, &id, &params, &body, &req, &state).await
}

/// DELETE /{db}/{doc_id}?rev=...
#[tracing::instrument(skip(req, state))]
pub async fn delete_document(
    path: web::Path<(String, String)>,
    params: web::Query<WriteParams>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, id) = path.into_inner();
    remove_document(&db, &id, &params, &req, &state).await
}

/// GET /{db}/_design/{ddoc}
#[tracing::instrument(skip(req, state))]
pub async fn get_design_document(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, ddoc) = path.into_inner();
    read_document(&db, &design_id(&ddoc), &req, &state).await
}

/// PUT /{db}/_design/{ddoc}
#[tracing::instrument(skip(body, req, state))]
pub async fn put_design_document(
    path: web::Path<(String, String)>,
    params: web::Query<WriteParams>,
    body: web::Bytes,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, ddoc) = path.into_inner();
    write_document(&db, &design_id(&ddoc), &params, &body, &req, &state).await
}

/// DELETE /{db}/_design/{ddoc}?rev=...
#[tracing::instrument(skip(req, state))]
pub async fn delete_design_document(
    path: web::Path<(String, String)>,
    params: web::Query<WriteParams>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    let (db, ddoc) = path.into_inner();
    remove_document(&db, &design_id(&ddoc), &params, &req, &state).await
}

/// GET /{db}/_index
#[tracing::instrument(skip(req, state))]
pub async fn list_indexes(
    path: web::Path<String>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;

    let store = state.store.lock().await;
    let indexes = store.list_indexes(&path)?;
    Ok(HttpResponse::Ok().json(json!({
        "total_rows": indexes.len(),
        "indexes": indexes,
    })))
}

/// POST /{db}/_index
#[tracing::instrument(skip(body, req, state))]
pub async fn create_index(
    path: web::Path<String>,
    body: web::Bytes,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;
    let request: CreateIndexRequest = json_body(&req, &body)?;

    let mut store = state.store.lock().await;
    let created = store.create_index(&path, &request)?;
    Ok(HttpResponse::Ok().json(json!({
        "result": created.result,
        "id": created.id,
        "name": created.name,
    })))
}

/// Split `{ddoc}/{type}/{name}`, where `ddoc` may carry the `_design/` prefix
fn parse_index_path(tail: &str) -> Option<(String, &str, &str)> {
    let parts: Vec<&str> = tail.split('/').collect();
    match parts.as_slice() {
        ["_design", ddoc, kind, name] => Some((format!("_design/{}", ddoc), *kind, *name)),
        [ddoc, kind, name] => Some((ddoc.to_string(), *kind, *name)),
        _ => None,
    }
}

/// DELETE /{db}/_index/{ddoc}/{type}/{name}
#[tracing::instrument(skip(req, state))]
pub async fn delete_index(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;
    let (db, tail) = path.into_inner();

    let (ddoc, kind, name) = parse_index_path(&tail).ok_or_else(|| {
        CloudantError::new(400, "400 Bad Request", "bad_request", "Invalid index path")
    })?;

    let mut store = state.store.lock().await;
    store.delete_index(&db, &ddoc, kind, name)?;
    Ok(HttpResponse::Ok().json(json!({"ok": true})))
}

/// POST /{db}/_find
#[tracing::instrument(skip(body, req, state))]
pub async fn find(
    path: web::Path<String>,
    body: web::Bytes,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ApiResult {
    authorize(&req, &state.config)?;
    let query: Query = json_body(&req, &body)?;

    let store = state.store.lock().await;
    let docs = store.find(&path, &query)?;
    tracing::debug!(matched = docs.len(), "Query executed");

    Ok(HttpResponse::Ok().json(json!({
        "docs": docs,
        "bookmark": "nil",
    })))
}

/// Configure routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Specific routes MUST come before the generic /{db}/{doc_id} patterns
    cfg.route("/", web::get().to(cluster_info))
        .route("/_all_dbs", web::get().to(list_databases))
        .route("/{db}/_index", web::get().to(list_indexes))
        .route("/{db}/_index", web::post().to(create_index))
        .route("/{db}/_index/{tail:.*}", web::delete().to(delete_index))
        .route("/{db}/_find", web::post().to(find))
        .route("/{db}/_design/{ddoc}", web::get().to(get_design_document))
        .route("/{db}/_design/{ddoc}", web::put().to(put_design_document))
        .route("/{db}/_design/{ddoc}", web::delete().to(delete_design_document))
        .route("/{db}/{doc_id}", web::get().to(get_document))
        .route("/{db}/{doc_id}", web::put().to(put_document))
        .route("/{db}/{doc_id}", web::delete().to(delete_document))
        .route("/{db}", web::put().to(create_database))
        .route("/{db}", web::delete().to(delete_database))
        .route("/{db}", web::post().to(create_document));
}
