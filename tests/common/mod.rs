//! Mock backend shared by the integration tests.
//!
//! Serves the six client endpoints with `axum` on an ephemeral port. Every
//! route except sign-in requires the `sid=good` session cookie.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "sid=good";

pub struct MockBackend {
    pub files: Mutex<Value>,
    pub logout_status: Mutex<StatusCode>,
    hits: Mutex<HashMap<&'static str, usize>>,
    queries: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::new(json!([
                { "id": "f1", "name": "budget.txt", "mimeType": "text/plain", "webViewLink": "https://drive.test/f1" },
                { "id": "f2", "name": "plan.md", "mimeType": "text/markdown", "webViewLink": "https://drive.test/f2" },
                { "id": "f3", "name": "notes.txt", "mimeType": "text/plain", "webViewLink": "https://drive.test/f3" }
            ])),
            logout_status: Mutex::new(StatusCode::OK),
            hits: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn set_files(&self, files: Value) {
        *self.files.lock().unwrap() = files;
    }

    pub fn set_logout_status(&self, status: StatusCode) {
        *self.logout_status.lock().unwrap() = status;
    }

    pub fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, route: &'static str) {
        *self.hits.lock().unwrap().entry(route).or_insert(0) += 1;
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == SESSION_COOKIE))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not authenticated" }))).into_response()
}

async fn handle_user(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    mock.record("user");
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": "u1",
        "name": "A",
        "email": "a@x.com",
        "profilePicture": "https://p.test/a.png"
    }))
    .into_response()
}

async fn handle_logout(State(mock): State<Arc<MockBackend>>) -> Response {
    mock.record("logout");
    let status = *mock.logout_status.lock().unwrap();
    (status, Json(json!({ "ok": status.is_success() }))).into_response()
}

async fn handle_files(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    mock.record("files");
    if !authorized(&headers) {
        return unauthorized();
    }
    let files = mock.files.lock().unwrap().clone();
    Json(files).into_response()
}

async fn handle_ingest(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Response {
    mock.record("ingest");
    if !authorized(&headers) {
        return unauthorized();
    }
    let count = mock
        .files
        .lock()
        .unwrap()
        .as_array()
        .map(|a| a.len())
        .unwrap_or(0);
    Json(json!({ "count": count })).into_response()
}

async fn handle_query(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.record("query");
    if !authorized(&headers) {
        return unauthorized();
    }
    let query = params.get("query").cloned().unwrap_or_default();
    mock.queries.lock().unwrap().push(query.clone());

    match query.as_str() {
        "malformed" => (StatusCode::OK, "this is not json").into_response(),
        "explode" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Json(json!([
                { "score": 0.5, "fileId": "slow", "fileName": "slow.md", "webViewLink": "https://drive.test/slow" }
            ]))
            .into_response()
        }
        "nothing" => Json(json!([])).into_response(),
        _ => Json(json!([
            { "score": 0.91, "fileId": "f1", "fileName": "budget.txt", "webViewLink": "https://drive.test/f1" },
            { "score": 0.40, "fileId": "f2", "fileName": "plan.md", "webViewLink": "https://drive.test/f2" }
        ]))
        .into_response(),
    }
}

pub fn router(mock: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/api/auth/user", get(handle_user))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/drive/files", get(handle_files))
        .route("/api/search/ingest", post(handle_ingest))
        .route("/api/search/query", get(handle_query))
        .with_state(mock)
}

/// Serve on the current runtime. Returns the base URL.
pub async fn spawn(mock: Arc<MockBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(mock)).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serve on a dedicated thread with its own runtime, for blocking tests.
pub fn spawn_in_thread(mock: Arc<MockBackend>) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let base = spawn(mock).await;
            tx.send(base).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}
