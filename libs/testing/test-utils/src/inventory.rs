//! Fake inventory service
//!
//! Serves the two inventory endpoints from memory on `127.0.0.1` with a random
//! port, records every request, and can be switched into failure modes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the list endpoint answers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Serve the stored items filtered by `status`
    #[default]
    Normal,
    /// Answer with this status code and an error body
    Status(u16),
    /// Answer 200 with a body that is not JSON
    Malformed,
}

/// A request received by the fake service
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct FakeState {
    items: Vec<Value>,
    list_mode: ListMode,
    restore_status: Option<u16>,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<FakeState>>;

/// In-process stand-in for the remote inventory service
///
/// The server task is aborted when this value is dropped.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use test_utils::FakeInventoryService;
///
/// # async fn example() {
/// let service = FakeInventoryService::start(vec![json!({
///     "_id": "1", "sku": "X123", "name": "Ring A", "price": 50, "status": false
/// })])
/// .await;
///
/// let base_url = service.base_url();
/// service.fail_restore_with(500);
/// # }
/// ```
pub struct FakeInventoryService {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeInventoryService {
    /// Start serving `items`
    pub async fn start(items: Vec<Value>) -> Self {
        let state: SharedState = Arc::new(Mutex::new(FakeState {
            items,
            ..Default::default()
        }));

        let router = Router::new()
            .route("/v1/inventory", get(list_items))
            .route("/v1/inventory/sku/{sku}/change-status", put(change_status))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake inventory service");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake inventory address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Fake inventory service stopped");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to hand to the client, e.g. `http://127.0.0.1:41234`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Current records, including restored ones
    pub fn items(&self) -> Vec<Value> {
        self.lock().items.clone()
    }

    pub fn set_list_mode(&self, mode: ListMode) {
        self.lock().list_mode = mode;
    }

    /// Answer every change-status request with `status`
    pub fn fail_restore_with(&self, status: u16) {
        self.lock().restore_status = Some(status);
    }

    /// Go back to answering change-status requests normally
    pub fn heal_restore(&self) {
        self.lock().restore_status = None;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of list requests received so far
    pub fn list_calls(&self) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == "GET")
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake inventory state poisoned")
    }
}

impl Drop for FakeInventoryService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn list_items(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("Fake inventory state poisoned");
    state.requests.push(RecordedRequest {
        method: "GET",
        path: "/v1/inventory".to_string(),
        query: query.clone(),
        body: None,
    });

    match state.list_mode {
        ListMode::Status(code) => {
            let code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (code, Json(json!({ "error": "list failed" }))).into_response()
        }
        ListMode::Malformed => (StatusCode::OK, "<html>not json</html>").into_response(),
        ListMode::Normal => {
            let wanted = query.get("status").and_then(|s| s.parse::<bool>().ok());
            let items: Vec<Value> = state
                .items
                .iter()
                .filter(|item| match wanted {
                    Some(status) => item_status(item) == status,
                    None => true,
                })
                .cloned()
                .collect();
            Json(items).into_response()
        }
    }
}

async fn change_status(
    State(state): State<SharedState>,
    Path(sku): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("Fake inventory state poisoned");
    state.requests.push(RecordedRequest {
        method: "PUT",
        path: format!("/v1/inventory/sku/{sku}/change-status"),
        query: HashMap::new(),
        body: Some(body.clone()),
    });

    if let Some(code) = state.restore_status {
        let code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, Json(json!({ "error": "restore failed" }))).into_response();
    }

    let Some(status) = body.get("status").and_then(Value::as_bool) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "status required" })))
            .into_response();
    };

    match state
        .items
        .iter_mut()
        .find(|item| item.get("sku").and_then(Value::as_str) == Some(sku.as_str()))
    {
        Some(item) => {
            item["status"] = Value::Bool(status);
            (StatusCode::OK, Json(item.clone())).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

fn item_status(item: &Value) -> bool {
    item.get("status").and_then(Value::as_bool).unwrap_or(false)
}
