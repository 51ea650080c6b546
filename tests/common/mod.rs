//! In-process mock MCP servers for integration tests
//!
//! Each spawner binds an ephemeral port on localhost, serves requests on a
//! background task, and hands back the base URL. Servers are configurable
//! enough to exercise the handshake, the legacy fallback, capability
//! gating, auth enforcement, and HTTP error mapping.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Behavior knobs for a mock JSON-RPC server
#[derive(Clone)]
pub struct JsonRpcOptions {
    /// Capabilities the server advertises
    pub capabilities: Value,

    /// Reject the `initialize` method, as a server predating the handshake
    /// would
    pub legacy: bool,

    /// Require this exact `Authorization` header value on every request
    pub require_authorization: Option<String>,
}

impl Default for JsonRpcOptions {
    fn default() -> Self {
        Self {
            capabilities: json!({"resources": true, "prompts": true, "tools": true}),
            legacy: false,
            require_authorization: None,
        }
    }
}

/// A running mock server
pub struct MockServer {
    pub url: String,

    /// How many `initialize` requests reached the server
    pub init_calls: Arc<AtomicUsize>,
}

impl MockServer {
    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

struct JsonRpcState {
    options: JsonRpcOptions,
    init_calls: Arc<AtomicUsize>,
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock");
    });
    format!("http://{}", addr)
}

fn rpc_ok(id: &Value, result: Value) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn rpc_err(id: &Value, code: i64, message: &str) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message},
    }))
}

async fn jsonrpc_handler(
    State(state): State<Arc<JsonRpcState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if let Some(expected) = &state.options.require_authorization {
        let supplied = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if supplied != expected {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let method = body["method"].as_str().unwrap_or_default().to_string();
    let id = body["id"].clone();
    let params = body["params"].clone();

    // Notifications carry no id and get no envelope back
    if id.is_null() {
        return StatusCode::OK.into_response();
    }

    match method.as_str() {
        "initialize" => {
            state.init_calls.fetch_add(1, Ordering::SeqCst);
            if state.options.legacy {
                rpc_err(&id, -32601, "Method not found: initialize").into_response()
            } else {
                rpc_ok(&id, json!({"capabilities": state.options.capabilities})).into_response()
            }
        }
        "getCapabilities" => rpc_ok(&id, state.options.capabilities.clone()).into_response(),
        "getContext" => rpc_ok(
            &id,
            json!({
                "context": [{"type": "text", "text": "mock context"}],
                "resource": params["resource"].clone(),
            }),
        )
        .into_response(),
        "getPrompts" => {
            rpc_ok(&id, json!({"prompts": [{"id": "p1", "text": "try this"}]})).into_response()
        }
        "getTools" => rpc_ok(&id, json!({"tools": [{"id": "search"}]})).into_response(),
        "executeTool" => rpc_ok(
            &id,
            json!({"executed": params["toolId"].clone(), "parameters": params["parameters"].clone()}),
        )
        .into_response(),
        "health" => rpc_ok(&id, json!({"uptimeSecs": 42})).into_response(),
        other => rpc_err(&id, -32601, &format!("Method not found: {}", other)).into_response(),
    }
}

async fn rest_capabilities(
    State(state): State<Arc<JsonRpcState>>,
    headers: HeaderMap,
) -> axum::response::Response {
    if let Some(expected) = &state.options.require_authorization {
        let supplied = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if supplied != expected {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    Json(state.options.capabilities.clone()).into_response()
}

/// Spawn a mock JSON-RPC server; also answers `GET /capabilities` so the
/// REST discovery fallback has something to find
pub async fn spawn_jsonrpc(options: JsonRpcOptions) -> MockServer {
    let init_calls = Arc::new(AtomicUsize::new(0));
    let state = Arc::new(JsonRpcState {
        options,
        init_calls: Arc::clone(&init_calls),
    });
    let router = Router::new()
        .route("/", post(jsonrpc_handler))
        .route("/capabilities", get(rest_capabilities))
        .with_state(state);

    MockServer {
        url: serve(router).await,
        init_calls,
    }
}

async fn rest_context(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "context": [{"type": "text", "text": "rest context"}],
        "resource": body["resource"].clone(),
    }))
}

async fn rest_prompts(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({"prompts": [{"id": "p1", "text": "rest prompt"}]}))
}

async fn rest_tools() -> Json<Value> {
    Json(json!({"tools": [{"id": "search"}]}))
}

async fn rest_execute(Path(tool_id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"executed": tool_id, "parameters": body["parameters"].clone()}))
}

async fn rest_health() -> Json<Value> {
    Json(json!({"uptimeSecs": 42}))
}

/// Spawn a mock REST server exposing resource-per-operation endpoints
pub async fn spawn_rest(capabilities: Value) -> MockServer {
    let init_calls = Arc::new(AtomicUsize::new(0));
    let state = Arc::new(JsonRpcState {
        options: JsonRpcOptions {
            capabilities,
            ..Default::default()
        },
        init_calls: Arc::clone(&init_calls),
    });
    let router = Router::new()
        .route("/capabilities", get(rest_capabilities))
        .route("/context", post(rest_context))
        .route("/prompts", post(rest_prompts))
        .route("/tools", get(rest_tools))
        .route("/tools/{tool_id}/execute", post(rest_execute))
        .route("/health", get(rest_health))
        .with_state(state);

    MockServer {
        url: serve(router).await,
        init_calls,
    }
}

/// Spawn a server that answers every request with the given status and an
/// empty body
pub async fn spawn_status(status: StatusCode) -> String {
    let router = Router::new().fallback(move || async move { status });
    serve(router).await
}
