//! MCP Client Base Contract
//!
//! Every protocol variant (JSON-RPC, REST) implements the [`McpClient`]
//! trait, which is the full capability surface callers may use: initialize,
//! context, prompts, tools, tool execution, health, and capability
//! discovery. Operations return an [`OperationResult`] envelope; a failure
//! is always a typed [`McpError`] value, never a panic.
//!
//! The shared per-connection state (identity, HTTP client, initialization
//! flag, discovered capabilities) lives in [`ClientCore`], which both
//! concrete variants embed.

use crate::mcp::error::{codes, McpError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Fixed per-request timeout applied at the transport boundary.
///
/// This is deliberately not configurable; callers that need cancellation
/// simply drop the future.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default resource URI for context requests when the caller gives none
pub const DEFAULT_CONTEXT_URI: &str = "chat://conversation";

/// Well-known capability names discovered during initialization
pub mod capability {
    pub const RESOURCES: &str = "resources";
    pub const PROMPTS: &str = "prompts";
    pub const TOOLS: &str = "tools";
}

/// How a server authenticates requests
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthType {
    #[default]
    None,
    ApiKey,
    Basic,
    Bearer,
}

/// Credential material for a server registration
///
/// Which fields matter depends on the [`AuthType`]: `api_key`/`header_name`
/// for apiKey, `username`/`password` for basic, `token` for bearer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Identity of one registered MCP server
///
/// Mirrors the server registration at client-creation time; it is not kept
/// in sync afterwards. Replacing a registration means re-registering with
/// the manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    /// Stable unique identifier (registry key)
    pub id: String,

    /// Display label
    pub name: String,

    /// Base address of the server
    pub url: String,

    /// Disabled servers stay registered but are excluded from data fan-out
    pub enabled: bool,

    #[serde(default)]
    pub auth_type: AuthType,

    #[serde(default)]
    pub auth_config: AuthConfig,
}

/// The uniform envelope every client operation resolves to
pub type OperationResult = Result<Value, McpError>;

/// One entry per server in a fan-out call
///
/// The per-client [`OperationResult`] decorated with the originating
/// server's identity, so callers can attribute results without holding the
/// client instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    pub id: String,

    /// Display name of the originating server
    pub source: String,

    pub url: String,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl AggregatedResult {
    /// Decorate a per-client result with the server's identity
    pub fn from_result(descriptor: &ServerDescriptor, result: OperationResult) -> Self {
        let (success, data, error) = match result {
            Ok(data) => (true, Some(data), None),
            Err(err) => (false, None, Some(err)),
        };
        Self {
            id: descriptor.id.clone(),
            source: descriptor.name.clone(),
            url: descriptor.url.clone(),
            success,
            data,
            error,
        }
    }
}

/// Options for a context request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextOptions {
    /// Resource URI; defaults to `chat://conversation` when unset
    pub resource_uri: Option<String>,
    pub messages: Vec<Value>,
    pub parameters: Map<String, Value>,
}

/// Options for a prompt-suggestion request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptOptions {
    pub messages: Vec<Value>,
    pub parameters: Map<String, Value>,
}

/// Options for a tool-listing request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolQuery {
    pub parameters: Map<String, Value>,
}

/// Options for a tool invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolCall {
    pub tool_id: String,
    pub parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// The capability surface every server connection implements
///
/// Default method bodies signal "not implemented"; each concrete variant
/// overrides all of them. Every operation except `initialize`,
/// `check_health`, and `get_capabilities` must go through
/// [`McpClient::ensure_initialized`] first.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// Identity of the server this client talks to
    fn descriptor(&self) -> &ServerDescriptor;

    /// Whether the initialization handshake has completed successfully
    fn initialized(&self) -> bool;

    /// Capabilities discovered during initialization (`None` before)
    fn capabilities(&self) -> Option<Value>;

    /// Whether the server advertises the named capability as truthy
    fn has_capability(&self, name: &str) -> bool {
        match self.capabilities() {
            Some(caps) => matches!(
                caps.get(name),
                Some(v) if !matches!(v, Value::Null | Value::Bool(false))
            ),
            None => false,
        }
    }

    /// Perform the handshake/capability fetch; returns success
    ///
    /// Idempotent: once initialization has succeeded, further calls return
    /// `true` without touching the network.
    async fn initialize(&self) -> bool {
        false
    }

    /// Lazily initialize, failing fast when the handshake cannot complete
    async fn ensure_initialized(&self) -> Result<(), McpError> {
        if self.initialized() || self.initialize().await {
            Ok(())
        } else {
            Err(McpError::not_initialized(format!(
                "server '{}' is not initialized",
                self.descriptor().name
            )))
        }
    }

    async fn get_context(&self, _options: ContextOptions) -> OperationResult {
        Err(McpError::method_not_found("getContext not implemented"))
    }

    async fn get_prompts(&self, _options: PromptOptions) -> OperationResult {
        Err(McpError::method_not_found("getPrompts not implemented"))
    }

    async fn get_tools(&self, _options: ToolQuery) -> OperationResult {
        Err(McpError::method_not_found("getTools not implemented"))
    }

    async fn execute_tool(&self, _options: ToolCall) -> OperationResult {
        Err(McpError::method_not_found("executeTool not implemented"))
    }

    async fn check_health(&self) -> OperationResult {
        Err(McpError::method_not_found("checkHealth not implemented"))
    }

    async fn get_capabilities(&self) -> OperationResult {
        Err(McpError::method_not_found("getCapabilities not implemented"))
    }
}

/// Shared per-connection state for the concrete protocol clients
pub struct ClientCore {
    descriptor: ServerDescriptor,
    http: reqwest::Client,
    initialized: AtomicBool,
    capabilities: RwLock<Option<Value>>,
    /// Serializes concurrent handshake attempts
    pub(crate) init_lock: tokio::sync::Mutex<()>,
}

impl ClientCore {
    /// Create the shared state, building the HTTP client with the fixed
    /// request timeout
    pub fn new(descriptor: ServerDescriptor) -> Result<Self, McpError> {
        if descriptor.url.trim().is_empty() {
            return Err(McpError::invalid_request(format!(
                "server '{}' has no URL configured",
                descriptor.id
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| McpError::internal_error(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            descriptor,
            http,
            initialized: AtomicBool::new(false),
            capabilities: RwLock::new(None),
            init_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn descriptor(&self) -> &ServerDescriptor {
        &self.descriptor
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn capabilities(&self) -> Option<Value> {
        self.capabilities
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_capabilities(&self, caps: Value) {
        *self
            .capabilities
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(caps);
    }

    /// Build the request headers for this server's auth configuration
    pub fn auth_headers(&self) -> Result<HeaderMap, McpError> {
        build_auth_headers(self.descriptor.auth_type, &self.descriptor.auth_config)
    }

    /// The `handleRequest` boundary: log a failed operation with the server
    /// identity and pass the typed result through unchanged
    pub fn finish(&self, operation: &str, result: OperationResult) -> OperationResult {
        if let Err(ref err) = result {
            tracing::warn!(
                server = %self.descriptor.name,
                operation,
                error = %err,
                "MCP operation failed"
            );
        }
        result
    }
}

/// Construct request headers for the given auth settings
///
/// | authType | headers added |
/// |----------|---------------|
/// | none     | content headers only |
/// | apiKey   | `headerName` (default `Authorization`) = key |
/// | basic    | `Authorization: Basic base64(user:pass)` |
/// | bearer   | `Authorization: Bearer token` |
pub fn build_auth_headers(
    auth_type: AuthType,
    auth: &AuthConfig,
) -> Result<HeaderMap, McpError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    match auth_type {
        AuthType::None => {}
        AuthType::ApiKey => {
            let key = auth
                .api_key
                .as_deref()
                .ok_or_else(|| McpError::invalid_request("apiKey auth requires an apiKey"))?;
            let header = auth.header_name.as_deref().unwrap_or("Authorization");
            let name = HeaderName::try_from(header).map_err(|e| {
                McpError::invalid_request(format!("invalid auth header name '{}': {}", header, e))
            })?;
            let value = HeaderValue::try_from(key)
                .map_err(|e| McpError::invalid_request(format!("invalid apiKey value: {}", e)))?;
            headers.insert(name, value);
        }
        AuthType::Basic => {
            let (user, pass) = match (auth.username.as_deref(), auth.password.as_deref()) {
                (Some(u), Some(p)) => (u, p),
                _ => {
                    return Err(McpError::invalid_request(
                        "basic auth requires username and password",
                    ))
                }
            };
            let encoded = BASE64.encode(format!("{}:{}", user, pass));
            let value = HeaderValue::try_from(format!("Basic {}", encoded))
                .map_err(|e| McpError::invalid_request(format!("invalid basic credentials: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        AuthType::Bearer => {
            let token = auth
                .token
                .as_deref()
                .ok_or_else(|| McpError::invalid_request("bearer auth requires a token"))?;
            let value = HeaderValue::try_from(format!("Bearer {}", token))
                .map_err(|e| McpError::invalid_request(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
    }

    Ok(headers)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: McpError,
}

/// Extract a typed error from a non-success HTTP response
///
/// An embedded JSON-RPC-style error object in the body passes through with
/// its original code; otherwise the HTTP status is mapped.
pub(crate) async fn error_from_response(
    response: reqwest::Response,
    operation: &str,
) -> McpError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => McpError::from_status(status, operation),
    }
}

/// Decode a JSON body, converting every failure path into a typed error
pub(crate) async fn decode_response(
    response: reqwest::Response,
    operation: &str,
) -> Result<Value, McpError> {
    if !response.status().is_success() {
        return Err(error_from_response(response, operation).await);
    }
    response
        .json()
        .await
        .map_err(|e| McpError::from_transport(operation, &e))
}

/// Resolve `segments` under a server's base URL, percent-encoding each
/// path segment
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, McpError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| McpError::invalid_request(format!("invalid server URL '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| McpError::invalid_request(format!("server URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
