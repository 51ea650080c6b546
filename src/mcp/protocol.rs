//! MCP Protocol Types (JSON-RPC 2.0)
//!
//! Wire envelopes for the JSON-RPC transport. A request carries a
//! correlation `id`; a notification does not and expects no correlated
//! response body. Request IDs are `<millis>-<rand>` strings, unique within a
//! session (which is all correlation needs here).
//!
//! - JSON-RPC 2.0: <https://www.jsonrpc.org/specification>

use crate::mcp::error::McpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Generate a request ID unique within this session
pub fn next_request_id() -> String {
    format!(
        "{}-{:04x}",
        chrono::Utc::now().timestamp_millis(),
        fastrand::u16(..)
    )
}

/// A JSON-RPC 2.0 request message
///
/// # Example
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "id": "1714670000000-3af1",
///   "method": "getContext",
///   "params": {}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (used to match responses)
    pub id: String,

    /// Method name to invoke
    pub method: String,

    /// Method parameters
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a new request with a fresh correlation ID
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: next_request_id(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 notification message
///
/// Notifications carry no `id`; the caller does not await a correlated
/// response body, though the transport call itself may still fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcNotification {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Method name
    pub method: String,

    /// Method parameters
    pub params: Value,
}

impl JsonRpcNotification {
    /// Create a new notification
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response message
///
/// A response contains either a `result` or an `error`, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (matches the request; absent on some faults)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Result payload (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(id: Value, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: None,
            error: Some(error),
        }
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }

    /// Unwrap into a result, passing a server-supplied error through as-is
    pub fn into_result(self) -> Result<Value, McpError> {
        match (self.result, self.error) {
            (Some(result), None) => Ok(result),
            (_, Some(error)) => Err(error),
            (None, None) => Err(McpError::internal_error(
                "Invalid response: neither result nor error present",
            )),
        }
    }
}
