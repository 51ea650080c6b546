//! MCP Error Model
//!
//! Typed errors for the MCP client layer. Every error carries a stable
//! numeric code drawn from a fixed table: the standard JSON-RPC 2.0 codes
//! plus an MCP-specific range. All transport-level failures (HTTP status,
//! network error, undecodable body) are mapped into this type before they
//! reach a caller, so no untyped error ever escapes a public client method.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error codes used by the MCP client layer.
///
/// The first five are the JSON-RPC 2.0 standard codes; the rest live in the
/// MCP-specific range (-32002..-32040).
pub mod codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The payload is not a valid request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist or the capability is not supported
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error (also the catch-all for transport failures)
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Operation attempted before a successful initialization handshake
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    /// The requested server or resource does not exist
    pub const RESOURCE_NOT_FOUND: i32 = -32003;
    /// Credentials were missing or rejected (HTTP 401)
    pub const AUTHENTICATION_FAILED: i32 = -32004;
    /// Credentials were valid but access was denied (HTTP 403)
    pub const AUTHORIZATION_FAILED: i32 = -32005;
    /// The server throttled the request (HTTP 429)
    pub const RATE_LIMIT_EXCEEDED: i32 = -32006;
    /// The server could not produce context for the request
    pub const CONTEXT_UNAVAILABLE: i32 = -32007;
    /// The server returned content the client cannot accept
    pub const INVALID_CONTENT: i32 = -32008;
}

/// A typed MCP error value
///
/// This doubles as the wire representation of a JSON-RPC error object, so a
/// server-supplied error deserializes directly into it and passes through
/// with its original code, message, and data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("[Error {code}] {message}")]
pub struct McpError {
    /// Error code (JSON-RPC defined or MCP-specific)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    /// Create a new error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error (-32700): invalid JSON was received
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, message)
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    /// Method not found (-32601): method or capability unavailable
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, message)
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    /// Internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }

    /// Server not initialized (-32002)
    pub fn not_initialized(message: impl Into<String>) -> Self {
        Self::new(codes::SERVER_NOT_INITIALIZED, message)
    }

    /// Resource not found (-32003)
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(codes::RESOURCE_NOT_FOUND, message)
    }

    /// Map an HTTP status code to a typed error
    ///
    /// 400 -> InvalidRequest, 401 -> AuthenticationFailed,
    /// 403 -> AuthorizationFailed, 404 -> ResourceNotFound,
    /// 429 -> RateLimitExceeded, anything else -> InternalError.
    pub fn from_status(status: reqwest::StatusCode, operation: &str) -> Self {
        let code = match status.as_u16() {
            400 => codes::INVALID_REQUEST,
            401 => codes::AUTHENTICATION_FAILED,
            403 => codes::AUTHORIZATION_FAILED,
            404 => codes::RESOURCE_NOT_FOUND,
            429 => codes::RATE_LIMIT_EXCEEDED,
            _ => codes::INTERNAL_ERROR,
        };
        Self::new(code, format!("{} failed with HTTP status {}", operation, status))
    }

    /// Map a transport-level failure to a typed error
    ///
    /// Errors carrying an HTTP status go through [`McpError::from_status`];
    /// body-decode failures become ParseError; bare network failures (no
    /// response at all) become InternalError with the original message.
    pub fn from_transport(operation: &str, err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, operation);
        }
        if err.is_decode() {
            return Self::parse_error(format!("{}: failed to decode response: {}", operation, err));
        }
        Self::internal_error(format!("{}: {}", operation, err))
    }
}
