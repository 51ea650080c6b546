//! MCP (Model Context Protocol) client layer
//!
//! Connects to multiple MCP servers at once and aggregates what they
//! return. Layout:
//!
//! - [`error`]: the fixed error-code table and the typed [`McpError`]
//! - [`protocol`]: JSON-RPC 2.0 wire envelopes
//! - [`client`]: the [`McpClient`] contract plus shared connection state
//! - [`jsonrpc`]: the JSON-RPC protocol client (default variant)
//! - [`rest`]: the REST protocol client
//! - [`factory`]: registration-to-client construction
//! - [`manager`]: the ordered registry and concurrent fan-out

pub mod client;
pub mod error;
pub mod factory;
pub mod jsonrpc;
pub mod manager;
pub mod protocol;
pub mod rest;

#[cfg(test)]
mod proptests;

pub use client::{
    AggregatedResult, AuthConfig, AuthType, ContextOptions, McpClient, OperationResult,
    PromptOptions, ServerDescriptor, ToolCall, ToolQuery,
};
pub use error::McpError;
pub use factory::{create_client, Protocol};
pub use jsonrpc::JsonRpcClient;
pub use manager::{ClientManager, InitOutcome};
pub use rest::RestClient;
