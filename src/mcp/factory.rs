//! Client Factory
//!
//! Maps a server registration to the concrete protocol client. JSON-RPC is
//! the default: only an explicit `rest` selection produces a [`RestClient`],
//! since the JSON-RPC variant already degrades to REST discovery on its own.

use crate::mcp::client::{McpClient, ServerDescriptor};
use crate::mcp::error::McpError;
use crate::mcp::jsonrpc::JsonRpcClient;
use crate::mcp::rest::RestClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Protocol selection for a server registration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Pick for the caller: currently always JSON-RPC
    #[default]
    Auto,
    JsonRpc,
    Rest,
}

/// Build the concrete client for a registration
pub fn create_client(
    descriptor: ServerDescriptor,
    protocol: Protocol,
) -> Result<Arc<dyn McpClient>, McpError> {
    let client: Arc<dyn McpClient> = match protocol {
        Protocol::Rest => Arc::new(RestClient::new(descriptor)?),
        Protocol::Auto | Protocol::JsonRpc => Arc::new(JsonRpcClient::new(descriptor)?),
    };
    tracing::debug!(
        server = %client.descriptor().name,
        protocol = ?protocol,
        "created MCP client"
    );
    Ok(client)
}
