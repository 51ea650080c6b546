//! Hub Command Module
//!
//! Encapsulates the operations the CLI exposes, keeping the argument
//! parsing in main.rs and the business logic here. Each command builds on
//! the [`ClientManager`] fan-out and returns a JSON value ready to print.

use crate::config::Config;
use crate::mcp::client::{ContextOptions, PromptOptions, ToolCall, ToolQuery};
use crate::mcp::manager::ClientManager;
use anyhow::{Context as _, Result};
use serde_json::{json, Map, Value};
use tracing::info;

/// Build the client registry from configuration
///
/// Every `[[servers]]` entry lands in the registry, registration order
/// matching file order. Entries that cannot produce a working client are
/// kept as disabled placeholders.
pub async fn build_manager(config: &Config) -> ClientManager {
    let manager = ClientManager::new();
    for entry in &config.servers {
        manager.set_client(entry.to_descriptor(), entry.protocol).await;
    }
    info!("Registered {} MCP servers", config.servers.len());
    manager
}

/// Health-check every registered server
pub async fn check_health(manager: &ClientManager) -> Result<Value> {
    let results = manager.check_health_all().await;
    serde_json::to_value(results).context("Failed to encode health results")
}

/// Fetch capabilities from every registered server
pub async fn get_capabilities(manager: &ClientManager) -> Result<Value> {
    let results = manager.get_capabilities_all().await;
    serde_json::to_value(results).context("Failed to encode capability results")
}

/// List tools across servers advertising the tools capability
pub async fn list_tools(manager: &ClientManager) -> Result<Value> {
    let results = manager.get_tools_from_all(ToolQuery::default()).await;
    serde_json::to_value(results).context("Failed to encode tool listings")
}

/// Collect prompt suggestions across servers advertising prompts
pub async fn list_prompts(manager: &ClientManager) -> Result<Value> {
    let results = manager.get_prompts_from_all(PromptOptions::default()).await;
    serde_json::to_value(results).context("Failed to encode prompt results")
}

/// Fetch context from every enabled server
pub async fn get_context(manager: &ClientManager, message: Option<String>) -> Result<Value> {
    let messages = message
        .map(|text| vec![json!({"role": "user", "content": text})])
        .unwrap_or_default();
    let results = manager
        .get_context_from_all(ContextOptions {
            messages,
            ..Default::default()
        })
        .await;
    serde_json::to_value(results).context("Failed to encode context results")
}

/// Execute a tool on one named server
pub async fn call_tool(
    manager: &ClientManager,
    server_id: &str,
    tool_id: &str,
    params: Option<String>,
) -> Result<Value> {
    let parameters: Map<String, Value> = match params {
        Some(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON parameters: {}", raw))?,
        None => Map::new(),
    };

    let result = manager
        .execute_tool(
            server_id,
            ToolCall {
                tool_id: tool_id.to_string(),
                parameters,
                context: None,
            },
        )
        .await?;
    serde_json::to_value(result).context("Failed to encode tool result")
}
