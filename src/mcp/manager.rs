//! Client Manager
//!
//! Registry of all configured MCP servers plus the concurrent fan-out
//! operations over them. The registry is an ordered list keyed by server id:
//! fan-out output order always matches registration order, and replacing a
//! registration keeps its position.
//!
//! Fan-out never short-circuits: every selected client is queried, and each
//! per-server outcome (success or typed failure) lands in its own
//! [`AggregatedResult`] entry.

use crate::mcp::client::{
    AggregatedResult, ContextOptions, McpClient, OperationResult, PromptOptions, ServerDescriptor,
    ToolCall, ToolQuery,
};
use crate::mcp::client::capability;
use crate::mcp::error::McpError;
use crate::mcp::factory::{create_client, Protocol};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-server outcome of [`ClientManager::initialize_all`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InitOutcome {
    pub id: String,
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Stand-in for a registration whose client could not be constructed
///
/// Keeps the server visible in the registry (so status listings still show
/// it) while every operation reports the construction failure.
struct PlaceholderClient {
    descriptor: ServerDescriptor,
    reason: McpError,
}

#[async_trait]
impl McpClient for PlaceholderClient {
    fn descriptor(&self) -> &ServerDescriptor {
        &self.descriptor
    }

    fn initialized(&self) -> bool {
        false
    }

    fn capabilities(&self) -> Option<Value> {
        None
    }

    async fn check_health(&self) -> OperationResult {
        Err(self.reason.clone())
    }

    async fn get_capabilities(&self) -> OperationResult {
        Err(self.reason.clone())
    }
}

/// Ordered registry of MCP clients with concurrent fan-out
#[derive(Default)]
pub struct ClientManager {
    clients: RwLock<Vec<Arc<dyn McpClient>>>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the client for a server
    ///
    /// A registration that cannot produce a working client is kept as a
    /// disabled placeholder instead of being dropped. Enabled clients start
    /// initializing in the background immediately; operations that arrive
    /// first initialize lazily on their own.
    pub async fn set_client(
        &self,
        descriptor: ServerDescriptor,
        protocol: Protocol,
    ) -> Arc<dyn McpClient> {
        let client = match create_client(descriptor.clone(), protocol) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(
                    server = %descriptor.id,
                    error = %err,
                    "failed to create MCP client, registering placeholder"
                );
                let mut descriptor = descriptor;
                descriptor.enabled = false;
                Arc::new(PlaceholderClient {
                    descriptor,
                    reason: err,
                }) as Arc<dyn McpClient>
            }
        };

        self.register(Arc::clone(&client)).await;

        if client.descriptor().enabled {
            let background = Arc::clone(&client);
            tokio::spawn(async move {
                background.initialize().await;
            });
        }
        client
    }

    /// Insert preserving order: a known id keeps its position
    async fn register(&self, client: Arc<dyn McpClient>) {
        let id = client.descriptor().id.clone();
        let mut clients = self.clients.write().await;
        match clients.iter().position(|c| c.descriptor().id == id) {
            Some(index) => clients[index] = client,
            None => clients.push(client),
        }
    }

    pub async fn get_client(&self, id: &str) -> Option<Arc<dyn McpClient>> {
        self.clients
            .read()
            .await
            .iter()
            .find(|c| c.descriptor().id == id)
            .cloned()
    }

    /// Remove a registration; returns whether it existed
    pub async fn remove_client(&self, id: &str) -> bool {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c.descriptor().id != id);
        clients.len() != before
    }

    pub async fn get_all_clients(&self) -> Vec<Arc<dyn McpClient>> {
        self.clients.read().await.clone()
    }

    pub async fn get_initialized_clients(&self) -> Vec<Arc<dyn McpClient>> {
        self.clients
            .read()
            .await
            .iter()
            .filter(|c| c.initialized())
            .cloned()
            .collect()
    }

    /// Clients advertising the named capability as truthy
    pub async fn get_clients_by_capability(&self, name: &str) -> Vec<Arc<dyn McpClient>> {
        self.clients
            .read()
            .await
            .iter()
            .filter(|c| c.has_capability(name))
            .cloned()
            .collect()
    }

    /// Clients eligible for data fan-out
    async fn enabled_clients(&self) -> Vec<Arc<dyn McpClient>> {
        self.clients
            .read()
            .await
            .iter()
            .filter(|c| c.descriptor().enabled)
            .cloned()
            .collect()
    }

    /// Initialize every registered client concurrently
    pub async fn initialize_all(&self) -> Vec<InitOutcome> {
        let clients = self.get_all_clients().await;
        let futures = clients.iter().map(|client| async move {
            let success = client.initialize().await;
            InitOutcome {
                id: client.descriptor().id.clone(),
                name: client.descriptor().name.clone(),
                success,
                error: (!success).then(|| "initialization failed".to_string()),
            }
        });
        join_all(futures).await
    }

    /// Fetch context from every enabled server
    ///
    /// No capability filter here: context is the baseline operation every
    /// server is expected to answer, and one that cannot simply reports its
    /// own failure entry.
    pub async fn get_context_from_all(&self, options: ContextOptions) -> Vec<AggregatedResult> {
        let clients = self.enabled_clients().await;
        let futures = clients.iter().map(|client| {
            let options = options.clone();
            async move {
                let result = client.get_context(options).await;
                AggregatedResult::from_result(client.descriptor(), result)
            }
        });
        join_all(futures).await
    }

    /// Fetch prompt suggestions from enabled servers advertising `prompts`
    pub async fn get_prompts_from_all(&self, options: PromptOptions) -> Vec<AggregatedResult> {
        let clients: Vec<_> = self
            .enabled_clients()
            .await
            .into_iter()
            .filter(|c| c.has_capability(capability::PROMPTS))
            .collect();
        let futures = clients.iter().map(|client| {
            let options = options.clone();
            async move {
                let result = client.get_prompts(options).await;
                AggregatedResult::from_result(client.descriptor(), result)
            }
        });
        join_all(futures).await
    }

    /// List tools from enabled servers advertising `tools`
    pub async fn get_tools_from_all(&self, options: ToolQuery) -> Vec<AggregatedResult> {
        let clients: Vec<_> = self
            .enabled_clients()
            .await
            .into_iter()
            .filter(|c| c.has_capability(capability::TOOLS))
            .collect();
        let futures = clients.iter().map(|client| {
            let options = options.clone();
            async move {
                let result = client.get_tools(options).await;
                AggregatedResult::from_result(client.descriptor(), result)
            }
        });
        join_all(futures).await
    }

    /// Health-check every registered server, disabled ones included
    pub async fn check_health_all(&self) -> Vec<AggregatedResult> {
        let clients = self.get_all_clients().await;
        let futures = clients.iter().map(|client| async move {
            let result = client.check_health().await;
            AggregatedResult::from_result(client.descriptor(), result)
        });
        join_all(futures).await
    }

    /// Fetch capabilities from every registered server, disabled included
    pub async fn get_capabilities_all(&self) -> Vec<AggregatedResult> {
        let clients = self.get_all_clients().await;
        let futures = clients.iter().map(|client| async move {
            let result = client.get_capabilities().await;
            AggregatedResult::from_result(client.descriptor(), result)
        });
        join_all(futures).await
    }

    /// Execute a tool on one named server
    ///
    /// Unlike fan-out, this pre-validates and returns typed errors for
    /// caller mistakes: unknown id, disabled or uninitialized server,
    /// missing tools capability, empty tool id. Only the delegated call's
    /// outcome lands in the result entry.
    pub async fn execute_tool(
        &self,
        server_id: &str,
        options: ToolCall,
    ) -> Result<AggregatedResult, McpError> {
        let client = self.get_client(server_id).await.ok_or_else(|| {
            McpError::resource_not_found(format!("no server registered with id '{}'", server_id))
        })?;

        if !client.descriptor().enabled {
            return Err(McpError::not_initialized(format!(
                "server '{}' is disabled",
                server_id
            )));
        }
        client.ensure_initialized().await?;
        if !client.has_capability(capability::TOOLS) {
            return Err(McpError::method_not_found(format!(
                "server '{}' does not support tools",
                server_id
            )));
        }
        if options.tool_id.is_empty() {
            return Err(McpError::invalid_params("tool execution requires a toolId"));
        }

        let result = client.execute_tool(options).await;
        Ok(AggregatedResult::from_result(client.descriptor(), result))
    }
}
