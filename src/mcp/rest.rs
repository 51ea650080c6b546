//! REST Protocol Client
//!
//! Talks to servers that expose the MCP surface as plain HTTP resources
//! under the base URL: `POST /context`, `POST /prompts`, `GET /tools`,
//! `POST /tools/{id}/execute`, `GET /health`, and `GET /capabilities`.
//! Initialization is just a capability fetch; there is no handshake.

use crate::mcp::client::{
    capability, decode_response, endpoint_url, ClientCore, ContextOptions, McpClient,
    OperationResult, PromptOptions, ServerDescriptor, ToolCall, ToolQuery, DEFAULT_CONTEXT_URI,
};
use crate::mcp::error::McpError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// MCP client speaking plain HTTP to resource-per-operation endpoints
pub struct RestClient {
    core: ClientCore,
}

impl RestClient {
    pub fn new(descriptor: ServerDescriptor) -> Result<Self, McpError> {
        Ok(Self {
            core: ClientCore::new(descriptor)?,
        })
    }

    async fn get(&self, segments: &[&str], query: &[(String, String)]) -> Result<Value, McpError> {
        let operation = segments.join("/");
        let url = endpoint_url(&self.core.descriptor().url, segments)?;
        let response = self
            .core
            .http()
            .get(url)
            .headers(self.core.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| McpError::from_transport(&operation, &e))?;
        decode_response(response, &operation).await
    }

    async fn post(&self, segments: &[&str], body: Value) -> Result<Value, McpError> {
        let operation = segments.join("/");
        let url = endpoint_url(&self.core.descriptor().url, segments)?;
        let response = self
            .core
            .http()
            .post(url)
            .headers(self.core.auth_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| McpError::from_transport(&operation, &e))?;
        decode_response(response, &operation).await
    }

    fn require_capability(&self, name: &str, operation: &str) -> Result<(), McpError> {
        if self.has_capability(name) {
            Ok(())
        } else {
            Err(McpError::method_not_found(format!(
                "server '{}' does not support {}",
                self.core.descriptor().name,
                operation
            )))
        }
    }

    async fn get_context_inner(&self, options: ContextOptions) -> OperationResult {
        self.ensure_initialized().await?;
        let uri = options
            .resource_uri
            .unwrap_or_else(|| DEFAULT_CONTEXT_URI.to_string());
        self.post(
            &["context"],
            json!({
                "resource": {"uri": uri},
                "messages": options.messages,
                "parameters": options.parameters,
            }),
        )
        .await
    }

    async fn get_prompts_inner(&self, options: PromptOptions) -> OperationResult {
        self.ensure_initialized().await?;
        self.require_capability(capability::PROMPTS, "prompts")?;
        self.post(
            &["prompts"],
            json!({
                "messages": options.messages,
                "parameters": options.parameters,
            }),
        )
        .await
    }

    async fn get_tools_inner(&self, options: ToolQuery) -> OperationResult {
        self.ensure_initialized().await?;
        self.require_capability(capability::TOOLS, "tools")?;

        // Scalar parameters flatten into the query string; anything nested
        // is JSON-encoded so it survives the trip.
        let query: Vec<(String, String)> = options
            .parameters
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect();
        self.get(&["tools"], &query).await
    }

    async fn execute_tool_inner(&self, options: ToolCall) -> OperationResult {
        self.ensure_initialized().await?;
        self.require_capability(capability::TOOLS, "tools/execute")?;
        if options.tool_id.is_empty() {
            return Err(McpError::invalid_params("tool execution requires a toolId"));
        }
        self.post(
            &["tools", &options.tool_id, "execute"],
            json!({
                "parameters": options.parameters,
                "context": options.context,
            }),
        )
        .await
    }

    async fn check_health_inner(&self) -> OperationResult {
        let details = self.get(&["health"], &[]).await?;
        Ok(json!({
            "status": "healthy",
            "details": details,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

#[async_trait]
impl McpClient for RestClient {
    fn descriptor(&self) -> &ServerDescriptor {
        self.core.descriptor()
    }

    fn initialized(&self) -> bool {
        self.core.initialized()
    }

    fn capabilities(&self) -> Option<Value> {
        self.core.capabilities()
    }

    /// No handshake on the REST surface; a successful `GET /capabilities`
    /// is what marks the client initialized.
    async fn initialize(&self) -> bool {
        if self.core.initialized() {
            return true;
        }
        let _guard = self.core.init_lock.lock().await;
        if self.core.initialized() {
            return true;
        }

        match self.get(&["capabilities"], &[]).await {
            Ok(caps) => {
                self.core.set_capabilities(caps);
                self.core.mark_initialized();
                tracing::info!(server = %self.core.descriptor().name, "REST client initialized");
                true
            }
            Err(err) => {
                tracing::warn!(
                    server = %self.core.descriptor().name,
                    error = %err,
                    "capability fetch failed, client stays uninitialized"
                );
                false
            }
        }
    }

    async fn get_context(&self, options: ContextOptions) -> OperationResult {
        let result = self.get_context_inner(options).await;
        self.core.finish("context", result)
    }

    async fn get_prompts(&self, options: PromptOptions) -> OperationResult {
        let result = self.get_prompts_inner(options).await;
        self.core.finish("prompts", result)
    }

    async fn get_tools(&self, options: ToolQuery) -> OperationResult {
        let result = self.get_tools_inner(options).await;
        self.core.finish("tools", result)
    }

    async fn execute_tool(&self, options: ToolCall) -> OperationResult {
        let result = self.execute_tool_inner(options).await;
        self.core.finish("tools/execute", result)
    }

    async fn check_health(&self) -> OperationResult {
        let result = self.check_health_inner().await;
        self.core.finish("health", result)
    }

    async fn get_capabilities(&self) -> OperationResult {
        let result = self.get(&["capabilities"], &[]).await;
        self.core.finish("capabilities", result)
    }
}
