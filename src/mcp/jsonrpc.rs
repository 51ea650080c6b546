//! JSON-RPC Protocol Client
//!
//! Speaks JSON-RPC 2.0 over a single POST endpoint (the server's base URL).
//! This is the default protocol variant: when the `initialize` handshake
//! fails (legacy servers that predate it, or transport faults on the RPC
//! path), it falls back to probing `getCapabilities`, first as an RPC call
//! and then as a REST `GET /capabilities`, so it still works against
//! servers that only expose the REST surface for discovery.

use crate::mcp::client::{
    capability, decode_response, endpoint_url, error_from_response, ClientCore, ContextOptions,
    McpClient, OperationResult, PromptOptions, ServerDescriptor, ToolCall, ToolQuery,
    DEFAULT_CONTEXT_URI,
};
use crate::mcp::error::McpError;
use crate::mcp::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use async_trait::async_trait;
use serde_json::{json, Value};

/// MCP client speaking JSON-RPC 2.0 to a single POST endpoint
pub struct JsonRpcClient {
    core: ClientCore,
}

impl JsonRpcClient {
    pub fn new(descriptor: ServerDescriptor) -> Result<Self, McpError> {
        Ok(Self {
            core: ClientCore::new(descriptor)?,
        })
    }

    /// Send a correlated request and unwrap the response envelope
    async fn call(&self, method: &str, params: Value) -> Result<Value, McpError> {
        let request = JsonRpcRequest::new(method, params);
        tracing::debug!(
            server = %self.core.descriptor().name,
            method,
            id = %request.id,
            "sending JSON-RPC request"
        );

        let response = self
            .core
            .http()
            .post(&self.core.descriptor().url)
            .headers(self.core.auth_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| McpError::from_transport(method, &e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, method).await);
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| McpError::from_transport(method, &e))?;
        envelope.into_result()
    }

    /// Send a notification; no correlated response body is expected
    async fn notify(&self, method: &str, params: Value) -> Result<(), McpError> {
        let note = JsonRpcNotification::new(method, params);
        let response = self
            .core
            .http()
            .post(&self.core.descriptor().url)
            .headers(self.core.auth_headers()?)
            .json(&note)
            .send()
            .await
            .map_err(|e| McpError::from_transport(method, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(McpError::from_status(status, method));
        }
        Ok(())
    }

    /// REST-style GET against the same base URL (fallback path)
    async fn rest_get(&self, segment: &str) -> Result<Value, McpError> {
        let url = endpoint_url(&self.core.descriptor().url, &[segment])?;
        let response = self
            .core
            .http()
            .get(url)
            .headers(self.core.auth_headers()?)
            .send()
            .await
            .map_err(|e| McpError::from_transport(segment, &e))?;
        decode_response(response, segment).await
    }

    /// Fetch capabilities via RPC, falling back to `GET /capabilities`
    async fn probe_capabilities(&self) -> Result<Value, McpError> {
        match self.call("getCapabilities", json!({})).await {
            Ok(caps) => Ok(caps),
            Err(err) => {
                tracing::debug!(
                    server = %self.core.descriptor().name,
                    error = %err,
                    "getCapabilities RPC failed, falling back to REST"
                );
                self.rest_get("capabilities").await
            }
        }
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
        self.call(
            "getContext",
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
        self.require_capability(capability::PROMPTS, "getPrompts")?;
        self.call(
            "getPrompts",
            json!({
                "messages": options.messages,
                "parameters": options.parameters,
            }),
        )
        .await
    }

    async fn get_tools_inner(&self, options: ToolQuery) -> OperationResult {
        self.ensure_initialized().await?;
        self.require_capability(capability::TOOLS, "getTools")?;
        self.call("getTools", json!({"parameters": options.parameters}))
            .await
    }

    async fn execute_tool_inner(&self, options: ToolCall) -> OperationResult {
        self.ensure_initialized().await?;
        self.require_capability(capability::TOOLS, "executeTool")?;
        if options.tool_id.is_empty() {
            return Err(McpError::invalid_params("executeTool requires a toolId"));
        }
        self.call(
            "executeTool",
            json!({
                "toolId": options.tool_id,
                "parameters": options.parameters,
                "context": options.context,
            }),
        )
        .await
    }

    async fn check_health_inner(&self) -> OperationResult {
        let details = match self.call("health", json!({})).await {
            Ok(details) => details,
            Err(err) => {
                tracing::debug!(
                    server = %self.core.descriptor().name,
                    error = %err,
                    "health RPC failed, falling back to REST"
                );
                self.rest_get("health").await?
            }
        };
        Ok(json!({
            "status": "healthy",
            "details": details,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

#[async_trait]
impl McpClient for JsonRpcClient {
    fn descriptor(&self) -> &ServerDescriptor {
        self.core.descriptor()
    }

    fn initialized(&self) -> bool {
        self.core.initialized()
    }

    fn capabilities(&self) -> Option<Value> {
        self.core.capabilities()
    }

    /// Handshake: send `initialize` with our client info and advertised
    /// capabilities, store the server's capabilities, then fire the
    /// `initialized` notification. When the handshake request itself fails
    /// (legacy server), fall back to a direct capability probe; only a
    /// successful probe marks the client initialized.
    async fn initialize(&self) -> bool {
        if self.core.initialized() {
            return true;
        }
        let _guard = self.core.init_lock.lock().await;
        if self.core.initialized() {
            return true;
        }

        let params = json!({
            "clientInfo": {
                "name": "mcp-hub",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "resources": true,
                "prompts": true,
                "tools": true,
            },
        });

        match self.call("initialize", params).await {
            Ok(result) => {
                let caps = result
                    .get("capabilities")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                self.core.set_capabilities(caps);
                self.core.mark_initialized();

                // No response is expected for the notification, so its
                // failure does not undo a successful handshake.
                if let Err(err) = self.notify("initialized", json!({})).await {
                    tracing::debug!(
                        server = %self.core.descriptor().name,
                        error = %err,
                        "initialized notification failed"
                    );
                }

                tracing::info!(server = %self.core.descriptor().name, "MCP client initialized");
                true
            }
            Err(err) => {
                tracing::warn!(
                    server = %self.core.descriptor().name,
                    error = %err,
                    "initialize handshake failed, probing capabilities directly"
                );
                match self.probe_capabilities().await {
                    Ok(caps) => {
                        self.core.set_capabilities(caps);
                        self.core.mark_initialized();
                        tracing::info!(
                            server = %self.core.descriptor().name,
                            "MCP client initialized via capability probe"
                        );
                        true
                    }
                    Err(err) => {
                        tracing::warn!(
                            server = %self.core.descriptor().name,
                            error = %err,
                            "capability probe failed, client stays uninitialized"
                        );
                        false
                    }
                }
            }
        }
    }

    async fn get_context(&self, options: ContextOptions) -> OperationResult {
        let result = self.get_context_inner(options).await;
        self.core.finish("getContext", result)
    }

    async fn get_prompts(&self, options: PromptOptions) -> OperationResult {
        let result = self.get_prompts_inner(options).await;
        self.core.finish("getPrompts", result)
    }

    async fn get_tools(&self, options: ToolQuery) -> OperationResult {
        let result = self.get_tools_inner(options).await;
        self.core.finish("getTools", result)
    }

    async fn execute_tool(&self, options: ToolCall) -> OperationResult {
        let result = self.execute_tool_inner(options).await;
        self.core.finish("executeTool", result)
    }

    async fn check_health(&self) -> OperationResult {
        let result = self.check_health_inner().await;
        self.core.finish("checkHealth", result)
    }

    async fn get_capabilities(&self) -> OperationResult {
        let result = self.probe_capabilities().await;
        self.core.finish("getCapabilities", result)
    }
}
