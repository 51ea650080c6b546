//! End-to-end tests against in-process mock MCP servers

mod common;

use axum::http::StatusCode;
use common::{spawn_jsonrpc, spawn_rest, spawn_status, JsonRpcOptions};
use mcp_hub::config::{Config, ServerEntry};
use mcp_hub::mcp::client::{
    AuthConfig, AuthType, ContextOptions, PromptOptions, ServerDescriptor, ToolCall, ToolQuery,
};
use mcp_hub::mcp::error::codes;
use mcp_hub::mcp::factory::Protocol;
use mcp_hub::mcp::jsonrpc::JsonRpcClient;
use mcp_hub::mcp::manager::ClientManager;
use mcp_hub::mcp::rest::RestClient;
use mcp_hub::mcp::McpClient;
use serde_json::json;

fn descriptor(id: &str, url: &str) -> ServerDescriptor {
    ServerDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        url: url.to_string(),
        enabled: true,
        auth_type: AuthType::None,
        auth_config: AuthConfig::default(),
    }
}

#[tokio::test]
async fn initialization_hits_server_once() {
    let server = spawn_jsonrpc(JsonRpcOptions::default()).await;
    let client = JsonRpcClient::new(descriptor("a", &server.url)).unwrap();

    assert!(client.initialize().await);
    assert!(client.initialize().await);
    assert!(client.initialized());
    assert_eq!(server.init_count(), 1);
    assert!(client.has_capability("tools"));
}

#[tokio::test]
async fn legacy_server_initializes_via_capability_probe() {
    let server = spawn_jsonrpc(JsonRpcOptions {
        legacy: true,
        ..Default::default()
    })
    .await;
    let client = JsonRpcClient::new(descriptor("legacy", &server.url)).unwrap();

    assert!(client.initialize().await);
    assert!(client.initialized());
    assert!(client.has_capability("prompts"));

    // Operations work normally after the fallback path
    let context = client.get_context(ContextOptions::default()).await.unwrap();
    assert_eq!(context["context"][0]["text"], json!("mock context"));
}

#[tokio::test]
async fn jsonrpc_operations_round_trip() {
    let server = spawn_jsonrpc(JsonRpcOptions::default()).await;
    let client = JsonRpcClient::new(descriptor("a", &server.url)).unwrap();

    let context = client
        .get_context(ContextOptions {
            resource_uri: Some("chat://thread-7".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(context["resource"]["uri"], json!("chat://thread-7"));

    let prompts = client.get_prompts(PromptOptions::default()).await.unwrap();
    assert_eq!(prompts["prompts"][0]["id"], json!("p1"));

    let tools = client.get_tools(ToolQuery::default()).await.unwrap();
    assert_eq!(tools["tools"][0]["id"], json!("search"));

    let result = client
        .execute_tool(ToolCall {
            tool_id: "search".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(result["executed"], json!("search"));

    let health = client.check_health().await.unwrap();
    assert_eq!(health["status"], json!("healthy"));
    assert_eq!(health["details"]["uptimeSecs"], json!(42));
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn rest_client_round_trip() {
    let server = spawn_rest(json!({"resources": true, "prompts": true, "tools": true})).await;
    let client = RestClient::new(descriptor("r", &server.url)).unwrap();

    assert!(client.initialize().await);
    assert!(client.has_capability("tools"));

    let context = client.get_context(ContextOptions::default()).await.unwrap();
    assert_eq!(context["context"][0]["text"], json!("rest context"));

    let result = client
        .execute_tool(ToolCall {
            tool_id: "search".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(result["executed"], json!("search"));

    let health = client.check_health().await.unwrap();
    assert_eq!(health["status"], json!("healthy"));
}

#[tokio::test]
async fn http_statuses_map_to_typed_errors() {
    for (status, expected) in [
        (StatusCode::NOT_FOUND, codes::RESOURCE_NOT_FOUND),
        (StatusCode::TOO_MANY_REQUESTS, codes::RATE_LIMIT_EXCEEDED),
        (StatusCode::UNAUTHORIZED, codes::AUTHENTICATION_FAILED),
    ] {
        let url = spawn_status(status).await;
        let client = JsonRpcClient::new(descriptor("err", &url)).unwrap();

        // Discovery needs no prior initialization, and both the RPC and
        // REST probe paths see the same status
        let err = client.get_capabilities().await.unwrap_err();
        assert_eq!(err.code, expected, "status {}", status);
    }
}

#[tokio::test]
async fn network_failure_is_internal_error() {
    let client = JsonRpcClient::new(descriptor("down", "http://127.0.0.1:1")).unwrap();
    let err = client.get_capabilities().await.unwrap_err();
    assert_eq!(err.code, codes::INTERNAL_ERROR);
}

#[tokio::test]
async fn basic_auth_header_is_enforced() {
    let server = spawn_jsonrpc(JsonRpcOptions {
        require_authorization: Some("Basic dTpw".to_string()),
        ..Default::default()
    })
    .await;

    let mut desc = descriptor("auth", &server.url);
    desc.auth_type = AuthType::Basic;
    desc.auth_config = AuthConfig {
        username: Some("u".to_string()),
        password: Some("p".to_string()),
        ..Default::default()
    };
    let client = JsonRpcClient::new(desc).unwrap();
    assert!(client.initialize().await);

    // The same server rejects a client without credentials
    let anon = JsonRpcClient::new(descriptor("anon", &server.url)).unwrap();
    assert!(!anon.initialize().await);
}

#[tokio::test]
async fn fan_out_reports_every_enabled_server_in_order() {
    let good = spawn_jsonrpc(JsonRpcOptions::default()).await;
    let broken = spawn_status(StatusCode::NOT_FOUND).await;

    let manager = ClientManager::new();
    manager
        .set_client(descriptor("one", &good.url), Protocol::Auto)
        .await;
    manager
        .set_client(descriptor("two", &broken), Protocol::Auto)
        .await;
    manager.initialize_all().await;

    let results = manager.get_context_from_all(ContextOptions::default()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "one");
    assert!(results[0].success);
    assert_eq!(results[1].id, "two");
    assert!(!results[1].success);
}

#[tokio::test]
async fn capability_gating_skips_unsupporting_servers() {
    let no_prompts = spawn_jsonrpc(JsonRpcOptions {
        capabilities: json!({"resources": true, "tools": true}),
        ..Default::default()
    })
    .await;

    let manager = ClientManager::new();
    manager
        .set_client(descriptor("np", &no_prompts.url), Protocol::Auto)
        .await;
    manager.initialize_all().await;

    // Zero prompt-capable servers means an empty aggregate, not an error
    let prompts = manager.get_prompts_from_all(PromptOptions::default()).await;
    assert!(prompts.is_empty());

    let tools = manager.get_tools_from_all(ToolQuery::default()).await;
    assert_eq!(tools.len(), 1);
    assert!(tools[0].success);
}

#[tokio::test]
async fn disabled_servers_skip_data_fan_out_but_not_health() {
    let server = spawn_jsonrpc(JsonRpcOptions::default()).await;

    let mut disabled = descriptor("off", &server.url);
    disabled.enabled = false;

    let manager = ClientManager::new();
    manager
        .set_client(descriptor("on", &server.url), Protocol::Auto)
        .await;
    manager.set_client(disabled, Protocol::Auto).await;
    manager.initialize_all().await;

    let context = manager.get_context_from_all(ContextOptions::default()).await;
    assert_eq!(context.len(), 1);
    assert_eq!(context[0].id, "on");

    let health = manager.check_health_all().await;
    assert_eq!(health.len(), 2);
}

#[tokio::test]
async fn execute_tool_validates_its_target() {
    let server = spawn_jsonrpc(JsonRpcOptions::default()).await;
    let manager = ClientManager::new();
    manager
        .set_client(descriptor("a", &server.url), Protocol::Auto)
        .await;
    manager.initialize_all().await;

    let err = manager
        .execute_tool("ghost", ToolCall::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, codes::RESOURCE_NOT_FOUND);

    let err = manager
        .execute_tool("a", ToolCall::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, codes::INVALID_PARAMS);

    let result = manager
        .execute_tool(
            "a",
            ToolCall {
                tool_id: "search".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.data.as_ref().unwrap()["executed"], json!("search"));
}

#[tokio::test]
async fn config_to_fan_out_round_trip() {
    let jsonrpc = spawn_jsonrpc(JsonRpcOptions::default()).await;
    let rest = spawn_rest(json!({"resources": true, "tools": true})).await;

    let mut config = Config::default();
    config.servers.push(ServerEntry {
        id: "rpc".to_string(),
        url: jsonrpc.url.clone(),
        ..Default::default()
    });
    config.servers.push(ServerEntry {
        id: "rest".to_string(),
        url: rest.url.clone(),
        protocol: Protocol::Rest,
        ..Default::default()
    });

    let manager = mcp_hub::commands::build_manager(&config).await;
    let outcomes = manager.initialize_all().await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.success));

    let results = manager.get_context_from_all(ContextOptions::default()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "rpc");
    assert_eq!(results[1].id, "rest");
    assert!(results.iter().all(|r| r.success));
}
