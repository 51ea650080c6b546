//! Property-based tests for the wire layer

use crate::mcp::client::{AggregatedResult, ServerDescriptor};
use crate::mcp::error::{codes, McpError};
use crate::mcp::protocol::{next_request_id, JsonRpcRequest, JsonRpcResponse};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    /// Any error value survives a wire round trip unchanged
    #[test]
    fn error_round_trips(code in -33000i32..-32000, message in ".{0,64}") {
        let original = McpError::new(code, message);
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: McpError = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(original, decoded);
    }

    /// Every HTTP status maps to a code from the fixed table
    #[test]
    fn status_mapping_is_total(status in 100u16..600) {
        let status = match reqwest::StatusCode::from_u16(status) {
            Ok(s) => s,
            Err(_) => return Ok(()),
        };
        let err = McpError::from_status(status, "op");
        let known = [
            codes::INVALID_REQUEST,
            codes::AUTHENTICATION_FAILED,
            codes::AUTHORIZATION_FAILED,
            codes::RESOURCE_NOT_FOUND,
            codes::RATE_LIMIT_EXCEEDED,
            codes::INTERNAL_ERROR,
        ];
        prop_assert!(known.contains(&err.code));
    }

    /// Request envelopes round trip for arbitrary method names and params
    #[test]
    fn request_round_trips(method in "[a-zA-Z][a-zA-Z0-9_]{0,24}", n in any::<i64>()) {
        let original = JsonRpcRequest::new(method, json!({"n": n}));
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: JsonRpcRequest = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(original, decoded);
    }

    /// A response with an error always unwraps to that error, whatever the
    /// result field claims
    #[test]
    fn error_wins_over_result(code in -33000i32..-32000) {
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: Some(json!("x")),
            result: Some(json!({"ok": true})),
            error: Some(McpError::new(code, "failed")),
        };
        let err = resp.into_result().unwrap_err();
        prop_assert_eq!(err.code, code);
    }

    /// Aggregation never reports success and error at once
    #[test]
    fn aggregated_result_is_exclusive(ok in any::<bool>()) {
        let desc = ServerDescriptor {
            id: "s".to_string(),
            name: "s".to_string(),
            url: "http://localhost".to_string(),
            enabled: true,
            auth_type: Default::default(),
            auth_config: Default::default(),
        };
        let result = if ok {
            Ok(json!({}))
        } else {
            Err(McpError::internal_error("boom"))
        };
        let agg = AggregatedResult::from_result(&desc, result);
        prop_assert_eq!(agg.success, agg.data.is_some());
        prop_assert_eq!(agg.success, agg.error.is_none());
    }
}

#[test]
fn request_ids_are_well_formed() {
    for _ in 0..256 {
        let id = next_request_id();
        let (ts, suffix) = id.split_once('-').expect("dash separator");
        assert!(ts.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
