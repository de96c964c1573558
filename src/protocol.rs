//! JSON-RPC 2.0 envelope types.
//!
//! The bridge is content-agnostic: `params` and `result` are opaque JSON
//! values, never inspected beyond the envelope fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier. JSON-RPC allows strings and integers; the bridge must
/// echo whichever form arrived verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// One inbound request or notification. A missing `id` marks a notification,
/// for which no reply is ever emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object carried on a failed reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One outbound reply. Exactly one of `result`/`error` is present; absent
/// fields are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl JsonRpcResponse {
    pub fn result(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: ErrorDetail) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_with_numeric_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list","params":{}}"#)
                .unwrap();
        assert_eq!(req.id, Some(RequestId::Number(1)));
        assert_eq!(req.method, "tools/list");
        assert!(!req.is_notification());
    }

    #[test]
    fn test_parse_request_with_string_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc-1","method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(RequestId::String("abc-1".to_string())));
        assert!(req.params.is_none());
    }

    #[test]
    fn test_parse_notification() {
        let req: JsonRpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#,
        )
        .unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn test_id_roundtrip_preserves_form() {
        let numeric: RequestId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(42));

        let string: RequestId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(serde_json::to_value(&string).unwrap(), json!("42"));
    }

    #[test]
    fn test_result_response_omits_error() {
        let resp = JsonRpcResponse::result(Some(RequestId::Number(1)), json!({"tools": []}));
        let wire = serde_json::to_value(&resp).unwrap();
        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["id"], 1);
        assert_eq!(wire["result"], json!({"tools": []}));
        assert!(wire.get("error").is_none());
    }

    #[test]
    fn test_error_response_omits_result_and_absent_id() {
        let resp = JsonRpcResponse::error(
            None,
            ErrorDetail {
                code: -32700,
                message: "Invalid JSON-RPC request".to_string(),
                data: None,
            },
        );
        let wire = serde_json::to_value(&resp).unwrap();
        assert!(wire.get("result").is_none());
        assert!(wire.get("id").is_none());
        assert_eq!(wire["error"]["code"], -32700);
        assert!(wire["error"].get("data").is_none());
    }

    #[test]
    fn test_response_deserializes_from_upstream_reply() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        assert_eq!(resp.id, Some(RequestId::Number(7)));
        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().code, -32601);
    }
}
