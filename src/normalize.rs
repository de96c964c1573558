//! Response normalization: content-type routing and reply-shape
//! classification.
//!
//! The relay hands over the raw body text and its declared content type; this
//! module reduces that to a single structured value, then tags it with one of
//! three shapes so the dispatcher makes the emit decision exactly once.

use serde_json::Value;

use crate::protocol::{JSONRPC_VERSION, JsonRpcResponse};
use crate::sse::decode_event_stream;

/// What an upstream reply turned out to be, evaluated once.
#[derive(Debug)]
pub enum ReplyShape {
    /// No payload due: empty body, empty structure, or a dataless stream.
    Empty,
    /// Already a complete JSON-RPC reply; forward as-is (id re-stamped).
    Full(JsonRpcResponse),
    /// Any other payload; wrap it as the `result` of a fresh reply.
    Bare(Value),
}

/// Reduce a raw response body to a structured value based on its declared
/// content type. Event-stream bodies go through SSE decoding; everything else
/// is parsed as JSON, falling back to the raw text verbatim for upstreams
/// that reply with non-JSON bodies.
pub fn normalize_body(content_type: Option<&str>, body: &str) -> Option<Value> {
    if content_type.is_some_and(|ct| ct.contains("text/event-stream")) {
        return decode_event_stream(body);
    }

    if body.is_empty() {
        return None;
    }

    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(body.to_string())),
    }
}

/// Tag a normalized payload with its reply shape.
pub fn classify_payload(payload: Option<Value>) -> ReplyShape {
    let Some(value) = payload else {
        return ReplyShape::Empty;
    };

    if is_empty_structure(&value) {
        return ReplyShape::Empty;
    }

    if is_full_reply(&value) {
        match serde_json::from_value::<JsonRpcResponse>(value.clone()) {
            Ok(reply) => return ReplyShape::Full(reply),
            // Looked like a reply but the envelope fields don't deserialize
            // (e.g. a non-object error); treat it as opaque payload.
            Err(_) => return ReplyShape::Bare(value),
        }
    }

    ReplyShape::Bare(value)
}

fn is_empty_structure(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_full_reply(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
        && (obj.contains_key("result") || obj.contains_key("error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use serde_json::json;

    #[test]
    fn test_json_content_type() {
        let payload = normalize_body(Some("application/json"), r#"{"tools":[]}"#);
        assert_eq!(payload, Some(json!({"tools": []})));
    }

    #[test]
    fn test_missing_content_type_still_parses_json() {
        let payload = normalize_body(None, r#"{"ok":true}"#);
        assert_eq!(payload, Some(json!({"ok": true})));
    }

    #[test]
    fn test_non_json_body_passes_through_verbatim() {
        let payload = normalize_body(Some("text/plain"), "upstream says hi");
        assert_eq!(payload, Some(Value::String("upstream says hi".to_string())));
    }

    #[test]
    fn test_empty_body_is_no_payload() {
        assert_eq!(normalize_body(Some("application/json"), ""), None);
    }

    #[test]
    fn test_event_stream_routed_to_sse_decoder() {
        let body = "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\ndata: [DONE]\n\n";
        let payload = normalize_body(Some("text/event-stream"), body);
        assert_eq!(
            payload,
            Some(json!({"jsonrpc": "2.0", "id": 1, "result": {}}))
        );
    }

    #[test]
    fn test_event_stream_with_charset_parameter() {
        let payload = normalize_body(
            Some("text/event-stream; charset=utf-8"),
            "data: {\"a\":1}\n\n",
        );
        assert_eq!(payload, Some(json!({"a": 1})));
    }

    #[test]
    fn test_raw_body_not_parsed_before_content_type_routing() {
        // The same text routed as SSE and as JSON must take different paths.
        let body = "data: {\"a\":1}\n\n";
        assert_eq!(
            normalize_body(Some("text/event-stream"), body),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            normalize_body(Some("application/json"), body),
            Some(Value::String(body.to_string()))
        );
    }

    #[test]
    fn test_classify_none_as_empty() {
        assert!(matches!(classify_payload(None), ReplyShape::Empty));
    }

    #[test]
    fn test_classify_empty_structures() {
        assert!(matches!(classify_payload(Some(json!(null))), ReplyShape::Empty));
        assert!(matches!(classify_payload(Some(json!({}))), ReplyShape::Empty));
        assert!(matches!(classify_payload(Some(json!([]))), ReplyShape::Empty));
        assert!(matches!(classify_payload(Some(json!(""))), ReplyShape::Empty));
    }

    #[test]
    fn test_classify_full_reply() {
        let shape = classify_payload(Some(json!({
            "jsonrpc": "2.0",
            "id": 99,
            "result": {"tools": []}
        })));
        match shape {
            ReplyShape::Full(reply) => {
                assert_eq!(reply.id, Some(RequestId::Number(99)));
                assert_eq!(reply.result, Some(json!({"tools": []})));
            }
            other => panic!("expected Full, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_full_error_reply() {
        let shape = classify_payload(Some(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "Method not found"}
        })));
        assert!(matches!(shape, ReplyShape::Full(_)));
    }

    #[test]
    fn test_classify_bare_payload() {
        let shape = classify_payload(Some(json!({"tools": ["a"]})));
        match shape {
            ReplyShape::Bare(value) => assert_eq!(value, json!({"tools": ["a"]})),
            other => panic!("expected Bare, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_version_is_bare() {
        let shape = classify_payload(Some(json!({"jsonrpc": "1.0", "result": 1})));
        assert!(matches!(shape, ReplyShape::Bare(_)));
    }

    #[test]
    fn test_sse_placeholder_is_bare() {
        let shape = classify_payload(Some(json!({"error": "Failed to parse SSE response"})));
        // Not a full reply: no jsonrpc version tag.
        assert!(matches!(shape, ReplyShape::Bare(_)));
    }
}
