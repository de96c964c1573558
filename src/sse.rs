use serde_json::Value;
use tracing::warn;

/// Data-field marker per SSE framing.
const DATA_PREFIX: &str = "data:";

/// Conventional end-of-stream sentinel.
const DONE_SENTINEL: &str = "[DONE]";

/// Decode an event-stream body into the single JSON document it carries.
///
/// Accumulates the text after every `data:` line, concatenating fragments
/// (servers may split one JSON document across multiple data lines), and
/// stops at the `[DONE]` sentinel. Returns `None` when the body had no data
/// lines at all.
///
/// Decoding is best-effort: accumulated text that fails to parse yields a
/// placeholder error value rather than a failure, so a garbled stream still
/// produces a reply for the waiting caller.
pub fn decode_event_stream(body: &str) -> Option<Value> {
    let mut data = String::new();

    for line in body.lines() {
        let Some(fragment) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let fragment = fragment.strip_prefix(' ').unwrap_or(fragment);
        if fragment.trim() == DONE_SENTINEL {
            break;
        }
        data.push_str(fragment);
    }

    if data.is_empty() {
        return None;
    }

    match serde_json::from_str(&data) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "failed to parse SSE data as JSON");
            Some(serde_json::json!({"error": "Failed to parse SSE response"}))
        }
    }
}
