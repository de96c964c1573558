use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::BridgeError;
use crate::metrics::BridgeMetrics;
use crate::normalize::{ReplyShape, classify_payload, normalize_body};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::relay::HttpRelay;

/// Drives one message unit through the forwarding pipeline: parse, relay,
/// normalize, and shape the single outbound reply (or decide there is none).
pub struct Dispatcher {
    relay: HttpRelay,
    metrics: Arc<BridgeMetrics>,
}

impl Dispatcher {
    pub fn new(relay: HttpRelay, metrics: Arc<BridgeMetrics>) -> Self {
        Self { relay, metrics }
    }

    pub fn relay(&self) -> &HttpRelay {
        &self.relay
    }

    /// Process one framed unit. Returns the reply to write, or `None` when
    /// no reply is due (notification, or empty upstream body).
    ///
    /// Failures never escape: a malformed unit or upstream error becomes an
    /// error reply for this unit only, and the caller keeps serving later
    /// units.
    pub async fn dispatch(&self, unit: &str) -> Option<JsonRpcResponse> {
        self.metrics.record_unit();
        let correlation = Uuid::new_v4();

        let request: JsonRpcRequest = match serde_json::from_str(unit) {
            Ok(request) => request,
            Err(e) => {
                self.metrics.record_parse_failure();
                warn!(%correlation, error = %e, "rejecting malformed message unit");
                let error = BridgeError::InvalidRequest(e.to_string());
                return Some(JsonRpcResponse::error(None, error.to_error_detail()));
            }
        };

        debug!(
            %correlation,
            method = %request.method,
            notification = request.is_notification(),
            "dispatching message"
        );

        let outcome = self.relay.forward(&request).await;

        // Notifications never get a reply, whatever the upstream did.
        if request.is_notification() {
            if let Err(e) = outcome {
                self.metrics.record_upstream_failure();
                warn!(%correlation, error = %e, "notification delivery failed");
            }
            return None;
        }

        match outcome {
            Ok(response) => {
                let payload = normalize_body(response.content_type.as_deref(), &response.body);
                match classify_payload(payload) {
                    ReplyShape::Empty => {
                        debug!(%correlation, "empty upstream reply, nothing to emit");
                        None
                    }
                    ReplyShape::Full(mut reply) => {
                        // The caller correlates by the id it sent, not
                        // whatever the upstream stamped on its reply.
                        reply.id = request.id.clone();
                        Some(reply)
                    }
                    ReplyShape::Bare(value) => {
                        Some(JsonRpcResponse::result(request.id.clone(), value))
                    }
                }
            }
            Err(e) => {
                self.metrics.record_upstream_failure();
                warn!(%correlation, error = %e, "upstream delivery failed");
                Some(JsonRpcResponse::error(request.id.clone(), e.to_error_detail()))
            }
        }
    }
}
