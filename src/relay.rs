use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::metrics::BridgeMetrics;
use crate::protocol::JsonRpcRequest;

/// Header carrying the upstream session token in both directions.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Raw upstream response, handed to the normalizer untouched. The body is
/// deliberately NOT JSON-parsed here: the same text must be routed to either
/// the JSON path or the event-stream path based on the content type.
#[derive(Debug)]
pub struct RelayResponse {
    pub content_type: Option<String>,
    pub body: String,
}

/// Delivers JSON-RPC messages to the upstream endpoint.
///
/// Owns the immutable per-process HTTP client plus the one mutable cell of
/// the whole bridge: the session token, promoted at most once from the first
/// non-empty `mcp-session-id` response header and attached to every
/// subsequent call.
pub struct HttpRelay {
    client: Client,
    config: BridgeConfig,
    session: ArcSwapOption<String>,
    metrics: Option<Arc<BridgeMetrics>>,
}

impl HttpRelay {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout());
        if !config.tls_verify {
            warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().map_err(|e| {
            BridgeError::ConfigError(format!("Failed to create HTTP client: {}", e))
        })?;

        let session = ArcSwapOption::from(config.session_id.clone().map(Arc::new));

        Ok(Self {
            client,
            config,
            session,
            metrics: None,
        })
    }

    /// Record retry attempts on the given counters.
    pub fn with_metrics(mut self, metrics: Arc<BridgeMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Currently held session token, if any.
    pub fn session_id(&self) -> Option<Arc<String>> {
        self.session.load_full()
    }

    /// Deliver one message, retrying transient failures.
    ///
    /// `max_retries` is the TOTAL attempt count. Backoff is linear: the delay
    /// before attempt N (N >= 2) is `retry_base * (N - 1)`, with no delay
    /// before the first attempt. HTTP 4xx fails immediately; 5xx and
    /// network-class failures retry until attempts run out, after which the
    /// last observed failure surfaces.
    pub async fn forward(&self, request: &JsonRpcRequest) -> Result<RelayResponse> {
        let body = serde_json::to_string(request)?;
        let total = self.config.max_retries;

        for attempt in 1..=total {
            if attempt > 1 {
                let delay = self.config.retry_base() * (attempt - 1);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&body).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_retryable() || attempt == total {
                        return Err(e);
                    }
                    if let Some(metrics) = &self.metrics {
                        metrics.record_retry();
                    }
                    warn!(
                        attempt,
                        max_retries = total,
                        error = %e,
                        "upstream attempt failed, retrying"
                    );
                }
            }
        }

        // max_retries is validated to be at least 1, so the loop always
        // returns; this is the formal fallback.
        Err(BridgeError::Transport("retry attempts exhausted".to_string()))
    }

    async fn send_once(&self, body: &str) -> Result<RelayResponse> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.auth_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json, text/event-stream")
            .body(body.to_string());

        if let Some(session) = self.session.load_full() {
            request = request.header(SESSION_HEADER, session.as_str());
        }

        let response = request.send().await.map_err(Self::classify_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), "upstream responded");

        if !status.is_success() {
            return Err(BridgeError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        self.adopt_session(response.headers());

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(Self::classify_error)?;

        Ok(RelayResponse { content_type, body })
    }

    /// Promote the session header to the process-wide token, at most once.
    /// Concurrent dispatches may race here; the first store wins and later
    /// ones are no-ops.
    fn adopt_session(&self, headers: &HeaderMap) {
        if self.session.load().is_some() {
            return;
        }

        let Some(value) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
            return;
        };
        if value.is_empty() {
            return;
        }

        let prev = self
            .session
            .compare_and_swap(std::ptr::null::<String>(), Some(Arc::new(value.to_string())));
        if prev.is_none() {
            info!(session_id = %value, "adopted upstream session id");
        }
    }

    fn classify_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout
        } else if error.is_connect() {
            BridgeError::ConnectionRefused
        } else {
            BridgeError::Transport(error.to_string())
        }
    }
}
