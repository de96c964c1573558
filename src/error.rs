use serde_json::Value;
use thiserror::Error;

use crate::protocol::ErrorDetail;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Service unavailable - connection refused")]
    ConnectionRefused,

    #[error("Service timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BridgeError {
    /// JSON-RPC error code for this failure. HTTP-level failures share the
    /// -32000 application code; network-class failures get their own codes so
    /// callers can distinguish "endpoint down" from "endpoint slow".
    pub fn code(&self) -> i64 {
        match self {
            BridgeError::InvalidRequest(_) => -32700,
            BridgeError::HttpStatus { .. } => -32000,
            BridgeError::ConnectionRefused => -32001,
            BridgeError::Timeout => -32002,
            _ => -32603,
        }
    }

    /// Whether the relay may retry after this failure. HTTP 4xx is a
    /// definitive upstream verdict; everything network-shaped (and 5xx) is
    /// transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::HttpStatus { status, .. } => *status >= 500,
            BridgeError::ConnectionRefused | BridgeError::Timeout | BridgeError::Transport(_) => {
                true
            }
            _ => false,
        }
    }

    /// Convert into the error object carried on an outbound reply.
    pub fn to_error_detail(&self) -> ErrorDetail {
        match self {
            BridgeError::InvalidRequest(detail) => ErrorDetail {
                code: -32700,
                message: "Invalid JSON-RPC request".to_string(),
                data: Some(Value::String(detail.clone())),
            },
            BridgeError::HttpStatus { status, reason } => ErrorDetail {
                code: -32000,
                message: format!("HTTP {}: {}", status, reason),
                data: None,
            },
            BridgeError::ConnectionRefused => ErrorDetail {
                code: -32001,
                message: "Service unavailable - connection refused".to_string(),
                data: None,
            },
            BridgeError::Timeout => ErrorDetail {
                code: -32002,
                message: "Service timeout".to_string(),
                data: None,
            },
            other => ErrorDetail {
                code: -32603,
                message: other.to_string(),
                data: None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
