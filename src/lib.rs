//! # MCP Bridge
//!
//! A stdio ⇄ streamable-HTTP bridge for MCP JSON-RPC traffic.
//!
//! ## Overview
//!
//! The bridge reads line-delimited JSON-RPC 2.0 messages from stdin, relays
//! each one as an HTTP POST to a remote endpoint, and writes the normalized
//! reply back as a single line on stdout. It is content-agnostic: method
//! semantics live entirely upstream.
//!
//! The bridge handles:
//! - Incremental line framing over the raw input stream
//! - HTTP delivery with bounded linear-backoff retry
//! - Session continuity (`mcp-session-id` learned once, echoed thereafter)
//! - Response normalization: plain JSON, SSE event streams, and empty bodies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mcp_bridge::config::BridgeConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::new("https://mcp.example.com/rpc", "token");
//! config.validate()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and JSON-RPC code mapping
//! - [`protocol`] - JSON-RPC 2.0 envelope types
//! - [`framing`] - Line framer over the raw input stream
//! - [`relay`] - HTTP delivery, retry policy, session token
//! - [`sse`] - Event-stream body decoding
//! - [`normalize`] - Content-type routing and reply-shape classification
//! - [`dispatch`] - Per-message forwarding pipeline
//! - [`bridge`] - Runtime loop tying input, dispatch, and output together

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod framing;
pub mod metrics;
pub mod normalize;
pub mod protocol;
pub mod relay;
pub mod sse;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
