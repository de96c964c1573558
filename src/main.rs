use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcp_bridge::bridge::run_bridge;
use mcp_bridge::config::BridgeConfig;
use mcp_bridge::dispatch::Dispatcher;
use mcp_bridge::error::BridgeError;
use mcp_bridge::metrics::BridgeMetrics;
use mcp_bridge::relay::HttpRelay;

/// Bridge a stdio MCP client to a streamable-HTTP MCP server.
#[derive(Parser, Debug)]
#[command(name = "mcp-bridge", version, about)]
struct Cli {
    /// Upstream endpoint URL
    #[arg(long, env = "MCP_BRIDGE_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token for the upstream endpoint
    #[arg(long, env = "MCP_BRIDGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Total delivery attempts per message
    #[arg(long)]
    max_retries: Option<u32>,

    /// Disable TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Pre-seed the upstream session id
    #[arg(long)]
    session_id: Option<String>,
}

impl Cli {
    fn into_config(self) -> mcp_bridge::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => {
                let endpoint = self.endpoint.clone().ok_or_else(|| {
                    BridgeError::ConfigError(
                        "--endpoint or MCP_BRIDGE_ENDPOINT is required".to_string(),
                    )
                })?;
                let token = self.token.clone().ok_or_else(|| {
                    BridgeError::ConfigError(
                        "--token or MCP_BRIDGE_TOKEN is required".to_string(),
                    )
                })?;
                BridgeConfig::new(endpoint, token)
            }
        };

        // Flags beat file values.
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(token) = self.token {
            config.auth_token = token;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if self.insecure {
            config.tls_verify = false;
        }
        if let Some(session_id) = self.session_id {
            config.session_id = Some(session_id);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // stdout carries protocol frames only; every diagnostic goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MCP_BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("mcp-bridge: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    info!(endpoint = %config.endpoint, "starting bridge");

    let metrics = Arc::new(BridgeMetrics::new());
    let relay = HttpRelay::new(config)?.with_metrics(Arc::clone(&metrics));
    let dispatcher = Arc::new(Dispatcher::new(relay, Arc::clone(&metrics)));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
        }
    });

    run_bridge(
        tokio::io::stdin(),
        tokio::io::stdout(),
        dispatcher,
        Arc::clone(&metrics),
        shutdown.clone(),
    )
    .await?;

    info!("{}", metrics.snapshot());
    if shutdown.is_cancelled() {
        eprintln!("mcp-bridge: shutting down");
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("received interrupt"),
                _ = terminate.recv() => info!("received terminate"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
