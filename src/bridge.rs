//! The bridge runtime: stdin framing, concurrent dispatch, and the single
//! output writer.
//!
//! stdout is the protocol channel. Nothing other than complete JSON-RPC
//! reply lines may be written to it; all diagnostics go to stderr via
//! `tracing`.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::framing::LineFramer;
use crate::metrics::BridgeMetrics;

const READ_CHUNK_SIZE: usize = 8192;
const WRITE_QUEUE_DEPTH: usize = 64;

/// Run the bridge over the given input and output streams until the input
/// ends or `shutdown` is cancelled.
///
/// Each framed unit is dispatched on its own task, so a slow or retrying
/// request never delays framing of later units; output order across
/// concurrent units is consequently not guaranteed. End of input drains
/// in-flight dispatches before returning; cancellation abandons them.
pub async fn run_bridge<R, W>(
    mut input: R,
    output: W,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<BridgeMetrics>,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(WRITE_QUEUE_DEPTH);
    let writer = tokio::spawn(write_loop(output, rx, metrics, shutdown.clone()));

    let mut framer = LineFramer::new();
    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested, abandoning in-flight requests");
                break;
            }
            read = input.read(&mut chunk) => match read {
                Ok(0) => {
                    if let Some(unit) = framer.finish() {
                        spawn_dispatch(&mut tasks, &dispatcher, &tx, unit);
                    }
                    debug!("input closed, draining in-flight requests");
                    drain(&mut tasks, &shutdown).await;
                    break;
                }
                Ok(n) => {
                    for unit in framer.feed(&chunk[..n]) {
                        spawn_dispatch(&mut tasks, &dispatcher, &tx, unit);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "input stream failed");
                    return Err(e.into());
                }
            },
        }
    }

    // Abandon whatever is still in flight (no-op after a clean drain), close
    // the write queue, and let the writer finish its backlog.
    tasks.abort_all();
    drop(tasks);
    drop(tx);
    let _ = writer.await;

    Ok(())
}

fn spawn_dispatch(
    tasks: &mut JoinSet<()>,
    dispatcher: &Arc<Dispatcher>,
    tx: &mpsc::Sender<String>,
    unit: String,
) {
    let dispatcher = Arc::clone(dispatcher);
    let tx = tx.clone();
    tasks.spawn(async move {
        if let Some(reply) = dispatcher.dispatch(&unit).await {
            match serde_json::to_string(&reply) {
                // The receiver only disappears on shutdown; the reply is
                // abandoned along with everything else then.
                Ok(line) => {
                    let _ = tx.send(line).await;
                }
                Err(e) => warn!(error = %e, "failed to serialize reply"),
            }
        }
    });
}

/// Wait for in-flight dispatches after end of input, still honoring
/// cancellation.
async fn drain(tasks: &mut JoinSet<()>, shutdown: &CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            joined = tasks.join_next() => {
                if joined.is_none() {
                    break;
                }
            }
        }
    }
}

/// Single writer task owning the output sink. One complete line per reply
/// keeps concurrent dispatches from interleaving partial writes. A failed
/// write means the downstream reader is gone, which shuts the whole bridge
/// down rather than erroring per-message.
async fn write_loop<W: AsyncWrite + Unpin>(
    mut output: W,
    mut rx: mpsc::Receiver<String>,
    metrics: Arc<BridgeMetrics>,
    shutdown: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = rx.recv() => match received {
                Some(line) => line,
                None => break,
            },
        };

        let written = async {
            output.write_all(line.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await
        }
        .await;

        match written {
            Ok(()) => metrics.record_response(),
            Err(e) => {
                warn!(error = %e, "output sink closed, shutting down");
                shutdown.cancel();
                break;
            }
        }
    }
}
