//! Push/pull broadcast example
//!
//! Run with: cargo run --example broadcast
//!
//! One session ("user-1") with two consumers:
//! - a WebSocket-style consumer that holds a `pull_handle` stream open
//! - a long-poll style consumer that calls `pull_timeout` once per "request"
//!
//! Set `RUST_LOG=session_push=debug` to see registry events.

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use session_push::{RegistryConfig, RegistryError, SessionRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry: SessionRegistry<String, String, Bytes> =
        SessionRegistry::with_config(RegistryConfig::default().default_queue_depth(4));

    let session = registry.get_or_create("user-1".to_string()).await;

    // WebSocket-style: one stream per connection
    let ws_client = session.new_client("browser-tab".to_string()).await;
    let mut ws_stream = ws_client.pull_handle().await?.into_stream();
    let ws_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            tracing::info!(client = "browser-tab", msg = ?msg, "ws frame");
        }
        tracing::info!(client = "browser-tab", "ws stream ended");
    });

    // Long-poll style: one pull per request, bounded by a timeout
    let poll_client = session.new_client("mobile".to_string()).await;
    let poll_task = tokio::spawn(async move {
        loop {
            match poll_client.pull_timeout(Duration::from_millis(500)).await {
                Ok(msg) => tracing::info!(client = "mobile", msg = ?msg, "poll response"),
                Err(RegistryError::Timeout(_)) => {
                    tracing::info!(client = "mobile", "poll timed out, client re-polls")
                }
                Err(e) => {
                    tracing::info!(client = "mobile", error = %e, "poll finished");
                    break;
                }
            }
        }
    });

    for i in 0..3 {
        let outcome = session.push(Bytes::from(format!("notification {i}"))).await;
        tracing::info!(
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            "pushed"
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    tokio::time::sleep(Duration::from_millis(600)).await;

    session.close_all().await;
    ws_task.await?;
    poll_task.await?;

    let stats = session.stats().await;
    tracing::info!(?stats, "session stats");

    session.delete_self().await;
    Ok(())
}
