//! API server lifecycle — bind, spawn, graceful shutdown.
//!
//! Pattern: bind the listener, spawn `axum::serve` on a background task,
//! return a handle holding the shutdown channel. A second background task
//! sweeps expired rate-limit windows so the table can't grow unbounded
//! under churning keys.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Sweep cadence for expired rate-limit records.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    sweep_task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
        if let Some(task) = self.sweep_task.take() {
            task.abort();
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start the API server on the given address.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server on {addr}: {e}"))?;

    let bound = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    tracing::info!(addr = %bound, "API server binding");

    let app = api_router(ctx.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(addr = %bound, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    // Periodic sweep of expired rate-limit windows. The lock is held only
    // for the in-memory retain, never across an await.
    let limiter = ctx.rate_limiter.clone();
    let sweep_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            match limiter.lock() {
                Ok(mut limiter) => limiter.sweep(),
                Err(_) => {
                    tracing::error!("rate limiter lock poisoned; sweep task exiting");
                    break;
                }
            }
        }
    });

    Ok(ApiServer {
        addr: bound,
        shutdown_tx: Some(shutdown_tx),
        sweep_task: Some(sweep_task),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::AppConfig;
    use crate::model::MockModelClient;
    use crate::storage::{MockLogStore, MockObjectStore};

    fn test_ctx() -> ApiContext {
        ApiContext::new(
            AppConfig {
                api_keys: "test-key".into(),
                ..AppConfig::default()
            },
            Arc::new(MockModelClient::new("{}")),
            Arc::new(MockModelClient::new("{}")),
            Arc::new(MockObjectStore::new()),
            Arc::new(MockLogStore::new()),
        )
    }

    fn localhost() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let mut server = start_server(test_ctx(), localhost())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/api/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn external_route_rejects_without_key_over_http() {
        let mut server = start_server(test_ctx(), localhost())
            .await
            .expect("server should start");

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{}/api/v1/ocr-invoice", server.addr))
            .header("Content-Type", "application/json")
            .body(r#"{"image": "aGVsbG8="}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_server(test_ctx(), localhost())
            .await
            .expect("server should start");
        server.shutdown();
        server.shutdown();
    }
}
