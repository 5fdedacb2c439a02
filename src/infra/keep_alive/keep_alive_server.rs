//! Tiny HTTP endpoint that answers "online".
//!
//! Some hosting platforms put a process to sleep unless something answers on a
//! port. No bot data is exposed here.

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub const ONLINE_MESSAGE: &str = "The bot is online!";

struct KeepAliveState {
    start_time: Instant,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

fn router(start_time: Instant) -> Router {
    let state = Arc::new(KeepAliveState { start_time });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> &'static str {
    ONLINE_MESSAGE
}

async fn health(State(state): State<Arc<KeepAliveState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Serve the keep-alive routes until the task is dropped.
pub async fn run(addr: SocketAddr) -> Result<()> {
    let app = router(Instant::now());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Keep-alive server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_says_online() {
        assert_eq!(root().await, "The bot is online!");
    }

    #[tokio::test]
    async fn health_reports_online_status() {
        let state = Arc::new(KeepAliveState {
            start_time: Instant::now(),
        });

        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "online");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "online");
        assert!(json["uptime_secs"].is_u64());
    }

    #[tokio::test]
    async fn serves_on_an_ephemeral_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(Instant::now())).await;
        });

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with(ONLINE_MESSAGE));
    }
}
