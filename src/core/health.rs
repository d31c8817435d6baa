//! Liveness endpoint for container platforms
//!
//! Exposes `/health` (JSON with uptime) and `/` on `HEALTH_PORT`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Application state for the health server
#[derive(Clone)]
struct AppState {
    start_time: Instant,
}

/// Builds the router; split out so tests can drive it without a socket.
fn router(start_time: Instant) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .with_state(Arc::new(AppState { start_time }))
}

/// Start the health HTTP server
///
/// # Arguments
/// * `port` - Port to listen on
pub async fn start_health_server(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting health server on http://{}", addr);
    log::info!("  /health  - Health check (liveness)");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router(Instant::now())).await?;

    Ok(())
}

/// Handler for /health endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed();

    let health_status = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": uptime.as_secs(),
        "uptime_human": format_uptime(uptime),
        "service": "cloudtune-bot",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, axum::Json(health_status))
}

async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, "cloudtune bot is running")
}

/// Format duration as human-readable string
fn format_uptime(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(30)), "30s");
        assert_eq!(format_uptime(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_uptime(Duration::from_secs(3665)), "1h 1m 5s");
        assert_eq!(format_uptime(Duration::from_secs(90061)), "1d 1h 1m 1s");
    }

    #[tokio::test]
    async fn test_health_server_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(Instant::now())).await;
        });

        let body = reqwest::get(format!("http://{}/health", addr))
            .await
            .expect("request")
            .json::<serde_json::Value>()
            .await
            .expect("json body");
        assert_eq!(body["status"], "healthy");
    }
}
