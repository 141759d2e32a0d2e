//! System endpoints: health check and hub statistics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{HealthResponse, StatsResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `GET /health`: service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /api/v1/stats`: live connection count.
///
/// # Errors
///
/// Returns [`RelayError::HubClosed`] if the hub is shutting down.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "System",
    summary = "Hub statistics",
    description = "Returns the number of WebSocket connections currently registered with the hub.",
    responses(
        (status = 200, description = "Current hub statistics", body = StatsResponse),
        (status = 503, description = "Hub is shutting down", body = ErrorResponse),
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> Result<impl IntoResponse, RelayError> {
    let connections = state.hub.connection_count().await?;
    Ok((StatusCode::OK, Json(StatsResponse { connections })))
}

/// Versioned routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats_handler))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::hub::Hub;
    use crate::service::EventSink;

    fn app(hub: Hub) -> Router {
        Router::new()
            .merge(routes())
            .nest("/api/v1", api_routes())
            .with_state(AppState {
                hub,
                sink: EventSink::disabled(),
                outbound_capacity: 4,
            })
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body");
        };
        let Ok(json) = serde_json::from_slice(&bytes) else {
            panic!("json body");
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (hub, _task) = Hub::spawn(4);
        let (status, body) = fetch(app(hub), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn stats_counts_connections() {
        let (hub, _task) = Hub::spawn(4);
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let _ = hub.register(crate::domain::ConnectionId::new(), tx).await;

        let (status, body) = fetch(app(hub), "/api/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connections"], 1);
    }

    #[tokio::test]
    async fn stats_after_shutdown_is_unavailable() {
        let (hub, _task) = Hub::spawn(4);
        let _ = hub.shutdown().await;

        let (status, body) = fetch(app(hub), "/api/v1/stats").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], 3002);
    }
}
