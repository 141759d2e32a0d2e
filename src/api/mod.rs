//! REST API layer: operational endpoints, DTOs, and the OpenAPI document.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the REST endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(handlers::system::health_handler, handlers::system::stats_handler),
    components(schemas(
        dto::HealthResponse,
        dto::StatsResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody
    )),
    tags((name = "System", description = "Health and hub statistics"))
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
