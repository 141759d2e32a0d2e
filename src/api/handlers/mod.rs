//! REST endpoint handlers.

pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all versioned routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(system::api_routes())
}
