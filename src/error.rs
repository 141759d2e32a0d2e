//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the service. Most variants
//! never leave the connection or event they belong to: the pumps and the
//! event sink log them and carry on. Only the operational HTTP endpoints
//! turn them into structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3002,
///     "message": "hub is closed"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category      | HTTP Status               |
/// |-----------|---------------|---------------------------|
/// | 1000–1999 | Input         | 400 Bad Request           |
/// | 2000–2999 | Downstream    | 502 Bad Gateway           |
/// | 3000–3999 | Server        | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The hub sequencer has stopped; no further register or broadcast is possible.
    #[error("hub is closed")]
    HubClosed,

    /// A client frame could not be decoded as a purchase.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Writing to the purchase store failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Publishing to the event log failed.
    #[error("publish error: {0}")]
    Publish(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedEvent(_) => 1001,
            Self::Persistence(_) => 2001,
            Self::Publish(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Config(_) => 3001,
            Self::HubClosed => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_) | Self::Publish(_) => StatusCode::BAD_GATEWAY,
            Self::HubClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<rskafka::client::error::Error> for RelayError {
    fn from(e: rskafka::client::error::Error) -> Self {
        Self::Publish(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_closed_maps_to_service_unavailable() {
        let err = RelayError::HubClosed;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 3002);
        assert_eq!(err.to_string(), "hub is closed");
    }

    #[test]
    fn sink_errors_map_to_bad_gateway() {
        assert_eq!(
            RelayError::Persistence("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::Publish("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn into_response_sets_status() {
        let response = RelayError::MalformedEvent("eof".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
