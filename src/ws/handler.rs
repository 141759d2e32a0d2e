//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};

use super::connection::Connection;
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /ws`: upgrade the HTTP connection to a WebSocket.
///
/// # Errors
///
/// Returns [`RelayError::HubClosed`] (503) if the hub is shutting down.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    if state.hub.is_closed() {
        return Err(RelayError::HubClosed);
    }
    Ok(ws.on_upgrade(move |socket| serve_socket(socket, state)).into_response())
}

async fn serve_socket(mut socket: WebSocket, state: AppState) {
    let connection =
        match Connection::open(state.hub, state.sink, state.outbound_capacity).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting websocket connection");
                let _ = socket.close().await;
                return;
            }
        };
    tracing::debug!(connection_id = %connection.id(), "websocket connection accepted");

    let (writer, reader) = socket.split();
    let _ = connection.serve(reader, writer).await;
}
