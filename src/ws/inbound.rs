//! Inbound pump: transport → event sink + hub.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use tokio::sync::oneshot;

use crate::domain::{ConnectionId, Frame, Purchase};
use crate::hub::Hub;
use crate::service::EventSink;

/// Why the inbound pump stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundExit {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// Reading from the transport failed.
    TransportError,
    /// The hub stopped accepting broadcasts.
    HubClosed,
    /// The outbound pump finished, so the session is over.
    WriterStopped,
}

/// Reads frames from `reader` until the session ends.
///
/// Each data frame is decoded as a [`Purchase`]. Malformed frames are logged
/// and skipped; the session stays open. A valid purchase is handed to `sink`
/// on a background task and the original frame is broadcast through `hub`.
///
/// On exit the connection is always unregistered from the hub.
pub async fn run_inbound<R, E>(
    id: ConnectionId,
    mut reader: R,
    hub: &Hub,
    sink: &EventSink,
    mut stop: oneshot::Receiver<()>,
) -> InboundExit
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let exit = loop {
        let next = tokio::select! {
            biased;
            _ = &mut stop => break InboundExit::WriterStopped,
            next = reader.next() => next,
        };

        let message = match next {
            Some(Ok(Message::Close(_))) | None => break InboundExit::PeerClosed,
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                tracing::debug!(connection_id = %id, error = %e, "websocket read failed");
                break InboundExit::TransportError;
            }
        };

        let Some(frame) = Frame::from_message(message) else {
            continue;
        };

        match Purchase::decode(frame.as_bytes()) {
            Ok(purchase) => {
                tracing::debug!(
                    connection_id = %id,
                    user_id = %purchase.user_id,
                    amount = purchase.amount,
                    "purchase received"
                );
                drop(sink.dispatch(purchase));
            }
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "discarding malformed frame");
                continue;
            }
        }

        if hub.broadcast(frame).await.is_err() {
            break InboundExit::HubClosed;
        }
    };

    hub.unregister(id).await;
    exit
}
