//! Outbound pump: outbound queue → transport.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, Frame};
use crate::hub::Hub;

/// Why the outbound pump stopped writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundExit {
    /// The hub closed the queue and every queued frame was written.
    Drained,
    /// Writing to the transport failed.
    WriteFailed,
}

/// Writes queued frames to `writer` in FIFO order until the queue closes.
///
/// When the hub closes the queue, frames already queued are still written
/// before the pump exits. On a write failure the pump stops immediately and
/// asks the hub to unregister the connection, unless the hub had already
/// closed the queue. Either way the writer is closed on exit.
pub async fn run_outbound<W>(
    id: ConnectionId,
    mut queue: mpsc::Receiver<Frame>,
    mut writer: W,
    hub: &Hub,
) -> OutboundExit
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut exit = OutboundExit::Drained;

    while let Some(frame) = queue.recv().await {
        if let Err(e) = writer.send(frame.into_message()).await {
            tracing::debug!(connection_id = %id, error = %e, "websocket write failed");
            exit = OutboundExit::WriteFailed;
            break;
        }
    }

    if exit == OutboundExit::WriteFailed {
        let closed_by_hub = queue.is_closed();
        queue.close();
        if !closed_by_hub {
            hub.unregister(id).await;
        }
    }

    if let Err(e) = writer.close().await {
        tracing::debug!(connection_id = %id, error = %e, "websocket close failed");
    }

    exit
}
