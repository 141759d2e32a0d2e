//! WebSocket connection lifecycle.
//!
//! A [`Connection`] is created when a socket is accepted and registered with
//! the hub straight away. [`Connection::serve`] then runs the inbound and
//! outbound pumps side by side and only returns once both have finished, so
//! nothing outlives the session that started it.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use tokio::sync::{mpsc, oneshot};

use super::inbound::{InboundExit, run_inbound};
use super::outbound::{OutboundExit, run_outbound};
use crate::domain::{ConnectionId, Frame};
use crate::error::RelayError;
use crate::hub::Hub;
use crate::service::EventSink;

/// One accepted, registered client session.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    hub: Hub,
    sink: EventSink,
    queue: mpsc::Receiver<Frame>,
}

impl Connection {
    /// Creates the outbound queue and registers it with the hub.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the hub no longer accepts
    /// connections.
    ///
    /// # Panics
    ///
    /// Panics if `outbound_capacity` is zero.
    pub async fn open(
        hub: Hub,
        sink: EventSink,
        outbound_capacity: usize,
    ) -> Result<Self, RelayError> {
        let id = ConnectionId::new();
        let (sender, queue) = mpsc::channel(outbound_capacity);
        hub.register(id, sender).await?;
        Ok(Self {
            id,
            hub,
            sink,
            queue,
        })
    }

    /// Returns the connection's identity.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Runs both pumps until the session ends.
    ///
    /// The inbound pump owns `reader`, the outbound pump owns `writer`. When
    /// the outbound pump finishes it tells the inbound pump to stop reading.
    pub async fn serve<R, W, E>(self, reader: R, writer: W) -> (InboundExit, OutboundExit)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
        W: Sink<Message> + Unpin,
        W::Error: Display,
    {
        let Self {
            id,
            hub,
            sink,
            queue,
        } = self;
        let (stop_tx, stop_rx) = oneshot::channel();
        let hub_ref = &hub;

        let outbound = async move {
            let exit = run_outbound(id, queue, writer, hub_ref).await;
            let _ = stop_tx.send(());
            exit
        };
        let inbound = run_inbound(id, reader, hub_ref, &sink, stop_rx);

        let (inbound_exit, outbound_exit) = tokio::join!(inbound, outbound);
        tracing::info!(
            connection_id = %id,
            inbound = ?inbound_exit,
            outbound = ?outbound_exit,
            "connection closed"
        );
        (inbound_exit, outbound_exit)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::convert::Infallible;
    use std::time::Duration;

    use futures_util::{sink, stream};

    use super::*;

    type Inbound = Result<Message, Infallible>;

    fn channel_reader(rx: mpsc::UnboundedReceiver<Inbound>) -> impl Stream<Item = Inbound> + Unpin {
        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }))
    }

    fn channel_writer() -> (
        impl Sink<Message, Error = Infallible> + Unpin,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = Box::pin(sink::unfold(tx, |tx, msg: Message| async move {
            let _ = tx.send(msg);
            Ok::<_, Infallible>(tx)
        }));
        (writer, rx)
    }

    async fn next_text(rx: &mut mpsc::UnboundedReceiver<Message>) -> Option<String> {
        match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
            Ok(Some(Message::Text(t))) => Some(t.as_str().to_string()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn open_fails_when_hub_closed() {
        let (hub, _task) = Hub::spawn(4);
        let _ = hub.shutdown().await;
        let result = Connection::open(hub, EventSink::disabled(), 8).await;
        assert!(matches!(result, Err(RelayError::HubClosed)));
    }

    #[tokio::test]
    async fn peers_exchange_frames_and_teardown_joins_both_pumps() {
        let (hub, _task) = Hub::spawn(16);

        let Ok(a) = Connection::open(hub.clone(), EventSink::disabled(), 8).await else {
            panic!("open a");
        };
        let Ok(b) = Connection::open(hub.clone(), EventSink::disabled(), 8).await else {
            panic!("open b");
        };
        assert_ne!(a.id(), b.id());

        let (a_in, a_reader) = mpsc::unbounded_channel();
        let (b_in, b_reader) = mpsc::unbounded_channel();
        let (a_writer, mut a_out) = channel_writer();
        let (b_writer, mut b_out) = channel_writer();

        let a_task = tokio::spawn(a.serve(channel_reader(a_reader), a_writer));
        let b_task = tokio::spawn(b.serve(channel_reader(b_reader), b_writer));

        let payload = r#"{"user_id":"u1","amount":5}"#;
        let _ = a_in.send(Ok(Message::text(payload.to_string())));

        assert_eq!(next_text(&mut a_out).await.as_deref(), Some(payload));
        assert_eq!(next_text(&mut b_out).await.as_deref(), Some(payload));

        // Peer A hangs up: its pumps end and B keeps working.
        drop(a_in);
        let Ok(Ok((inbound, outbound))) = tokio::time::timeout(Duration::from_secs(1), a_task).await
        else {
            panic!("connection a did not finish");
        };
        assert_eq!(inbound, InboundExit::PeerClosed);
        assert_eq!(outbound, OutboundExit::Drained);
        assert_eq!(hub.connection_count().await.ok(), Some(1));

        let _ = hub.broadcast(Frame::text("still there")).await;
        assert_eq!(next_text(&mut b_out).await.as_deref(), Some("still there"));

        // Hub shutdown closes B's queue; the writer ends and stops the reader.
        let _ = hub.shutdown().await;
        let Ok(Ok((inbound, outbound))) = tokio::time::timeout(Duration::from_secs(1), b_task).await
        else {
            panic!("connection b did not finish");
        };
        assert_eq!(inbound, InboundExit::WriterStopped);
        assert_eq!(outbound, OutboundExit::Drained);
        drop(b_in);
    }
}
