//! Hub sequencer task and its cloneable handle.
//!
//! Every registry mutation and every broadcast travels as a [`HubCommand`]
//! over one bounded channel to a single task that owns the [`Registry`].
//! Callers therefore never observe a half-applied change, and operations
//! take effect in the order they were sent.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::registry::{EvictionReason, OutboundSender, Registry};
use crate::domain::{ConnectionId, Frame};
use crate::error::RelayError;

/// Messages processed by the hub sequencer.
#[derive(Debug)]
enum HubCommand {
    Register {
        id: ConnectionId,
        queue: OutboundSender,
    },
    Unregister {
        id: ConnectionId,
    },
    Broadcast {
        frame: Frame,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Shutdown {
        done: oneshot::Sender<usize>,
    },
}

/// Handle to the hub sequencer.
///
/// Cheap to clone. The sequencer stops after [`Hub::shutdown`] or once every
/// handle has been dropped; in both cases every outbound queue is closed.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// Starts the sequencer task and returns a handle to it.
    ///
    /// `command_capacity` bounds how many pending operations may queue up in
    /// front of the sequencer; callers wait when it is saturated.
    ///
    /// # Panics
    ///
    /// Panics if `command_capacity` is zero.
    #[must_use]
    pub fn spawn(command_capacity: usize) -> (Self, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(command_capacity);
        let task = tokio::spawn(run_sequencer(rx));
        (Self { commands }, task)
    }

    /// Adds a connection's outbound queue to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the sequencer has stopped.
    pub async fn register(&self, id: ConnectionId, queue: OutboundSender) -> Result<(), RelayError> {
        self.send(HubCommand::Register { id, queue }).await
    }

    /// Removes a connection and closes its queue.
    ///
    /// Idempotent: unknown or already-removed ids are ignored, and a stopped
    /// hub has already closed every queue, so this never fails.
    pub async fn unregister(&self, id: ConnectionId) {
        let _ = self.send(HubCommand::Unregister { id }).await;
    }

    /// Fans `frame` out to every registered connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the sequencer has stopped.
    pub async fn broadcast(&self, frame: Frame) -> Result<(), RelayError> {
        self.send(HubCommand::Broadcast { frame }).await
    }

    /// Returns the number of registered connections.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the sequencer has stopped.
    pub async fn connection_count(&self) -> Result<usize, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Count { reply }).await?;
        rx.await.map_err(|_| RelayError::HubClosed)
    }

    /// Closes every outbound queue and stops the sequencer.
    ///
    /// Returns the number of connections that were still registered.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::HubClosed`] if the sequencer had already stopped.
    pub async fn shutdown(&self) -> Result<usize, RelayError> {
        let (done, rx) = oneshot::channel();
        self.send(HubCommand::Shutdown { done }).await?;
        rx.await.map_err(|_| RelayError::HubClosed)
    }

    /// Returns `true` once the sequencer has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: HubCommand) -> Result<(), RelayError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RelayError::HubClosed)
    }
}

async fn run_sequencer(mut commands: mpsc::Receiver<HubCommand>) {
    let mut registry = Registry::new();
    tracing::debug!("hub sequencer started");

    while let Some(command) = commands.recv().await {
        match command {
            HubCommand::Register { id, queue } => {
                if registry.insert(id, queue) {
                    tracing::info!(connection_id = %id, connections = registry.len(), "connection registered");
                } else {
                    tracing::warn!(connection_id = %id, "connection already registered");
                }
            }
            HubCommand::Unregister { id } => {
                if registry.remove(id) {
                    tracing::info!(connection_id = %id, connections = registry.len(), "connection unregistered");
                }
            }
            HubCommand::Broadcast { frame } => {
                let report = registry.broadcast(&frame);
                for (id, reason) in &report.evicted {
                    match reason {
                        EvictionReason::SlowConsumer => {
                            tracing::warn!(connection_id = %id, "outbound queue full, evicting slow consumer");
                        }
                        EvictionReason::QueueClosed => {
                            tracing::debug!(connection_id = %id, "outbound queue closed, removing connection");
                        }
                    }
                }
                tracing::trace!(
                    bytes = frame.len(),
                    delivered = report.delivered,
                    evicted = report.evicted.len(),
                    "frame broadcast"
                );
            }
            HubCommand::Count { reply } => {
                let _ = reply.send(registry.len());
            }
            HubCommand::Shutdown { done } => {
                let closed = registry.clear();
                tracing::info!(closed, "hub shutting down");
                let _ = done.send(closed);
                break;
            }
        }
    }

    registry.clear();
    tracing::debug!("hub sequencer stopped");
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    async fn connect(hub: &Hub, capacity: usize) -> (ConnectionId, mpsc::Receiver<Frame>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(capacity);
        assert_ok!(hub.register(id, tx).await);
        (id, rx)
    }

    async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Option<Frame> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn register_then_broadcast_delivers() {
        let (hub, _task) = Hub::spawn(16);
        let (_, mut a) = connect(&hub, 8).await;
        let (_, mut b) = connect(&hub, 8).await;

        assert_ok!(hub.broadcast(Frame::text("hi")).await);

        assert_eq!(recv(&mut a).await, Some(Frame::text("hi")));
        assert_eq!(recv(&mut b).await, Some(Frame::text("hi")));
        assert_eq!(hub.connection_count().await.ok(), Some(2));
    }

    #[tokio::test]
    async fn concurrent_unregister_closes_once() {
        let (hub, _task) = Hub::spawn(16);
        let (id, mut rx) = connect(&hub, 8).await;

        let first = hub.clone();
        let second = hub.clone();
        tokio::join!(first.unregister(id), second.unregister(id));

        assert_eq!(recv(&mut rx).await, None);
        assert_eq!(hub.connection_count().await.ok(), Some(0));
    }

    #[tokio::test]
    async fn unregister_unknown_is_noop() {
        let (hub, _task) = Hub::spawn(4);
        hub.unregister(ConnectionId::new()).await;
        assert_eq!(hub.connection_count().await.ok(), Some(0));
    }

    #[tokio::test]
    async fn slow_consumer_does_not_block_others() {
        let (hub, _task) = Hub::spawn(16);
        let (slow, mut slow_rx) = connect(&hub, 1).await;
        let (_, mut fast_rx) = connect(&hub, 16).await;

        for i in 0..5 {
            assert_ok!(hub.broadcast(Frame::text(format!("m{i}"))).await);
        }

        for i in 0..5 {
            assert_eq!(recv(&mut fast_rx).await, Some(Frame::text(format!("m{i}"))));
        }
        assert_eq!(recv(&mut slow_rx).await, Some(Frame::text("m0")));
        assert_eq!(recv(&mut slow_rx).await, None);
        assert_eq!(hub.connection_count().await.ok(), Some(1));

        // Unregistering an evicted connection stays harmless.
        hub.unregister(slow).await;
        assert_eq!(hub.connection_count().await.ok(), Some(1));
    }

    #[tokio::test]
    async fn shutdown_closes_queues_and_rejects_later_calls() {
        let (hub, task) = Hub::spawn(8);
        let (_, mut rx) = connect(&hub, 4).await;

        assert_eq!(hub.shutdown().await.ok(), Some(1));
        assert_eq!(recv(&mut rx).await, None);
        assert_ok!(task.await);

        assert!(hub.is_closed());
        let (tx, _rx) = mpsc::channel(1);
        assert!(matches!(
            hub.register(ConnectionId::new(), tx).await,
            Err(RelayError::HubClosed)
        ));
        assert_err!(hub.broadcast(Frame::text("late")).await);
        hub.unregister(ConnectionId::new()).await;
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_sequencer() {
        let (hub, task) = Hub::spawn(8);
        let (_, mut rx) = connect(&hub, 4).await;
        drop(hub);

        assert_ok!(task.await);
        assert_eq!(recv(&mut rx).await, None);
    }
}
