//! Live connection registry.
//!
//! [`Registry`] maps each [`ConnectionId`] to the sending half of that
//! connection's bounded outbound queue. It is owned by exactly one task, the
//! hub sequencer, so it needs no locking of its own.
//!
//! A connection is present iff its queue is open: removing an entry drops the
//! only sender, which closes the queue. Because removal goes through
//! `HashMap::remove`, each queue is closed at most once no matter how many
//! times removal is requested.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{ConnectionId, Frame};

/// Sending half of a connection's outbound queue.
pub type OutboundSender = mpsc::Sender<Frame>;

/// Why a connection was dropped during a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The outbound queue was full: the client is not keeping up.
    SlowConsumer,
    /// The outbound pump had already gone away.
    QueueClosed,
}

/// Result of fanning one frame out to every registered connection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of queues that accepted the frame.
    pub delivered: usize,
    /// Connections removed during this broadcast.
    pub evicted: Vec<(ConnectionId, EvictionReason)>,
}

/// Set of live connections keyed by identity.
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ConnectionId, OutboundSender>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. Returns `false` (and keeps the existing entry) if
    /// the id is already registered.
    pub fn insert(&mut self, id: ConnectionId, queue: OutboundSender) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(id, queue);
        true
    }

    /// Removes a connection and closes its queue. Returns `true` only for the
    /// call that actually removed it.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Offers `frame` to every registered queue without waiting.
    ///
    /// A full or closed queue gets its connection evicted instead of
    /// stalling delivery to everyone else.
    pub fn broadcast(&mut self, frame: &Frame) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (id, queue) in &self.connections {
            match queue.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.evicted.push((*id, EvictionReason::SlowConsumer));
                }
                Err(TrySendError::Closed(_)) => {
                    report.evicted.push((*id, EvictionReason::QueueClosed));
                }
            }
        }

        for (id, _) in &report.evicted {
            self.connections.remove(id);
        }

        report
    }

    /// Removes every connection, closing all queues. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.connections.len();
        self.connections.clear();
        count
    }

    /// Returns `true` if the connection is registered.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
