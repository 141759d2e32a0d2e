//! Publishing boundary for the event log.

use async_trait::async_trait;

use crate::error::RelayError;

/// Append-only, topic-addressed message bus.
#[async_trait]
pub trait EventPublisher: Send + Sync + std::fmt::Debug {
    /// Publishes one message to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Publish`] if the broker rejects the message or
    /// cannot be reached.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), RelayError>;
}
