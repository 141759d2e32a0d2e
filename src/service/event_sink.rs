//! Event sink: persists and publishes decoded purchases.
//!
//! The two effects are independent. A failed insert does not stop the
//! publish, a failed publish does not undo the insert, and neither one
//! holds up the broadcast of the raw frame, which the inbound pump performs
//! regardless of what happens here.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::broker::EventPublisher;
use crate::domain::Purchase;
use crate::persistence::PurchaseStore;

/// Outcome of one downstream effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStatus {
    /// The effect completed.
    Completed,
    /// The effect was attempted and failed; the failure was logged.
    Failed,
    /// The sink is not configured.
    Disabled,
}

/// Per-event result of [`EventSink::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkReport {
    /// Outcome of the database insert.
    pub persisted: EffectStatus,
    /// Outcome of the event log publish.
    pub published: EffectStatus,
}

/// Fans a decoded purchase out to the store and the event log.
#[derive(Debug, Clone)]
pub struct EventSink {
    store: Option<Arc<dyn PurchaseStore>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    topic: String,
}

impl EventSink {
    /// Creates a sink. Pass `None` to disable either effect.
    #[must_use]
    pub fn new(
        store: Option<Arc<dyn PurchaseStore>>,
        publisher: Option<Arc<dyn EventPublisher>>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            store,
            publisher,
            topic: topic.into(),
        }
    }

    /// A sink with both effects disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, None, String::new())
    }

    /// Returns the topic purchases are published to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Records `purchase` on a background task so the caller can go on
    /// broadcasting immediately.
    pub fn dispatch(&self, purchase: Purchase) -> JoinHandle<SinkReport> {
        let sink = self.clone();
        tokio::spawn(async move { sink.record(&purchase).await })
    }

    /// Persists and publishes `purchase` concurrently, logging each failure.
    pub async fn record(&self, purchase: &Purchase) -> SinkReport {
        let (persisted, published) = tokio::join!(self.persist(purchase), self.publish(purchase));
        SinkReport {
            persisted,
            published,
        }
    }

    async fn persist(&self, purchase: &Purchase) -> EffectStatus {
        let Some(store) = &self.store else {
            return EffectStatus::Disabled;
        };
        match store.insert(purchase).await {
            Ok(row) => {
                tracing::info!(
                    id = row.id,
                    user_id = %row.user_id,
                    amount = row.amount,
                    "purchase persisted"
                );
                EffectStatus::Completed
            }
            Err(e) => {
                tracing::error!(
                    user_id = %purchase.user_id,
                    amount = purchase.amount,
                    error = %e,
                    "failed to persist purchase"
                );
                EffectStatus::Failed
            }
        }
    }

    async fn publish(&self, purchase: &Purchase) -> EffectStatus {
        let Some(publisher) = &self.publisher else {
            return EffectStatus::Disabled;
        };
        let result = match purchase.to_json_bytes() {
            Ok(payload) => publisher.publish(&self.topic, payload).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                tracing::info!(
                    topic = %self.topic,
                    user_id = %purchase.user_id,
                    amount = purchase.amount,
                    "purchase published"
                );
                EffectStatus::Completed
            }
            Err(e) => {
                tracing::error!(
                    topic = %self.topic,
                    user_id = %purchase.user_id,
                    error = %e,
                    "failed to publish purchase"
                );
                EffectStatus::Failed
            }
        }
    }
}
