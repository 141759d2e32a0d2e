//! Kafka publisher built on `rskafka`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rskafka::client::ClientBuilder;
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::record::Record;

use super::EventPublisher;
use crate::error::RelayError;

/// Partition every record is produced to. Purchases carry no key, so there
/// is no ordering requirement that would call for spreading them.
const PARTITION: i32 = 0;

/// Publishes records to a single Kafka topic.
pub struct KafkaPublisher {
    brokers: Vec<String>,
    topic: String,
    partition: PartitionClient,
}

impl KafkaPublisher {
    /// Connects to the bootstrap `brokers` and opens a producer for `topic`.
    ///
    /// Waits up to `timeout` for the brokers to answer and for the topic to
    /// appear if the broker is still auto-creating it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Publish`] if no broker can be reached or the
    /// topic does not exist within `timeout`.
    pub async fn connect(
        brokers: Vec<String>,
        topic: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let topic = topic.into();
        let connecting = async {
            let client = ClientBuilder::new(brokers.clone()).build().await?;
            let partition = client
                .partition_client(topic.clone(), PARTITION, UnknownTopicHandling::Retry)
                .await?;
            Ok::<_, RelayError>(partition)
        };
        let partition = tokio::time::timeout(timeout, connecting)
            .await
            .map_err(|_| {
                RelayError::Publish(format!(
                    "no partition {PARTITION} of topic {topic} available after {timeout:?}"
                ))
            })??;
        tracing::info!(brokers = ?brokers, topic = %topic, "connected to kafka");

        Ok(Self {
            brokers,
            topic,
            partition,
        })
    }

    /// Returns the topic this publisher writes to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for KafkaPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaPublisher")
            .field("brokers", &self.brokers)
            .field("topic", &self.topic)
            .field("partition", &PARTITION)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), RelayError> {
        if topic != self.topic {
            return Err(RelayError::Publish(format!(
                "publisher is bound to topic {}, not {topic}",
                self.topic
            )));
        }

        let record = Record {
            key: None,
            value: Some(payload),
            headers: BTreeMap::new(),
            timestamp: Utc::now(),
        };
        let offsets = self
            .partition
            .produce(vec![record], Compression::NoCompression)
            .await?;
        tracing::debug!(topic = %self.topic, partition = PARTITION, offsets = ?offsets, "record published");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn connect_gives_up_after_timeout() {
        // Accepts TCP connections but never speaks Kafka.
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };

        let attempt = KafkaPublisher::connect(
            vec![addr.to_string()],
            "user_purchase",
            Duration::from_millis(200),
        );
        let Ok(result) = tokio::time::timeout(Duration::from_secs(5), attempt).await else {
            panic!("connect did not honour its timeout");
        };
        assert!(matches!(result, Err(RelayError::Publish(_))));
        drop(listener);
    }
}
