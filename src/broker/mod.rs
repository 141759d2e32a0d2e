//! Event log layer: publishing purchases to a Kafka topic.
//!
//! [`EventPublisher`] is the boundary the event sink publishes through;
//! [`KafkaPublisher`] speaks the Kafka wire protocol via `rskafka`.

pub mod kafka;
pub mod publisher;

pub use kafka::KafkaPublisher;
pub use publisher::EventPublisher;
