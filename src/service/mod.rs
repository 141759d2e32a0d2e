//! Service layer: downstream effects of decoded events and server-driven broadcasts.
//!
//! [`EventSink`] persists and publishes purchases; [`spawn_heartbeat`]
//! injects periodic server-time frames into the hub.

pub mod event_sink;
pub mod heartbeat;

pub use event_sink::{EffectStatus, EventSink, SinkReport};
pub use heartbeat::spawn_heartbeat;
