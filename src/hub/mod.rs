//! Broadcast hub: the registry of live connections and its sequencer.
//!
//! The [`Registry`] holds the outbound queue of every live connection. It is
//! owned by a single sequencer task; everything else talks to it through the
//! cloneable [`Hub`] handle.

pub mod handle;
pub mod registry;

pub use handle::Hub;
pub use registry::{BroadcastReport, EvictionReason, OutboundSender, Registry};
