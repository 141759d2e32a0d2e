//! Domain layer: connection identity, broadcast frames, and purchase events.

pub mod connection_id;
pub mod frame;
pub mod purchase;

pub use connection_id::ConnectionId;
pub use frame::Frame;
pub use purchase::Purchase;
