//! WebSocket layer: upgrade handler, connection lifecycle, and the two pumps.
//!
//! Every client at `/ws` gets one [`Connection`] with two concurrently
//! running halves: the inbound pump reads and decodes client frames, the
//! outbound pump writes whatever the hub queues for it.

pub mod connection;
pub mod handler;
pub mod inbound;
pub mod outbound;

pub use connection::Connection;
pub use inbound::InboundExit;
pub use outbound::OutboundExit;
