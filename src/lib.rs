//! # purchase-hub
//!
//! Real-time WebSocket fan-out hub for purchase events.
//!
//! Every frame a client sends is broadcast to all connected clients. Frames
//! that decode as a purchase (`{"user_id": string, "amount": number}`) are
//! also written to PostgreSQL and published to a Kafka topic. The three
//! effects are independent: a failing database or broker never holds up the
//! real-time channel, and one slow client is disconnected rather than
//! allowed to slow down everyone else.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket /ws)
//!     │
//!     ├── Inbound pump ──► EventSink ──┬── PostgreSQL (persistence/)
//!     │        │                       └── Kafka      (broker/)
//!     │        ▼
//!     │   Hub sequencer (hub/) ◄── Heartbeat (service/)
//!     │        │
//!     └── Outbound pump ◄── bounded queue per connection
//! ```

pub mod api;
pub mod app_state;
pub mod broker;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod persistence;
pub mod router;
pub mod service;
pub mod ws;
