//! Shared application state injected into all Axum handlers.

use crate::hub::Hub;
use crate::service::EventSink;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the broadcast hub.
    pub hub: Hub,
    /// Persist/publish adapter for decoded purchases.
    pub sink: EventSink,
    /// Capacity of each new connection's outbound queue.
    pub outbound_capacity: usize,
}
