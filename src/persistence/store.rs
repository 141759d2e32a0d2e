//! Storage boundary for purchases.

use async_trait::async_trait;

use super::StoredPurchase;
use crate::domain::Purchase;
use crate::error::RelayError;

/// Durable, append-only record set of purchases.
#[async_trait]
pub trait PurchaseStore: Send + Sync + std::fmt::Debug {
    /// Appends one purchase, stamping it with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] if the write fails.
    async fn insert(&self, purchase: &Purchase) -> Result<StoredPurchase, RelayError>;
}
