//! Database models for persisted purchases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored row from the `purchases` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPurchase {
    /// Auto-increment row ID.
    pub id: i64,
    /// Purchasing user.
    pub user_id: String,
    /// Purchase amount.
    pub amount: f64,
    /// Server-side timestamp assigned at insert time.
    pub ts: DateTime<Utc>,
}
