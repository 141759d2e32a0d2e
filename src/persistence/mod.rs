//! Persistence layer: append-only purchase records in PostgreSQL.
//!
//! [`PurchaseStore`] is the boundary the event sink writes through. The
//! concrete implementation uses `sqlx::PgPool` for async PostgreSQL access.

pub mod models;
pub mod postgres;
pub mod store;

pub use models::StoredPurchase;
pub use postgres::PostgresPurchaseStore;
pub use store::PurchaseStore;
