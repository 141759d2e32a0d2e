//! PostgreSQL implementation of the purchase store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{PurchaseStore, StoredPurchase};
use crate::config::RelayConfig;
use crate::domain::Purchase;
use crate::error::RelayError;

const CREATE_PURCHASES_TABLE: &str = "CREATE TABLE IF NOT EXISTS purchases (\
     id BIGSERIAL PRIMARY KEY, \
     user_id TEXT NOT NULL, \
     amount DOUBLE PRECISION NOT NULL, \
     ts TIMESTAMPTZ NOT NULL DEFAULT NOW())";

/// PostgreSQL-backed purchase store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPurchaseStore {
    pool: PgPool,
}

impl PostgresPurchaseStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError::Persistence`] if the database cannot be reached.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `purchases` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError::Persistence`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), RelayError> {
        sqlx::query(CREATE_PURCHASES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Closes the underlying connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PurchaseStore for PostgresPurchaseStore {
    async fn insert(&self, purchase: &Purchase) -> Result<StoredPurchase, RelayError> {
        let (id, user_id, amount, ts) = sqlx::query_as::<_, (i64, String, f64, DateTime<Utc>)>(
            "INSERT INTO purchases (user_id, amount, ts) VALUES ($1, $2, NOW()) \
             RETURNING id, user_id, amount, ts",
        )
        .bind(&purchase.user_id)
        .bind(purchase.amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(StoredPurchase {
            id,
            user_id,
            amount,
            ts,
        })
    }
}
