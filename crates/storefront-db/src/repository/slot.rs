//! # Slot Repository
//!
//! Durable string key/value slots. The value is opaque here; the app decides
//! what goes in it (a JSON cart snapshot).
//!
//! ## Write Semantics
//! `set` is an upsert: the last write for a key wins.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// One stored slot.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Slot {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for slot operations.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: SqlitePool,
}

impl SlotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SlotRepository { pool }
    }

    /// Reads a slot's value, `None` if it was never written.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM cart_slots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes a slot, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing slot");

        sqlx::query(
            r#"
            INSERT INTO cart_slots (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every slot, ordered by key. Used to warm the in-memory slot cache.
    pub async fn all(&self) -> DbResult<Vec<Slot>> {
        let slots = sqlx::query_as::<_, Slot>(
            "SELECT key, value, updated_at FROM cart_slots ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
