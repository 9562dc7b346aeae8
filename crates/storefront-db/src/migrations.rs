//! # Database Migrations
//!
//! Embedded SQL migrations for the slot database.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_slot_index.sql`)
//! 3. Use `IF NOT EXISTS` where possible
//! 4. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations. Safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("All migrations applied successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.slots().set("storefront-cart", "{}").await.unwrap();

        // Running again is a no-op and keeps existing rows.
        db.run_migrations().await.unwrap();
        assert_eq!(
            db.slots().get("storefront-cart").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
