//! # Storefront Cart
//!
//! The storefront's cart store: one cart per browser profile, persisted to a
//! durable slot and read by every UI surface.
//!
//! ## Module Organization
//! ```text
//! storefront/
//! ├── lib.rs          ◄─── You are here (AppContext, tracing setup)
//! ├── main.rs         ◄─── CLI front end
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── CartStore + shared CartState
//! │   ├── persistence.rs ◄─ Snapshot encode/decode, slot save/load
//! │   ├── storage.rs  ◄─── SlotStore trait, memory and SQLite slots
//! │   └── config.rs   ◄─── AppConfig (TOML + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart manipulation, checkout hand-off
//! │   ├── product.rs  ◄─── Catalog listing, add by handle
//! │   └── config.rs   ◄─── Config view
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    AppContext                                           │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │    AppConfig     │ │    CartState     │ │    Slot backend      │    │
//! │  │                  │ │                  │ │                      │    │
//! │  │  • Currency      │ │  • Cart lines    │ │  • Memory, or        │    │
//! │  │  • Cart key      │ │  • Totals        │ │  • SQLite + writer   │    │
//! │  │  • Shop domain   │ │  • Persistence   │ │    task              │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use storefront_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use error::{ApiResult, ConfigError};
use state::{
    ensure_parent_dir, AppConfig, CartPersistence, CartState, CartStore, MemorySlotStore,
    SlotStore, SqliteSlotStore, StorageBackend,
};

/// Where cart slots live for this process.
#[derive(Debug)]
enum SlotBackend {
    Memory(Arc<MemorySlotStore>),
    Sqlite {
        db: Database,
        store: Arc<SqliteSlotStore>,
    },
}

/// Everything a front end needs: config, the shared cart and its storage.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub cart: CartState,
    backend: SlotBackend,
}

impl AppContext {
    /// Opens storage and rehydrates the cart.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │  1. Pick backend from config (sqlite | memory)                          │
    /// │                                                                         │
    /// │  2. sqlite: resolve database path ─────────────────────────────────────►│
    /// │     • storage.database_path / STOREFRONT_DB_PATH, else                  │
    /// │     • Linux: ~/.local/share/storefront-cart/storefront.db               │
    /// │     • open pool (WAL), run migrations, load slot cache, start writer    │
    /// │                                                                         │
    /// │  3. Hydrate CartStore from the configured cart key                      │
    /// │     • missing / corrupt / old snapshot ──► empty cart                   │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn init(config: AppConfig) -> ApiResult<Self> {
        let backend = match config.storage.backend {
            StorageBackend::Memory => SlotBackend::Memory(Arc::new(MemorySlotStore::new())),
            StorageBackend::Sqlite => {
                let path = config.database_path().ok_or(ConfigError::NoPath)?;
                ensure_parent_dir(&path)?;
                info!(?path, "Database path determined");

                let db = Database::new(DbConfig::new(path)).await?;
                let store = Arc::new(SqliteSlotStore::open(&db).await?);
                SlotBackend::Sqlite { db, store }
            }
        };

        Ok(Self::with_backend(config, backend))
    }

    /// Context without durable storage. The cart lives as long as the process.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_backend(
            config,
            SlotBackend::Memory(Arc::new(MemorySlotStore::new())),
        )
    }

    fn with_backend(config: AppConfig, backend: SlotBackend) -> Self {
        let slots: Arc<dyn SlotStore> = match &backend {
            SlotBackend::Memory(store) => store.clone(),
            SlotBackend::Sqlite { store, .. } => store.clone(),
        };

        let persistence = CartPersistence::new(slots, config.cart.storage_key.clone());
        let cart = CartState::new(CartStore::hydrate(persistence, config.currency()));

        AppContext {
            config,
            cart,
            backend,
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self.backend {
            SlotBackend::Memory(_) => StorageBackend::Memory,
            SlotBackend::Sqlite { .. } => StorageBackend::Sqlite,
        }
    }

    /// Replaces the in-memory cart with what storage holds now.
    ///
    /// Last writer wins: local lines not yet seen by the other writer are
    /// dropped in favor of the stored snapshot.
    pub async fn reload(&self) -> ApiResult<()> {
        if let SlotBackend::Sqlite { store, .. } = &self.backend {
            store.refresh(&self.config.cart.storage_key).await?;
        }
        self.cart.with_cart_mut(|store| store.reload());
        Ok(())
    }

    /// Waits for queued slot writes. A no-op for memory storage.
    pub async fn flush(&self) -> ApiResult<()> {
        if let SlotBackend::Sqlite { store, .. } = &self.backend {
            store.flush().await?;
        }
        Ok(())
    }

    /// Writes everything queued, stops the writer and closes the database.
    pub async fn shutdown(self) -> ApiResult<()> {
        if let SlotBackend::Sqlite { db, store } = self.backend {
            store.shutdown().await?;
            db.close().await;
        }
        info!("Storefront cart shut down");
        Ok(())
    }
}

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Show trace for the app crate only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    log_subscriber(filter).init();
}

fn log_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}
