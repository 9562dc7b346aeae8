//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────┐     ┌──────────────────┐    │
//! │  │  CartState   │────►│    CartStore     │────►│ CartPersistence  │    │
//! │  │  Arc<Mutex<  │     │  Cart + default  │     │  snapshot JSON   │    │
//! │  │  CartStore>> │     │  currency        │     │  one slot key    │    │
//! │  └──────────────┘     └──────────────────┘     └────────┬─────────┘    │
//! │                                                         │              │
//! │                                          ┌──────────────┴───────────┐  │
//! │                                          ▼                          ▼  │
//! │                                 MemorySlotStore          SqliteSlotStore│
//! │                                                         (write-behind) │
//! │                                                                         │
//! │  AppConfig: read-only after startup                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod persistence;
mod storage;

pub use cart::{CartState, CartStore};
pub use config::{
    ensure_parent_dir, AppConfig, CartSettings, StorageBackend, StorageSettings, StoreSettings,
    CONFIG_FILE_NAME, DATABASE_FILE_NAME,
};
pub use persistence::{decode_snapshot, encode_snapshot, CartPersistence, SnapshotError};
pub use storage::{MemorySlotStore, SlotStore, SqliteSlotStore};
