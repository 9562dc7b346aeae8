//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqliteSlotStore (app)                                                  │
//! │       │                                                                 │
//! │       │  db.slots().set("storefront-cart", json)                        │
//! │       ▼                                                                 │
//! │  SlotRepository                                                         │
//! │  ├── get(&self, key)                                                    │
//! │  ├── set(&self, key, value)                                             │
//! │  ├── delete(&self, key)                                                 │
//! │  └── all(&self)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (cart_slots)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SlotRepository`](slot::SlotRepository) - Durable key/value slots

pub mod slot;
