//! # Cart Persistence
//!
//! Serializes the cart into one slot and rehydrates it on startup.
//!
//! ## Snapshot Format
//! ```json
//! {
//!   "version": 1,
//!   "createdAt": "2024-05-01T10:00:00Z",
//!   "items": [
//!     {
//!       "productId": "gid://shopify/Product/1",
//!       "variantId": "gid://shopify/ProductVariant/11",
//!       "title": "Barrel Sauna",
//!       "variantTitle": "Large",
//!       "price": { "amount": "999", "currencyCode": "USD" },
//!       "quantity": 3,
//!       "selectedOptions": [{ "name": "Size", "value": "Large" }],
//!       "imageUrl": null,
//!       "productHandle": "barrel-sauna",
//!       "addedAt": "2024-05-01T10:00:00Z"
//!     }
//!   ]
//! }
//! ```
//!
//! ## Failure Policy
//! Neither direction ever fails the caller:
//! - `save` logs a storage failure and returns; the cart lives on in memory
//! - `load` treats anything unreadable as "no previous cart"

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{Cart, LineItem, ValidationError, CART_SNAPSHOT_VERSION};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::storage::SlotStore;
use crate::error::StorageResult;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    version: u32,
    created_at: DateTime<Utc>,
    items: &'a [LineItem],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotIn {
    created_at: DateTime<Utc>,
    items: Vec<LineItem>,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Why a stored snapshot was rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not valid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("snapshot breaks cart rules: {0}")]
    Invalid(#[from] ValidationError),
}

/// Encodes a cart as a versioned snapshot.
pub fn encode_snapshot(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SnapshotOut {
        version: CART_SNAPSHOT_VERSION,
        created_at: cart.created_at(),
        items: cart.lines(),
    })
}

/// Decodes and validates a snapshot.
pub fn decode_snapshot(text: &str) -> Result<Cart, SnapshotError> {
    let header: VersionHeader = serde_json::from_str(text)?;
    if header.version != CART_SNAPSHOT_VERSION {
        return Err(SnapshotError::Version {
            found: header.version,
            expected: CART_SNAPSHOT_VERSION,
        });
    }

    let snapshot: SnapshotIn = serde_json::from_str(text)?;
    Ok(Cart::from_items(snapshot.items, snapshot.created_at)?)
}

/// Persistence adapter bound to one slot key.
#[derive(Debug, Clone)]
pub struct CartPersistence {
    store: Arc<dyn SlotStore>,
    key: String,
}

impl CartPersistence {
    pub fn new(store: Arc<dyn SlotStore>, key: impl Into<String>) -> Self {
        CartPersistence {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes the cart, returning the storage error instead of logging it.
    pub fn try_save(&self, cart: &Cart) -> StorageResult<()> {
        let json = encode_snapshot(cart)?;
        self.store.set(&self.key, &json)
    }

    /// Writes the cart. Failures are logged and dropped.
    pub fn save(&self, cart: &Cart) {
        match self.try_save(cart) {
            Ok(()) => debug!(key = %self.key, lines = cart.len(), "Cart saved"),
            Err(e) => warn!(
                key = %self.key,
                error = %e,
                "Failed to persist cart; continuing in memory"
            ),
        }
    }

    /// Reads the cart back. Missing, unreadable or invalid ⇒ empty cart.
    pub fn load(&self) -> Cart {
        let text = match self.store.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(key = %self.key, "No saved cart");
                return Cart::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read saved cart");
                return Cart::new();
            }
        };

        match decode_snapshot(&text) {
            Ok(cart) => {
                info!(key = %self.key, lines = cart.len(), "Cart restored");
                cart
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding corrupt saved cart");
                Cart::new()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemorySlotStore;
    use storefront_core::{LineItemInput, Money};

    const KEY: &str = "storefront-cart";

    fn populated() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(
            LineItemInput::new("P1", "V1", "Barrel Sauna", Money::parse("999", "USD").unwrap())
                .variant_title("Large")
                .option("Size", "Large")
                .option("Wood", "Cedar")
                .quantity(3),
        );
        cart.add_item(LineItemInput::new(
            "P2",
            "V2",
            "Bucket",
            Money::parse("49.5", "USD").unwrap(),
        ));
        cart
    }

    fn adapter() -> (Arc<MemorySlotStore>, CartPersistence) {
        let store = Arc::new(MemorySlotStore::new());
        let persistence = CartPersistence::new(store.clone(), KEY);
        (store, persistence)
    }

    #[test]
    fn test_round_trip() {
        let (_, persistence) = adapter();
        let cart = populated();

        persistence.save(&cart);
        let restored = persistence.load();

        assert_eq!(restored, cart);
        let options: Vec<&str> = restored.lines()[0]
            .selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(options, vec!["Large", "Cedar"]);
    }

    #[test]
    fn test_blank_variant_add_does_not_poison_saved_cart() {
        let (_, persistence) = adapter();
        let mut cart = populated();

        let change = cart.add_item(LineItemInput::new(
            "P3",
            "",
            "Mystery",
            Money::parse("5", "USD").unwrap(),
        ));
        assert_eq!(change, storefront_core::CartChange::Unchanged);

        persistence.save(&cart);
        let restored = persistence.load();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_missing_slot_loads_empty() {
        let (_, persistence) = adapter();
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_corrupt_snapshots_load_empty() {
        let (store, persistence) = adapter();
        let corrupt = [
            "not json at all",
            "[1, 2, 3]",
            r#"{"version": 1}"#,
            r#"{"version": 99, "createdAt": "2024-05-01T10:00:00Z", "items": []}"#,
            r#"{"version": 1, "createdAt": "2024-05-01T10:00:00Z", "items": [{"variantId": 5}]}"#,
        ];

        for text in corrupt {
            store.insert_raw(KEY, text);
            assert!(persistence.load().is_empty(), "should reject: {}", text);
        }
    }

    #[test]
    fn test_snapshot_breaking_invariants_loads_empty() {
        let (store, persistence) = adapter();
        let cart = populated();
        let mut value: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&cart).unwrap()).unwrap();

        value["items"][0]["quantity"] = serde_json::json!(0);
        store.insert_raw(KEY, &value.to_string());
        assert!(persistence.load().is_empty());

        value["items"][0]["quantity"] = serde_json::json!(2);
        value["items"][0]["price"]["amount"] = serde_json::json!("-5");
        store.insert_raw(KEY, &value.to_string());
        assert!(persistence.load().is_empty());

        value["items"][0]["price"]["amount"] = serde_json::json!("5");
        value["items"][1]["variantId"] = serde_json::json!("V1");
        store.insert_raw(KEY, &value.to_string());
        assert!(matches!(
            decode_snapshot(&value.to_string()),
            Err(SnapshotError::Invalid(ValidationError::Duplicate { .. }))
        ));
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let (store, persistence) = adapter();
        store.fail_writes(true);

        persistence.save(&populated());
        assert!(persistence.try_save(&populated()).is_err());

        store.fail_writes(false);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_read_failure_loads_empty() {
        let (store, persistence) = adapter();
        persistence.save(&populated());
        store.fail_reads(true);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_version_field_written() {
        let json = encode_snapshot(&populated()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["items"][0]["price"]["amount"], "999");
    }
}
