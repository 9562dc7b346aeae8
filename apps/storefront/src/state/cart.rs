//! # Cart State
//!
//! `CartStore` is the single owner of the cart: every UI surface reads it and
//! every change goes through its four mutators. `CartState` is the shared,
//! lock-protected handle the command layer receives.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action               Command                 Cart State Change      │
//! │  ─────────               ───────                 ─────────────────      │
//! │                                                                         │
//! │  Add to cart ───────────► add_to_cart() ───────► add_item(input)        │
//! │                                                                         │
//! │  Quantity stepper ──────► update_cart_item() ──► update_quantity(v, n)  │
//! │                                                                         │
//! │  Remove link ───────────► remove_from_cart() ──► remove_item(v)         │
//! │                                                                         │
//! │  Empty cart ────────────► clear_cart() ────────► clear()                │
//! │                                                                         │
//! │  Cart drawer ───────────► get_cart() ──────────► (read only)            │
//! │                                                                         │
//! │  After each mutation that changed something: persistence.save(cart)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use storefront_core::{
    Cart, CartChange, CartStatus, CartTotals, CheckoutHandoff, CurrencyCode, LineItem,
    LineItemInput,
};
use tracing::{debug, info, warn};

use super::persistence::CartPersistence;

// =============================================================================
// Cart Store
// =============================================================================

/// The cart plus the slot it is persisted to.
#[derive(Debug)]
pub struct CartStore {
    cart: Cart,
    persistence: CartPersistence,
    default_currency: CurrencyCode,
}

impl CartStore {
    /// Rehydrates from the slot, or starts empty.
    pub fn hydrate(persistence: CartPersistence, default_currency: CurrencyCode) -> Self {
        let cart = persistence.load();
        info!(
            key = %persistence.key(),
            lines = cart.len(),
            items = cart.item_count(),
            "Cart store ready"
        );
        CartStore {
            cart,
            persistence,
            default_currency,
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Adds a line or merges into the line for the same variant.
    pub fn add_item(&mut self, input: LineItemInput) -> CartChange {
        if input.variant_id.trim().is_empty() {
            warn!(
                product_id = %input.product_id,
                title = %input.title,
                "Ignoring add without a variant id"
            );
            return CartChange::Unchanged;
        }

        if let Some(first) = self.cart.lines().first() {
            if first.price.currency_code() != input.price.currency_code() {
                warn!(
                    variant_id = %input.variant_id,
                    cart_currency = %first.price.currency_code(),
                    item_currency = %input.price.currency_code(),
                    "Adding item in a different currency; totals will be segmented"
                );
            }
        }

        let variant_id = input.variant_id.clone();
        let change = self.cart.add_item(input);
        debug!(variant_id = %variant_id, ?change, "add_item");
        self.persist(change)
    }

    /// Removes a line; absent is a no-op.
    pub fn remove_item(&mut self, variant_id: &str) -> CartChange {
        let change = self.cart.remove_item(variant_id);
        debug!(variant_id = %variant_id, ?change, "remove_item");
        self.persist(change)
    }

    /// Sets a quantity; zero or below removes the line, unknown variant is a no-op.
    pub fn update_quantity(&mut self, variant_id: &str, quantity: i64) -> CartChange {
        let change = self.cart.update_quantity(variant_id, quantity);
        debug!(variant_id = %variant_id, quantity, ?change, "update_quantity");
        self.persist(change)
    }

    pub fn clear(&mut self) -> CartChange {
        let change = self.cart.clear();
        debug!(?change, "clear");
        self.persist(change)
    }

    /// Re-reads the slot, replacing what is in memory.
    ///
    /// Sees whatever the slot store currently returns. The SQLite store
    /// serves a cache, so go through `AppContext::reload`, which refreshes
    /// that cache first, to pick up another process's writes.
    pub fn reload(&mut self) {
        self.cart = self.persistence.load();
        debug!(lines = self.cart.len(), "Cart reloaded from storage");
    }

    fn persist(&self, change: CartChange) -> CartChange {
        if change.is_change() {
            self.persistence.save(&self.cart);
        }
        change
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn totals(&self) -> CartTotals {
        self.cart.totals(&self.default_currency)
    }

    pub fn status(&self) -> CartStatus {
        self.cart.status()
    }

    pub fn lines(&self) -> &[LineItem] {
        self.cart.lines()
    }

    pub fn get(&self, variant_id: &str) -> Option<&LineItem> {
        self.cart.get(variant_id)
    }

    pub fn len(&self) -> usize {
        self.cart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn default_currency(&self) -> &CurrencyCode {
        &self.default_currency
    }

    /// Read-only export for checkout; `None` while the cart is empty.
    pub fn checkout(&self) -> Option<CheckoutHandoff> {
        CheckoutHandoff::from_cart(&self.cart, &self.default_currency)
    }
}

// =============================================================================
// Shared Handle
// =============================================================================

/// Shared cart handle.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<CartStore>>`: every mutation holds the lock for its whole
/// read-modify-persist sequence, so operations never interleave.
#[derive(Debug, Clone)]
pub struct CartState {
    store: Arc<Mutex<CartStore>>,
}

impl CartState {
    pub fn new(store: CartStore) -> Self {
        CartState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|store| store.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartStore) -> R,
    {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|store| store.add_item(input));
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartStore) -> R,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemorySlotStore;
    use storefront_core::Money;

    fn store_with(slots: &Arc<MemorySlotStore>) -> CartStore {
        let persistence = CartPersistence::new(slots.clone(), "storefront-cart");
        CartStore::hydrate(persistence, CurrencyCode::usd())
    }

    fn sauna(quantity: i64) -> LineItemInput {
        LineItemInput::new("P1", "V1", "Barrel Sauna", Money::parse("999", "USD").unwrap())
            .quantity(quantity)
    }

    #[test]
    fn test_mutations_persist_and_rehydrate() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut store = store_with(&slots);

        store.add_item(sauna(1));
        store.add_item(sauna(2));

        let reopened = store_with(&slots);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("V1").unwrap().quantity, 3);
        assert_eq!(reopened.totals().subtotal.to_string(), "$2,997.00");
    }

    #[test]
    fn test_unchanged_mutations_do_not_write() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut store = store_with(&slots);

        store.add_item(sauna(1));
        assert_eq!(slots.write_count(), 1);

        store.remove_item("missing");
        store.update_quantity("missing", 4);
        let blank = LineItemInput::new("P9", " ", "Gift", Money::parse("5", "USD").unwrap());
        assert_eq!(store.add_item(blank), CartChange::Unchanged);
        store.update_quantity("V1", 1);
        assert_eq!(slots.write_count(), 1);

        store.clear();
        store.clear();
        assert_eq!(slots.write_count(), 2);
    }

    #[test]
    fn test_storage_failure_keeps_memory_state() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut store = store_with(&slots);
        slots.fail_writes(true);

        assert_eq!(store.add_item(sauna(2)), CartChange::Added);
        assert_eq!(store.get("V1").unwrap().quantity, 2);
        assert_eq!(store.totals().item_count, 2);
    }

    #[test]
    fn test_update_to_zero_empties_cart() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut store = store_with(&slots);

        store.add_item(sauna(3));
        assert_eq!(store.update_quantity("V1", 0), CartChange::Removed);
        assert_eq!(store.status(), CartStatus::Empty);
        assert!(store.checkout().is_none());
        assert!(store_with(&slots).is_empty());
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut first = store_with(&slots);
        let mut second = store_with(&slots);

        second.add_item(sauna(5));
        assert!(first.is_empty());

        first.reload();
        assert_eq!(first.get("V1").unwrap().quantity, 5);
    }

    #[test]
    fn test_mixed_currency_add_is_accepted() {
        let slots = Arc::new(MemorySlotStore::new());
        let mut store = store_with(&slots);

        store.add_item(sauna(1));
        store.add_item(LineItemInput::new(
            "P2",
            "V2",
            "Heater",
            Money::parse("300", "EUR").unwrap(),
        ));

        let totals = store.totals();
        assert_eq!(store.len(), 2);
        assert_eq!(totals.currency_code.as_str(), "USD");
        assert_eq!(totals.other_subtotals.len(), 1);
    }

    #[test]
    fn test_shared_handle_serializes_access() {
        let slots = Arc::new(MemorySlotStore::new());
        let state = CartState::new(store_with(&slots));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        state.with_cart_mut(|s| s.add_item(sauna(1)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(state.with_cart(|s| s.get("V1").unwrap().quantity), 200);
    }
}
