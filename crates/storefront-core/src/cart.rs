//! # Cart Model
//!
//! The shopping cart as a plain value: an ordered list of line items plus the
//! rules for changing it. Persistence and locking live in the app crate.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_item(input)                                                        │
//! │    variantId already present ──► quantity += input.quantity  (Merged)   │
//! │    otherwise ─────────────────► push to the end              (Added)    │
//! │    quantity <= 0 is treated as 1                                        │
//! │                                                                         │
//! │  update_quantity(variantId, n)                                          │
//! │    n <= 0 ─────────────────────► line removed                (Removed)  │
//! │    n > 0 ──────────────────────► quantity = n                (Updated)  │
//! │    unknown variantId ──────────► nothing                     (Unchanged)│
//! │                                                                         │
//! │  remove_item(variantId)          absent ──► Unchanged                   │
//! │  clear()                         already empty ──► Unchanged            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per `variantId`
//! - Every quantity is at least 1
//! - Insertion order is display order; merges never reorder
//!
//! ## Example
//! ```rust
//! use storefront_core::cart::{Cart, LineItemInput};
//! use storefront_core::money::{CurrencyCode, Money};
//!
//! let price = Money::parse("999", "USD").unwrap();
//! let mut cart = Cart::new();
//! cart.add_item(LineItemInput::new("P1", "V1", "Barrel Sauna", price.clone()).quantity(1));
//! cart.add_item(LineItemInput::new("P1", "V1", "Barrel Sauna", price).quantity(2));
//!
//! let totals = cart.totals(&CurrencyCode::usd());
//! assert_eq!(totals.item_count, 3);
//! assert_eq!(totals.subtotal.to_string(), "$2,997.00");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{CurrencyCode, Money};
use crate::types::{Product, ProductVariant, SelectedOption};
use crate::validation::{
    normalize_add_quantity, normalize_set_quantity, validate_line_items, validate_variant_id,
};

// =============================================================================
// Line Item Input
// =============================================================================

/// A candidate line, as built by a product card or product page.
///
/// Quantity is signed because it comes straight from user input; the cart
/// clamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItemInput {
    pub product_id: String,
    pub variant_id: String,
    pub title: String,
    pub variant_title: String,
    pub price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_handle: Option<String>,
}

impl LineItemInput {
    /// Minimal input with quantity 1; the remaining fields default to empty.
    pub fn new(
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        title: impl Into<String>,
        price: Money,
    ) -> Self {
        LineItemInput {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            title: title.into(),
            variant_title: String::new(),
            price,
            quantity: 1,
            selected_options: Vec::new(),
            image_url: None,
            product_handle: None,
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn variant_title(mut self, variant_title: impl Into<String>) -> Self {
        self.variant_title = variant_title.into();
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.selected_options.push(SelectedOption::new(name, value));
        self
    }

    /// Builds the input for "Add to cart" on a product page.
    ///
    /// The unit price, titles, options and thumbnail are copied from the
    /// catalog at this moment. Later catalog changes do not reach the cart.
    ///
    /// ## Errors
    /// `VariantUnavailable` when the catalog marks the variant not for sale.
    pub fn from_variant(
        product: &Product,
        variant: &ProductVariant,
        quantity: i64,
    ) -> CoreResult<Self> {
        if !variant.available_for_sale {
            return Err(CoreError::VariantUnavailable {
                variant_id: variant.id.clone(),
            });
        }

        Ok(LineItemInput {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            title: product.title.clone(),
            variant_title: variant.title.clone(),
            price: variant.price.clone(),
            quantity,
            selected_options: variant.selected_options.clone(),
            image_url: product.featured_image().map(|img| img.url.clone()),
            product_handle: Some(product.handle.clone()),
        })
    }

    /// Input for the quick-add button on a product card: first variant, one unit.
    pub fn first_variant(product: &Product) -> CoreResult<Self> {
        let variant = product.resolve_variant(None)?;
        LineItemInput::from_variant(product, variant, 1)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One entry in the cart.
///
/// ## Design Notes
/// - `variant_id` is the identity key
/// - `price` is frozen when the line is first added; merges keep it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub variant_id: String,
    pub title: String,
    pub variant_title: String,

    /// Unit price at time of adding (frozen)
    pub price: Money,

    pub quantity: u32,

    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub product_handle: Option<String>,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    fn from_input(input: LineItemInput, quantity: u32) -> Self {
        LineItem {
            product_id: input.product_id,
            variant_id: input.variant_id,
            title: input.title,
            variant_title: input.variant_title,
            price: input.price,
            quantity,
            selected_options: input.selected_options,
            image_url: input.image_url,
            product_handle: input.product_handle,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

// =============================================================================
// Change Outcome
// =============================================================================

/// What a mutation did. Only `Unchanged` means storage need not be touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum CartChange {
    Added,
    Merged,
    Updated,
    Removed,
    Cleared,
    Unchanged,
}

impl CartChange {
    pub fn is_change(self) -> bool {
        self != CartChange::Unchanged
    }
}

/// Empty disables checkout; Populated enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum CartStatus {
    Empty,
    Populated,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a cart from restored lines, checking every invariant.
    pub fn from_items(
        items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_line_items(&items)?;
        Ok(Cart { items, created_at })
    }

    /// Adds a line or merges into the existing line for the same variant.
    ///
    /// On a merge the existing price and display fields are kept; only the
    /// quantity grows. An input with a blank `variant_id` has no identity and
    /// is ignored (`Unchanged`), so every stored line passes
    /// [`validate_line_items`] on reload.
    pub fn add_item(&mut self, input: LineItemInput) -> CartChange {
        if validate_variant_id(&input.variant_id).is_err() {
            return CartChange::Unchanged;
        }

        let quantity = normalize_add_quantity(input.quantity);

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.variant_id == input.variant_id)
        {
            item.quantity = item.quantity.saturating_add(quantity);
            return CartChange::Merged;
        }

        self.items.push(LineItem::from_input(input, quantity));
        CartChange::Added
    }

    /// Removes the line for `variant_id`. Absent is not an error.
    pub fn remove_item(&mut self, variant_id: &str) -> CartChange {
        let before = self.items.len();
        self.items.retain(|i| i.variant_id != variant_id);

        if self.items.len() == before {
            CartChange::Unchanged
        } else {
            CartChange::Removed
        }
    }

    /// Sets a line's quantity; zero or below removes it.
    pub fn update_quantity(&mut self, variant_id: &str, quantity: i64) -> CartChange {
        let Some(quantity) = normalize_set_quantity(quantity) else {
            return self.remove_item(variant_id);
        };

        match self.items.iter_mut().find(|i| i.variant_id == variant_id) {
            Some(item) if item.quantity == quantity => CartChange::Unchanged,
            Some(item) => {
                item.quantity = quantity;
                CartChange::Updated
            }
            None => CartChange::Unchanged,
        }
    }

    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        self.created_at = Utc::now();
        CartChange::Cleared
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, variant_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.variant_id == variant_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> CartStatus {
        if self.items.is_empty() {
            CartStatus::Empty
        } else {
            CartStatus::Populated
        }
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Currencies present in the cart, in first-appearance order.
    pub fn currencies(&self) -> Vec<&CurrencyCode> {
        let mut out: Vec<&CurrencyCode> = Vec::new();
        for item in &self.items {
            let code = item.price.currency_code();
            if !out.contains(&code) {
                out.push(code);
            }
        }
        out
    }

    /// Derived totals, recomputed on every call.
    ///
    /// `default_currency` is only used for an empty cart.
    pub fn totals(&self, default_currency: &CurrencyCode) -> CartTotals {
        let mut subtotals: Vec<Money> = Vec::new();

        for item in &self.items {
            let line_total = item.line_total();
            match subtotals
                .iter_mut()
                .find(|s| s.currency_code() == line_total.currency_code())
            {
                Some(sum) => {
                    if let Some(next) = sum.checked_add(&line_total) {
                        *sum = next;
                    }
                }
                None => subtotals.push(line_total),
            }
        }

        let mut segments = subtotals.into_iter();
        let subtotal = segments
            .next()
            .unwrap_or_else(|| Money::zero(default_currency.clone()));

        CartTotals {
            item_count: self.item_count(),
            line_count: self.items.len(),
            currency_code: subtotal.currency_code().clone(),
            subtotal,
            other_subtotals: segments.collect(),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary for API responses.
///
/// `subtotal` is in the cart currency: the currency of the first line, or
/// the store default when empty. Lines priced in any other currency are
/// summed separately into `other_subtotals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Sum of quantities
    #[ts(type = "number")]
    pub item_count: u64,
    /// Number of distinct lines
    #[ts(type = "number")]
    pub line_count: usize,
    pub subtotal: Money,
    pub currency_code: CurrencyCode,
    pub other_subtotals: Vec<Money>,
}

impl CartTotals {
    pub fn is_mixed_currency(&self) -> bool {
        !self.other_subtotals.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductImage;

    fn usd(amount: &str) -> Money {
        Money::parse(amount, "USD").unwrap()
    }

    fn input(variant_id: &str, amount: &str, quantity: i64) -> LineItemInput {
        LineItemInput::new("P1", variant_id, "Barrel Sauna", usd(amount)).quantity(quantity)
    }

    fn totals(cart: &Cart) -> CartTotals {
        cart.totals(&CurrencyCode::usd())
    }

    #[test]
    fn test_add_then_merge_scenario() {
        let mut cart = Cart::new();

        assert_eq!(cart.add_item(input("V1", "999", 1)), CartChange::Added);
        assert_eq!(cart.add_item(input("V1", "999", 2)), CartChange::Merged);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("V1").unwrap().quantity, 3);
        let t = totals(&cart);
        assert_eq!(t.item_count, 3);
        assert_eq!(t.subtotal, usd("2997"));
        assert_eq!(t.subtotal.to_string(), "$2,997.00");

        assert_eq!(cart.update_quantity("V1", 0), CartChange::Removed);
        assert_eq!(cart.status(), CartStatus::Empty);
        assert_eq!(totals(&cart).item_count, 0);
        assert!(totals(&cart).subtotal.is_zero());
    }

    #[test]
    fn test_merge_keeps_first_price_and_fields() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "999", 1).variant_title("Cedar"));
        cart.add_item(input("V1", "1099", 1).variant_title("Spruce"));

        let line = cart.get("V1").unwrap();
        assert_eq!(line.price, usd("999"));
        assert_eq!(line.variant_title, "Cedar");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_add_clamps_non_positive_quantity() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "10", 0));
        cart.add_item(input("V2", "10", -4));
        assert_eq!(cart.get("V1").unwrap().quantity, 1);
        assert_eq!(cart.get("V2").unwrap().quantity, 1);

        cart.add_item(input("V1", "10", -1));
        assert_eq!(cart.get("V1").unwrap().quantity, 2);
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let mut cart = Cart::new();
        cart.add_item(input("A", "1", 1));
        cart.add_item(input("B", "1", 1));
        cart.add_item(input("A", "1", 1));
        cart.add_item(input("C", "1", 1));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.variant_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "5", 1));
        cart.add_item(input("V2", "5", 1));

        assert_eq!(cart.remove_item("V1"), CartChange::Removed);
        let after_first = cart.clone();
        assert_eq!(cart.remove_item("V1"), CartChange::Unchanged);
        assert_eq!(cart, after_first);
        assert_eq!(cart.remove_item("nope"), CartChange::Unchanged);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "5", 1));

        assert_eq!(cart.update_quantity("V1", 4), CartChange::Updated);
        assert_eq!(cart.get("V1").unwrap().quantity, 4);
        assert_eq!(cart.update_quantity("V1", 4), CartChange::Unchanged);
        assert_eq!(cart.update_quantity("ghost", 2), CartChange::Unchanged);
        assert_eq!(cart.update_quantity("V1", -3), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert_eq!(cart.clear(), CartChange::Unchanged);

        cart.add_item(input("V1", "5", 2));
        assert_eq!(cart.status(), CartStatus::Populated);
        assert_eq!(cart.clear(), CartChange::Cleared);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_sum_lines() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "19.99", 2));
        cart.add_item(input("V2", "0.01", 3));

        let t = totals(&cart);
        assert_eq!(t.item_count, 5);
        assert_eq!(t.line_count, 2);
        assert_eq!(t.subtotal, usd("40.01"));
        assert!(!t.is_mixed_currency());
    }

    #[test]
    fn test_empty_totals_use_default_currency() {
        let cart = Cart::new();
        let eur = CurrencyCode::parse("EUR").unwrap();
        let t = cart.totals(&eur);
        assert_eq!(t.currency_code, eur);
        assert_eq!(t.subtotal.to_string(), "€0.00");
    }

    #[test]
    fn test_mixed_currency_is_segmented() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "10", 1));
        cart.add_item(LineItemInput::new(
            "P2",
            "V2",
            "Heater",
            Money::parse("20", "EUR").unwrap(),
        ));
        cart.add_item(input("V3", "5", 2));

        let t = totals(&cart);
        assert_eq!(t.currency_code.as_str(), "USD");
        assert_eq!(t.subtotal, usd("20"));
        assert_eq!(t.other_subtotals, vec![Money::parse("20", "EUR").unwrap()]);
        assert_eq!(t.item_count, 4);
        assert_eq!(cart.currencies().len(), 2);
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "5", 1));
        let mut items = cart.lines().to_vec();
        items.push(items[0].clone());

        assert!(matches!(
            Cart::from_items(items, Utc::now()),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_from_items_rejects_zero_quantity() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "5", 1));
        let mut items = cart.lines().to_vec();
        items[0].quantity = 0;

        assert!(Cart::from_items(items, Utc::now()).is_err());
    }

    fn product(available: bool) -> Product {
        Product {
            id: "gid://shopify/Product/1".to_string(),
            handle: "barrel-sauna".to_string(),
            title: "Barrel Sauna".to_string(),
            description: String::new(),
            product_type: None,
            images: vec![ProductImage {
                url: "https://cdn.example/sauna.jpg".to_string(),
                alt_text: None,
            }],
            variants: vec![ProductVariant {
                id: "gid://shopify/ProductVariant/11".to_string(),
                title: "Large".to_string(),
                price: usd("4999"),
                available_for_sale: available,
                selected_options: vec![SelectedOption::new("Size", "Large")],
            }],
        }
    }

    #[test]
    fn test_from_variant_copies_catalog_fields() {
        let p = product(true);
        let input = LineItemInput::from_variant(&p, &p.variants[0], 2).unwrap();
        assert_eq!(input.variant_title, "Large");
        assert_eq!(input.product_handle.as_deref(), Some("barrel-sauna"));
        assert_eq!(
            input.image_url.as_deref(),
            Some("https://cdn.example/sauna.jpg")
        );
        assert_eq!(input.selected_options[0].value, "Large");
    }

    #[test]
    fn test_from_variant_refuses_unavailable() {
        let p = product(false);
        assert!(matches!(
            LineItemInput::first_variant(&p),
            Err(CoreError::VariantUnavailable { .. })
        ));
    }

    #[test]
    fn test_blank_variant_id_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "999", 2));

        assert_eq!(cart.add_item(input("", "10", 1)), CartChange::Unchanged);
        assert_eq!(cart.add_item(input("   ", "10", 1)), CartChange::Unchanged);
        assert_eq!(cart.len(), 1);
        assert!(validate_line_items(cart.lines()).is_ok());
    }

    #[test]
    fn test_generated_add_sequences_keep_merge_invariant() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::collections::HashMap;

        let variants = ["V1", "V2", "V3", "V4", " ", ""];

        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cart = Cart::new();
            let mut expected: HashMap<&str, u32> = HashMap::new();

            for _ in 0..rng.gen_range(0..40) {
                let variant = variants[rng.gen_range(0..variants.len())];
                let quantity: i64 = rng.gen_range(-3..=5);
                cart.add_item(input(variant, "12.5", quantity));

                if !variant.trim().is_empty() {
                    *expected.entry(variant).or_insert(0) += normalize_add_quantity(quantity);
                }
            }

            assert!(validate_line_items(cart.lines()).is_ok(), "seed {}", seed);
            assert_eq!(cart.len(), expected.len(), "seed {}", seed);
            for (variant, quantity) in &expected {
                assert_eq!(cart.get(variant).unwrap().quantity, *quantity, "seed {}", seed);
            }
            assert_eq!(
                cart.item_count(),
                expected.values().map(|q| u64::from(*q)).sum::<u64>(),
                "seed {}",
                seed
            );
        }
    }

    #[test]
    fn test_serialized_line_uses_camel_case() {
        let mut cart = Cart::new();
        cart.add_item(input("V1", "999", 1).option("Size", "L"));
        let json = serde_json::to_value(&cart.lines()[0]).unwrap();
        assert_eq!(json["variantId"], "V1");
        assert_eq!(json["price"]["amount"], "999");
        assert_eq!(json["selectedOptions"][0]["name"], "Size");
    }
}
