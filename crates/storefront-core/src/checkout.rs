//! # Checkout Hand-off
//!
//! A read-only export of the cart for the external checkout page. Payment
//! happens elsewhere; all we hand over is which variants and how many.
//!
//! ## Flow
//! ```text
//! Cart (Populated) ──► CheckoutHandoff::from_cart ──► { id, lines, totals }
//!                                                        │
//!                                                        ▼
//!                           permalink("shop.example.com")
//!                           https://shop.example.com/cart/11:2,12:1
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartTotals};
use crate::money::CurrencyCode;

/// One `{variantId, quantity}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutLine {
    pub variant_id: String,
    pub quantity: u32,
}

/// Snapshot handed to checkout. Later cart changes do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutHandoff {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<CheckoutLine>,
    pub totals: CartTotals,
}

impl CheckoutHandoff {
    /// Exports a cart. Returns `None` for an empty cart; there is nothing to
    /// check out.
    pub fn from_cart(cart: &Cart, default_currency: &CurrencyCode) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }

        Some(CheckoutHandoff {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            lines: cart
                .lines()
                .iter()
                .map(|l| CheckoutLine {
                    variant_id: l.variant_id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            totals: cart.totals(default_currency),
        })
    }

    /// Cart permalink on the hosted shop: `https://{domain}/cart/{id}:{qty},...`
    pub fn permalink(&self, shop_domain: &str) -> String {
        let domain = shop_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');

        let pairs = self
            .lines
            .iter()
            .map(|l| format!("{}:{}", numeric_variant_id(&l.variant_id), l.quantity))
            .collect::<Vec<_>>()
            .join(",");

        format!("https://{}/cart/{}", domain, pairs)
    }
}

/// Last path segment of a global id: `gid://shopify/ProductVariant/123` → `123`.
///
/// Ids without a `/` are returned unchanged.
pub fn numeric_variant_id(variant_id: &str) -> &str {
    variant_id.rsplit('/').next().unwrap_or(variant_id)
}
