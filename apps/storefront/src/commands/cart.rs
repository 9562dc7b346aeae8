//! # Cart Commands
//!
//! The cart's UI event surface. Each command takes the shared `CartState`
//! and returns the updated cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐  add_to_cart   ┌────────────┐  checkout_cart  ┌────────┐  │
//! │  │  Empty   │───────────────►│ Populated  │────────────────►│ hosted │  │
//! │  │          │◄───────────────│            │                 │checkout│  │
//! │  └──────────┘  clear_cart /  └────────────┘                 └────────┘  │
//! │                last line removed    │                                   │
//! │                                update_cart_item                         │
//! │                                remove_from_cart                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use storefront_core::{CartStatus, CartTotals, CheckoutHandoff, LineItem, LineItemInput};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, CartStore};

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub status: CartStatus,
}

impl From<&CartStore> for CartResponse {
    fn from(store: &CartStore) -> Self {
        CartResponse {
            items: store.lines().to_vec(),
            totals: store.totals(),
            status: store.status(),
        }
    }
}

/// Checkout export plus, when a shop domain is configured, the hosted cart link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub handoff: CheckoutHandoff,
    pub permalink: Option<String>,
}

/// Gets the current cart contents.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart drawer                                                            │
/// │  ┌────────────────────────────────────────────────────────────────┐    │
/// │  │  YOUR CART                                          3 items    │    │
/// │  ├────────────────────────────────────────────────────────────────┤    │
/// │  │  Barrel Sauna  (Size: Large)      x3            $2,997.00      │    │
/// │  ├────────────────────────────────────────────────────────────────┤    │
/// │  │  Subtotal                                       $2,997.00      │    │
/// │  │  [ Checkout ]   (disabled while Empty)                         │    │
/// │  └────────────────────────────────────────────────────────────────┘    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|store| CartResponse::from(store))
}

/// Adds a line, or merges into the existing line for the same variant.
///
/// ## Behavior
/// - Quantity defaults to 1; zero or negative is treated as 1
/// - Unit price is frozen at the first add
pub fn add_to_cart(cart: &CartState, input: LineItemInput) -> CartResponse {
    debug!(
        variant_id = %input.variant_id,
        quantity = input.quantity,
        "add_to_cart command"
    );

    cart.with_cart_mut(|store| {
        store.add_item(input);
        CartResponse::from(&*store)
    })
}

/// Sets the quantity of a line.
///
/// ## Behavior
/// - Quantity 0 or below: removes the line
/// - Unknown variant: cart returned unchanged
pub fn update_cart_item(cart: &CartState, variant_id: &str, quantity: i64) -> CartResponse {
    debug!(variant_id = %variant_id, quantity, "update_cart_item command");

    cart.with_cart_mut(|store| {
        store.update_quantity(variant_id, quantity);
        CartResponse::from(&*store)
    })
}

/// Removes a line. Removing an absent variant is not an error.
pub fn remove_from_cart(cart: &CartState, variant_id: &str) -> CartResponse {
    debug!(variant_id = %variant_id, "remove_from_cart command");

    cart.with_cart_mut(|store| {
        store.remove_item(variant_id);
        CartResponse::from(&*store)
    })
}

/// Clears all items from the cart.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|store| {
        store.clear();
        CartResponse::from(&*store)
    })
}

/// Exports the cart for the hosted checkout page.
///
/// ## Errors
/// `VALIDATION_ERROR` when the cart is empty (the UI disables the button).
pub fn checkout_cart(cart: &CartState, shop_domain: Option<&str>) -> ApiResult<CheckoutResponse> {
    debug!("checkout_cart command");

    let handoff = cart
        .with_cart(|store| store.checkout())
        .ok_or_else(|| ApiError::validation("Cart is empty"))?;

    let permalink = shop_domain.map(|domain| handoff.permalink(domain));

    Ok(CheckoutResponse { handoff, permalink })
}
