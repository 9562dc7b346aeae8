//! # storefront-core: Pure Cart Logic for the Storefront
//!
//! This crate is the **heart** of the storefront cart. It contains the cart
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (product pages, cart drawer)              │   │
//! │  │    ProductCard ──► ProductInfo ──► CartDrawer ──► Checkout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apps/storefront (CartStore, persistence)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │ checkout  │  │  catalog  │  │   │
//! │  │   │   Money   │  │   Cart    │  │  Handoff  │  │  filters  │  │   │
//! │  │   │ Currency  │  │ LineItem  │  │ permalink │  │  queries  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and currency codes (exact decimals, never floats)
//! - [`types`] - Catalog shapes (Product, ProductVariant, SelectedOption)
//! - [`cart`] - Cart, LineItem, totals and merge rules
//! - [`checkout`] - Read-only export for the checkout page
//! - [`catalog`] - Category filters and listing queries
//! - [`validation`] - Quantity and snapshot checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Cart, CurrencyCode, LineItemInput, Money};
//!
//! let mut cart = Cart::new();
//! let price = Money::parse("999.0", "USD").unwrap();
//! cart.add_item(LineItemInput::new("P1", "V1", "Barrel Sauna", price).quantity(3));
//!
//! assert_eq!(cart.totals(&CurrencyCode::usd()).subtotal.to_string(), "$2,997.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange, CartStatus, CartTotals, LineItem, LineItemInput};
pub use checkout::{CheckoutHandoff, CheckoutLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyCode, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default storage slot for the persisted cart.
pub const DEFAULT_CART_KEY: &str = "storefront-cart";

/// Version written into persisted cart snapshots.
///
/// Bump when the line item shape changes incompatibly; older snapshots are
/// then discarded on load instead of misread.
pub const CART_SNAPSHOT_VERSION: u32 = 1;
