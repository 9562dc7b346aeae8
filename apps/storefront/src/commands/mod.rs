//! # Commands Module
//!
//! The operations the storefront UI (and the CLI) invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── cart.rs     ◄─── Cart manipulation and checkout hand-off
//! ├── product.rs  ◄─── Catalog listing, add-to-cart by handle
//! └── config.rs   ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI event ("Add to cart", quantity stepper, "Remove")                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  fn update_cart_item(                                                   │
//! │      cart: &CartState,      ◄── Shared handle from AppContext           │
//! │      variant_id: &str,      ◄── From the event                          │
//! │      quantity: i64,         ◄── Raw input, normalized by the cart       │
//! │  ) -> CartResponse                                                      │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  UI re-renders: items, totals, status                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs cart and catalog
//! fn add_product_to_cart(cart: &CartState, catalog: &Catalog, ...)
//!
//! // Only needs config
//! fn get_config(config: &AppConfig)
//! ```

pub mod cart;
pub mod config;
pub mod product;
