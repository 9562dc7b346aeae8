//! # Domain Types
//!
//! Shapes shared between the catalog and the cart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ ProductVariant  │   │ SelectedOption  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  id (identity)  │──►│  name  "Size"   │       │
//! │  │  handle         │   │  title          │   │  value "Large"  │       │
//! │  │  title          │   │  price: Money   │   └─────────────────┘       │
//! │  │  images         │   │  availableFor-  │                              │
//! │  │  variants       │   │    Sale         │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: opaque catalog identifier (`gid://shopify/Product/123`)
//! - `handle`: human-readable URL slug (`barrel-sauna`)
//!
//! These are read-only inputs. The cart never fetches them; UI code passes
//! them in when the shopper clicks "Add to cart".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Selected Option
// =============================================================================

/// One chosen option of a variant, e.g. `Size: Large`.
///
/// Order within a list is insertion order: significant for display, not for
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        SelectedOption {
            name: name.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Product Image
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Variant
// =============================================================================

/// A specific purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductVariant {
    /// Opaque catalog id; the cart's identity key.
    pub id: String,

    /// Display title ("Large / Cedar"), or "Default Title".
    pub title: String,

    pub price: Money,

    #[serde(default = "default_available")]
    pub available_for_sale: bool,

    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

fn default_available() -> bool {
    true
}

// =============================================================================
// Product
// =============================================================================

/// A product as returned by the catalog read API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub images: Vec<ProductImage>,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// First image, used as the cart thumbnail.
    pub fn featured_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// The variant a product card adds when no variant is chosen.
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Finds a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Resolves the variant to add: the requested one, or the first.
    ///
    /// ## Errors
    /// - `VariantNotFound` if `variant_id` is given but unknown
    /// - `NoVariants` if the product has no variants
    pub fn resolve_variant(&self, variant_id: Option<&str>) -> CoreResult<&ProductVariant> {
        match variant_id {
            Some(id) => self.variant(id).ok_or_else(|| CoreError::VariantNotFound {
                product_id: self.id.clone(),
                variant_id: id.to_string(),
            }),
            None => self
                .first_variant()
                .ok_or_else(|| CoreError::NoVariants(self.id.clone())),
        }
    }

    /// Lowest variant price, shown on product cards ("from $999.00").
    ///
    /// Variants priced in a different currency than the first are ignored.
    pub fn min_price(&self) -> Option<&Money> {
        let first = self.variants.first()?;
        self.variants
            .iter()
            .map(|v| &v.price)
            .filter(|p| p.currency_code() == first.price.currency_code())
            .min_by(|a, b| a.amount().cmp(&b.amount()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
