//! # Validation Module
//!
//! Input checks for the cart.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Shopper input (quantity box, CLI args)                                 │
//! │  ├── parse_quantity: text → integer                                     │
//! │  └── normalize_add_quantity: <= 0 clamps to 1                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Cart mutators (never fail)                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Persisted snapshot (untrusted on the way back in)                      │
//! │  └── validate_line_items: ids, quantities, uniqueness                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money amounts and currency codes are checked when they are deserialized
//! (see [`crate::money`]), so they are not repeated here.

use std::collections::HashSet;

use crate::cart::LineItem;
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Smallest quantity a line item can hold.
pub const MIN_LINE_QUANTITY: u32 = 1;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a variant identifier.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_variant_id;
///
/// assert!(validate_variant_id("gid://shopify/ProductVariant/42").is_ok());
/// assert!(validate_variant_id("   ").is_err());
/// ```
pub fn validate_variant_id(variant_id: &str) -> ValidationResult<()> {
    if variant_id.trim().is_empty() {
        return Err(ValidationError::required("variant_id"));
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a quantity typed by the shopper.
///
/// Zero and negative values parse fine; the cart decides what they mean.
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::required("quantity"));
    }
    text.parse::<i64>()
        .map_err(|e| ValidationError::invalid_format("quantity", format!("'{}': {}", text, e)))
}

/// Quantity for an add: anything below 1 becomes 1.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::normalize_add_quantity;
///
/// assert_eq!(normalize_add_quantity(0), 1);
/// assert_eq!(normalize_add_quantity(-5), 1);
/// assert_eq!(normalize_add_quantity(3), 3);
/// ```
pub fn normalize_add_quantity(quantity: i64) -> u32 {
    clamp_quantity(quantity).unwrap_or(MIN_LINE_QUANTITY)
}

/// Quantity for a direct set: `None` means the line should go away.
pub fn normalize_set_quantity(quantity: i64) -> Option<u32> {
    clamp_quantity(quantity)
}

fn clamp_quantity(quantity: i64) -> Option<u32> {
    if quantity < i64::from(MIN_LINE_QUANTITY) {
        None
    } else {
        Some(u32::try_from(quantity).unwrap_or(u32::MAX))
    }
}

// =============================================================================
// Snapshot Validators
// =============================================================================

/// Checks that a restored sequence of line items satisfies the cart rules.
///
/// ## Rules
/// - Every `variantId` is non-empty
/// - Every quantity is at least 1
/// - No two lines share a `variantId`
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_variant_id(&item.variant_id)?;

        if item.quantity < MIN_LINE_QUANTITY {
            return Err(ValidationError::TooSmall {
                field: "quantity".to_string(),
                min: i64::from(MIN_LINE_QUANTITY),
            });
        }

        if !seen.insert(item.variant_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "variantId".to_string(),
                value: item.variant_id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 4 "), Ok(4));
        assert_eq!(parse_quantity("-2"), Ok(-2));
        assert!(matches!(
            parse_quantity("two"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_quantity(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_set_quantity() {
        assert_eq!(normalize_set_quantity(0), None);
        assert_eq!(normalize_set_quantity(-1), None);
        assert_eq!(normalize_set_quantity(7), Some(7));
        assert_eq!(normalize_set_quantity(i64::MAX), Some(u32::MAX));
    }
}
