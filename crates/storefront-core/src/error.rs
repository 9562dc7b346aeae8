//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Catalog lookups that can fail                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App errors                                                            │
//! │  ├── StorageError     - Slot store failures (logged, never surfaced)   │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutators never return these. Errors only come out of the places that
//! can genuinely fail: parsing untrusted strings and resolving a variant from
//! catalog data.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product has no variant with the requested id.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    /// The product has no variants at all, so nothing can be added.
    #[error("Product {0} has no purchasable variants")]
    NoVariants(String),

    /// The variant exists but the catalog marks it as not for sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Product page: variant "Large" selected
    ///      │
    ///      ▼
    /// availableForSale = false
    ///      │
    ///      ▼
    /// VariantUnavailable { variant_id: "gid://.../42" }
    ///      │
    ///      ▼
    /// UI shows: "Out of Stock"
    /// ```
    #[error("Variant {variant_id} is not available for sale")]
    VariantUnavailable { variant_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    TooSmall { field: String, min: i64 },

    /// A value that must be unique appears twice.
    #[error("duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    /// Invalid format (e.g., non-numeric amount, bad currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::VariantUnavailable {
            variant_id: "V1".to_string(),
        };
        assert_eq!(err.to_string(), "Variant V1 is not available for sale");

        let err = ValidationError::required("variant_id");
        assert_eq!(err.to_string(), "variant_id is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("title").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
