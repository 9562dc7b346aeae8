//! # Error Types
//!
//! Errors for the storefront app: storage, configuration, and the
//! serialized error the UI receives from commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  DbError ──► StorageError ──► persistence adapter: warn!, dropped       │
//! │                                (cart keeps working in memory)           │
//! │                                                                         │
//! │  CoreError (unknown/unavailable variant) ──► ApiError ──► UI            │
//! │  ConfigError ──► startup falls back to defaults (load_or_default)       │
//! │                                                                         │
//! │  UI side:                                                               │
//! │  try {                                                                  │
//! │    await addProductToCart(handle, variantId, qty)                       │
//! │  } catch (e) {                                                          │
//! │    // e.code = "VARIANT_UNAVAILABLE"                                    │
//! │    // e.message = "Variant gid://.../42 is not available for sale"      │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;
use thiserror::Error;

// =============================================================================
// Storage Error
// =============================================================================

/// Slot store failures. The persistence adapter logs these and moves on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// The background writer has stopped; nothing more can be queued.
    #[error("Slot writer is not running")]
    WriterClosed,

    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Injected or environmental failure (quota, read-only medium).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: barrel-sauna"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    VariantUnavailable,
    StorageError,
    ConfigError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::VariantNotFound {
                product_id,
                variant_id,
            } => ApiError::new(
                ErrorCode::NotFound,
                format!("Variant {} not found on product {}", variant_id, product_id),
            ),
            CoreError::NoVariants(product_id) => ApiError::new(
                ErrorCode::NotFound,
                format!("Product {} has no purchasable variants", product_id),
            ),
            err @ CoreError::VariantUnavailable { .. } => {
                ApiError::new(ErrorCode::VariantUnavailable, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Log the detail, return a generic message
        tracing::error!("Storage failure: {}", err);
        ApiError::new(ErrorCode::StorageError, "Cart storage is unavailable")
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        StorageError::Db(err).into()
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for command functions.
pub type ApiResult<T> = Result<T, ApiError>;
