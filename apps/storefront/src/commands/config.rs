//! # Config Commands
//!
//! Read-only view of the configuration for the storefront UI.

use serde::Serialize;
use tracing::debug;

use crate::state::{AppConfig, StorageBackend};

/// What the UI needs from the configuration: header name, price formatting
/// and whether checkout links can be built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub store_name: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub shop_domain: Option<String>,
    pub cart_key: String,
    pub storage: StorageBackend,
}

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (store name in the header)
/// - Price formatting for an empty cart
/// - Enabling the hosted checkout link
pub fn get_config(config: &AppConfig) -> ConfigView {
    debug!("get_config command");
    let currency = config.currency();
    ConfigView {
        store_name: config.store.name.clone(),
        currency_symbol: currency.symbol(),
        currency_code: currency.as_str().to_string(),
        shop_domain: config.store.shop_domain.clone(),
        cart_key: config.cart.storage_key.clone(),
        storage: config.storage.backend,
    }
}
