//! # Configuration
//!
//! Application configuration loaded at startup. Read-only afterwards.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOREFRONT_CURRENCY=EUR                                             │
//! │     STOREFRONT_STORAGE=memory                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/storefront-cart/storefront.toml (Linux)                   │
//! │     ~/Library/Application Support/com.storefront.cart/... (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Nordic Sauna Co."
//! default_currency = "USD"
//! shop_domain = "nordic-sauna.myshopify.com"
//!
//! [cart]
//! storage_key = "storefront-cart"
//!
//! [storage]
//! backend = "sqlite"          # sqlite | memory
//! database_path = "/var/lib/storefront/storefront.db"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use storefront_core::{CurrencyCode, DEFAULT_CART_KEY};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "storefront.db";

// =============================================================================
// Storage Backend
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file; the cart survives restarts.
    #[default]
    Sqlite,

    /// Process memory only; the cart is lost on exit.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency for an empty cart's totals.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Hosted shop domain for checkout permalinks.
    #[serde(default)]
    pub shop_domain: Option<String>,
}

fn default_store_name() -> String {
    "Storefront".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            default_currency: default_currency(),
            shop_domain: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            storage_key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Overrides the platform data directory location.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Loads configuration: defaults, then file, then environment, then validate.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        CurrencyCode::parse(&self.store.default_currency).map_err(|e| {
            ConfigError::Invalid(format!("store.default_currency: {}", e))
        })?;

        if self.cart.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "cart.storage_key must not be empty".into(),
            ));
        }

        if let Some(domain) = &self.store.shop_domain {
            if domain.trim().is_empty() || domain.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "store.shop_domain is not a host name: '{}'",
                    domain
                )));
            }
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides from `lookup` (the process
    /// environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(currency) = lookup("STOREFRONT_CURRENCY") {
            debug!(currency = %currency, "Overriding default currency from environment");
            self.store.default_currency = currency;
        }

        if let Some(domain) = lookup("STOREFRONT_SHOP_DOMAIN") {
            self.store.shop_domain = Some(domain);
        }

        if let Some(key) = lookup("STOREFRONT_CART_KEY") {
            self.cart.storage_key = key;
        }

        if let Some(backend) = lookup("STOREFRONT_STORAGE") {
            match backend.parse() {
                Ok(parsed) => self.storage.backend = parsed,
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed default currency. Falls back to USD if validation was skipped.
    pub fn currency(&self) -> CurrencyCode {
        CurrencyCode::parse(&self.store.default_currency).unwrap_or_default()
    }

    /// Database file to open: configured path, else the platform data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        })
    }

    pub fn shop_domain(&self) -> Option<&str> {
        self.store.shop_domain.as_deref()
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "storefront", "cart")
}

/// Creates the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
