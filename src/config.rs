//! Configuration

use std::path::PathBuf;

use clap::Args;
use rusty_money::iso::{self, Currency};

use crate::pricing::PricingPolicy;

/// Storage key the browser storefront used for its cart.
pub const DEFAULT_STORAGE_KEY: &str = "auraJewelsCart";

/// Cart store settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Key the cart is persisted under
    pub storage_key: String,

    /// Currency all cart prices are in
    pub currency: &'static Currency,

    /// Tax and shipping rules for the order summary
    pub pricing: PricingPolicy,
}

impl CartConfig {
    /// Storefront defaults for the given currency.
    pub fn for_currency(currency: &'static Currency) -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency,
            pricing: PricingPolicy::storefront(currency),
        }
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self::for_currency(iso::USD)
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AURA_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Catalog and storage locations.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Product catalog JSON document
    #[arg(long, env = "AURA_CATALOG", default_value = "fixtures/catalog.json", global = true)]
    pub catalog: PathBuf,

    /// Directory the cart is persisted in
    #[arg(long, env = "AURA_DATA_DIR", default_value = ".aura", global = true)]
    pub data_dir: PathBuf,

    /// Key the cart is persisted under
    #[arg(long, env = "AURA_CART_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub cart_key: String,
}

impl StoreConfig {
    /// Cart settings for these locations.
    pub fn cart_config(&self) -> CartConfig {
        CartConfig::default().with_storage_key(self.cart_key.clone())
    }
}
