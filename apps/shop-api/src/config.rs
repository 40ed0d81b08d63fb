//! Storefront API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional `shop.toml`
//! in the working directory, then `SHOP_*` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use shop_db::DbConfig;

/// Prefix for environment overrides (`SHOP_DATABASE_PATH`, ...).
pub const CONFIG_ENV_PREFIX: &str = "SHOP";

/// Config file looked up in the working directory (extension optional).
pub const DEFAULT_CONFIG_FILE: &str = "shop";

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// SQLite database file
    pub database_path: String,

    /// Pool size ceiling
    pub max_connections: u32,

    /// Connections kept open while idle
    pub min_connections: u32,

    /// How long to wait for a pooled connection
    pub connect_timeout_ms: u64,

    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout_ms: u64,

    /// Upper bound for one order or payment transaction
    pub transaction_timeout_ms: u64,

    /// Fallback filter when `RUST_LOG` is not set
    pub log_level: String,

    /// Bootstrap administrator account
    pub admin_email: String,

    pub admin_name: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            database_path: "./shop.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
            transaction_timeout_ms: 10_000,
            log_level: "info,shop=debug,sqlx=warn".to_string(),
            admin_email: "admin@shop.local".to_string(),
            admin_name: "Store Administrator".to_string(),
        }
    }
}

impl ShopConfig {
    /// Load configuration from `shop.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File};

        let raw = ConfigLib::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config: ShopConfig = raw
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the pool cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue("min_connections".to_string()));
        }
        for (name, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("busy_timeout_ms", self.busy_timeout_ms),
            ("transaction_timeout_ms", self.transaction_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(name.to_string()));
            }
        }
        if self.admin_email.trim().is_empty() {
            return Err(ConfigError::MissingRequired("admin_email".to_string()));
        }
        Ok(())
    }

    /// Database settings derived from this configuration.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .transaction_timeout(Duration::from_millis(self.transaction_timeout_ms))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
