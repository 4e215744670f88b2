//! # Cart Configuration
//!
//! Store backend, promotion parameters, catalog and log filter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARTWISE_STORE=sqlite                                              │
//! │     CARTWISE_DB_PATH=/var/lib/cartwise/carts.db                        │
//! │     CARTWISE_VIP_DISCOUNT_BPS=1500                                     │
//! │     CARTWISE_LOG=debug                                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cartwise/cartwise.toml (Linux)                           │
//! │     ~/Library/Application Support/com.cartwise.cartwise/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     memory store, 15% VIP, bundle from 3 lines, standard catalog       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! backend = "sqlite"          # memory | sqlite
//! database_path = "cartwise.db"
//!
//! [pricing]
//! vip_discount_bps = 1500
//! bundle_min_lines = 3
//!
//! [catalog]
//! T_SHIRT = 3599
//! JEANS = 6550
//! DRESS = 8075
//!
//! [logging]
//! filter = "info,cartwise=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use cartwise_core::{Catalog, DiscountRate, PricingRules, BUNDLE_MIN_LINES, VIP_DISCOUNT_BPS};

use crate::error::{ConfigError, ConfigResult};
use crate::telemetry::DEFAULT_LOG_FILTER;

// =============================================================================
// Store Backend
// =============================================================================

/// Which [`CartStore`](crate::store::CartStore) implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local, lost on restart.
    #[default]
    Memory,

    /// SQLite file.
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "mem" => Ok(StoreBackend::Memory),
            "sqlite" | "db" => Ok(StoreBackend::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "Unknown store backend: '{}'. Valid options: memory, sqlite",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// SQLite file, used only by the `sqlite` backend.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("cartwise.db")
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: StoreBackend::default(),
            database_path: default_database_path(),
        }
    }
}

/// `[pricing]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// VIP reduction in basis points (0..=10000).
    #[serde(default = "default_vip_discount_bps")]
    pub vip_discount_bps: u32,

    /// Lines needed before the cheapest one is free.
    #[serde(default = "default_bundle_min_lines")]
    pub bundle_min_lines: usize,
}

fn default_vip_discount_bps() -> u32 {
    VIP_DISCOUNT_BPS
}

fn default_bundle_min_lines() -> usize {
    BUNDLE_MIN_LINES
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            vip_discount_bps: default_vip_discount_bps(),
            bundle_min_lines: default_bundle_min_lines(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

fn default_catalog() -> BTreeMap<String, i64> {
    Catalog::standard()
        .entries()
        .map(|(id, price)| (id.to_string(), price.cents()))
        .collect()
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    /// Product id → price in cents.
    #[serde(default = "default_catalog")]
    pub catalog: BTreeMap<String, i64>,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for CartConfig {
    fn default() -> Self {
        CartConfig {
            store: StoreSettings::default(),
            pricing: PricingSettings::default(),
            catalog: default_catalog(),
            logging: LoggingSettings::default(),
        }
    }
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`cartwise.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// ## Rejects
    /// - Empty catalog, malformed product ids, prices outside
    ///   `0..=MAX_PRICE_CENTS`
    /// - VIP discount above 10000 bps
    /// - Bundle threshold below 1
    pub fn validate(&self) -> ConfigResult<()> {
        self.catalog()?;
        self.pricing_rules()?;

        if self.store.backend == StoreBackend::Sqlite
            && self.store.database_path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "database_path is required for the sqlite backend".into(),
            ));
        }

        Ok(())
    }

    /// Builds the catalog from the `[catalog]` table.
    pub fn catalog(&self) -> ConfigResult<Catalog> {
        Ok(Catalog::from_entries(
            self.catalog.iter().map(|(id, cents)| (id.as_str(), *cents)),
        )?)
    }

    /// Builds the promotion parameters from the `[pricing]` table.
    pub fn pricing_rules(&self) -> ConfigResult<PricingRules> {
        let rate = DiscountRate::from_bps(self.pricing.vip_discount_bps)?;
        Ok(PricingRules::new(rate, self.pricing.bundle_min_lines)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `CARTWISE_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("CARTWISE_STORE") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(e) => warn!(backend = %backend, error = %e, "Ignoring CARTWISE_STORE"),
            }
        }

        if let Some(path) = lookup("CARTWISE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = PathBuf::from(path);
        }

        if let Some(bps) = lookup("CARTWISE_VIP_DISCOUNT_BPS") {
            match bps.parse::<u32>() {
                Ok(parsed) => self.pricing.vip_discount_bps = parsed,
                Err(_) => warn!(value = %bps, "Ignoring CARTWISE_VIP_DISCOUNT_BPS"),
            }
        }

        if let Some(filter) = lookup("CARTWISE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cartwise", "cartwise")
            .map(|dirs| dirs.config_dir().join("cartwise.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cartwise-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.pricing.vip_discount_bps, 1500);
        assert_eq!(config.pricing.bundle_min_lines, 3);
        assert_eq!(config.catalog.get("JEANS"), Some(&6550));
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing_rules().unwrap(), PricingRules::default());
        assert_eq!(config.catalog().unwrap(), Catalog::standard());
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("sqlite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("MEMORY".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CartConfig::from_toml(
            r#"
            [store]
            backend = "sqlite"

            [pricing]
            vip_discount_bps = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.database_path, PathBuf::from("cartwise.db"));
        assert_eq!(config.pricing.vip_discount_bps, 2000);
        assert_eq!(config.pricing.bundle_min_lines, 3);
        assert_eq!(config.catalog.len(), 3);
    }

    #[test]
    fn test_custom_catalog() {
        let config = CartConfig::from_toml(
            r#"
            [catalog]
            HAT = 1999
            "#,
        )
        .unwrap();

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("HAT").unwrap().1.cents(), 1999);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = CartConfig::default();
        config.pricing.vip_discount_bps = 10_001;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = CartConfig::default();
        config.pricing.bundle_min_lines = 0;
        assert!(config.validate().is_err());

        let mut config = CartConfig::default();
        config.catalog.clear();
        assert!(config.validate().is_err());

        let mut config = CartConfig::default();
        config.catalog.insert("hat".to_string(), 100);
        assert!(config.validate().is_err());

        let mut config = CartConfig::default();
        config.catalog.insert("HAT".to_string(), -100);
        assert!(config.validate().is_err());

        let mut config = CartConfig::default();
        config.catalog.insert("GOLD".to_string(), i64::MAX / 2 + 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CARTWISE_STORE", "sqlite"),
            ("CARTWISE_DB_PATH", "/tmp/carts.db"),
            ("CARTWISE_VIP_DISCOUNT_BPS", "1000"),
            ("CARTWISE_LOG", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = CartConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/carts.db"));
        assert_eq!(config.pricing.vip_discount_bps, 1000);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = CartConfig::default();
        config.apply_overrides(|key| match key {
            "CARTWISE_STORE" => Some("redis".to_string()),
            "CARTWISE_VIP_DISCOUNT_BPS" => Some("lots".to_string()),
            _ => None,
        });

        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.pricing.vip_discount_bps, 1500);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save_and_load.toml");

        let mut config = CartConfig::default();
        config.store.backend = StoreBackend::Sqlite;
        config.pricing.bundle_min_lines = 4;
        config.save(Some(path.clone())).unwrap();

        let loaded = CartConfig::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = temp_path("invalid.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[pricing]\nbundle_min_lines = 0\n").unwrap();

        assert!(CartConfig::load(Some(path.clone())).is_err());

        let _ = std::fs::remove_file(&path);
    }
}
