//! # Feed Configuration
//!
//! Configuration for the record feed, the dashboard agent and the report
//! binary.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_STORE_ID=branch-02                                       │
//! │     STOCKROOM_REPORT_PERIOD=month                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dashboard/stockroom.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockroom.dashboard/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     auto_compute = true, activity_limit = 5, report_period = all       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! id = "main-branch"
//! name = "Main Branch Hardware"
//!
//! [collections]
//! inventory = "inventory"
//! orders = "orders"
//! activity = "activity"
//! stock_movements = "stockMovements"
//!
//! [dashboard]
//! auto_compute = true
//! activity_limit = 5
//! report_period = "week"
//!
//! [report]
//! items_path = "snapshots/inventory.json"
//! orders_path = "snapshots/orders.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use stockroom_core::sales::ReportPeriod;

use crate::error::{FeedError, FeedResult};

// =============================================================================
// Store Configuration
// =============================================================================

/// The store whose collections are being watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Unique store identifier.
    pub id: String,

    /// Human-readable store name.
    #[serde(default)]
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            id: "default-store".to_string(),
            name: "Default Store".to_string(),
        }
    }
}

// =============================================================================
// Collection Names
// =============================================================================

/// Names of the remote collections. Used in log fields and error messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionNames {
    #[serde(default = "default_inventory")]
    pub inventory: String,

    #[serde(default = "default_orders")]
    pub orders: String,

    #[serde(default = "default_activity")]
    pub activity: String,

    #[serde(default = "default_stock_movements")]
    pub stock_movements: String,
}

fn default_inventory() -> String {
    "inventory".to_string()
}
fn default_orders() -> String {
    "orders".to_string()
}
fn default_activity() -> String {
    "activity".to_string()
}
fn default_stock_movements() -> String {
    "stockMovements".to_string()
}

impl Default for CollectionNames {
    fn default() -> Self {
        CollectionNames {
            inventory: default_inventory(),
            orders: default_orders(),
            activity: default_activity(),
            stock_movements: default_stock_movements(),
        }
    }
}

// =============================================================================
// Dashboard Settings
// =============================================================================

/// Behaviour of the dashboard agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Recompute on every snapshot. When off, new snapshots only mark the
    /// view stale until a manual recompute.
    #[serde(default = "default_true")]
    pub auto_compute: bool,

    /// Number of entries kept under "Recent Activity".
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,

    /// Period of the sales report attached to each view.
    #[serde(default)]
    pub report_period: ReportPeriod,
}

fn default_true() -> bool {
    true
}

fn default_activity_limit() -> usize {
    5
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            auto_compute: true,
            activity_limit: default_activity_limit(),
            report_period: ReportPeriod::default(),
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Snapshot files read by the `stockroom-report` binary. Each file holds a
/// JSON array of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_path: Option<PathBuf>,

    /// Stock movements to apply to the items before reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movements_path: Option<PathBuf>,
}

// =============================================================================
// Main Feed Configuration
// =============================================================================

/// Complete feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub collections: CollectionNames,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl FeedConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> FeedResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading feed config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> FeedResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| FeedError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FeedError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| FeedError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Feed config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FeedResult<()> {
        if self.store.id.trim().is_empty() {
            return Err(FeedError::InvalidConfig("store.id must not be empty".into()));
        }

        let names = [
            ("inventory", &self.collections.inventory),
            ("orders", &self.collections.orders),
            ("activity", &self.collections.activity),
            ("stock_movements", &self.collections.stock_movements),
        ];
        if let Some((key, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(FeedError::InvalidConfig(format!(
                "collections.{} must not be empty",
                key
            )));
        }

        if self.dashboard.activity_limit == 0 {
            return Err(FeedError::InvalidConfig(
                "activity_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOCKROOM_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged
    /// and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("STOCKROOM_STORE_ID") {
            debug!(store_id = %id, "Overriding store ID from environment");
            self.store.id = id;
        }

        if let Some(name) = lookup("STOCKROOM_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(flag) = lookup("STOCKROOM_AUTO_COMPUTE") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.dashboard.auto_compute = true,
                "0" | "false" | "no" | "off" => self.dashboard.auto_compute = false,
                _ => warn!(value = %flag, "Unknown auto-compute flag in environment"),
            }
        }

        if let Some(limit) = lookup("STOCKROOM_ACTIVITY_LIMIT") {
            match limit.parse::<usize>() {
                Ok(n) => self.dashboard.activity_limit = n,
                Err(_) => warn!(value = %limit, "Invalid activity limit in environment"),
            }
        }

        if let Some(period) = lookup("STOCKROOM_REPORT_PERIOD") {
            match period.parse::<ReportPeriod>() {
                Ok(p) => {
                    debug!(period = %p, "Overriding report period from environment");
                    self.dashboard.report_period = p;
                }
                Err(e) => warn!(error = %e, "Invalid report period in environment"),
            }
        }

        if let Some(path) = lookup("STOCKROOM_ITEMS_PATH") {
            self.report.items_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("STOCKROOM_ORDERS_PATH") {
            self.report.orders_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("STOCKROOM_ACTIVITY_PATH") {
            self.report.activity_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("STOCKROOM_MOVEMENTS_PATH") {
            self.report.movements_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "dashboard")
            .map(|dirs| dirs.config_dir().join("stockroom.toml"))
    }

    /// Returns the store ID.
    pub fn store_id(&self) -> &str {
        &self.store.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stockroom-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert!(config.dashboard.auto_compute);
        assert_eq!(config.dashboard.activity_limit, 5);
        assert_eq!(config.dashboard.report_period, ReportPeriod::All);
        assert_eq!(config.collections.stock_movements, "stockMovements");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FeedConfig::default();

        config.store.id = "  ".into();
        assert!(config.validate().unwrap_err().is_config_error());

        config.store.id = "main".into();
        config.collections.orders = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("collections.orders"));

        config.collections.orders = "orders".into();
        config.dashboard.activity_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: FeedConfig = toml::from_str(
            r#"
            [store]
            id = "north"

            [dashboard]
            report_period = "month"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_id(), "north");
        assert_eq!(config.store.name, "");
        assert_eq!(config.dashboard.report_period, ReportPeriod::Month);
        assert!(config.dashboard.auto_compute);
        assert_eq!(config.collections.inventory, "inventory");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STOCKROOM_STORE_ID", "south"),
            ("STOCKROOM_AUTO_COMPUTE", "off"),
            ("STOCKROOM_ACTIVITY_LIMIT", "12"),
            ("STOCKROOM_REPORT_PERIOD", "today"),
            ("STOCKROOM_ITEMS_PATH", "/tmp/items.json"),
        ]
        .into_iter()
        .collect();

        let mut config = FeedConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.store_id(), "south");
        assert!(!config.dashboard.auto_compute);
        assert_eq!(config.dashboard.activity_limit, 12);
        assert_eq!(config.dashboard.report_period, ReportPeriod::Today);
        assert_eq!(config.report.items_path, Some(PathBuf::from("/tmp/items.json")));
        assert_eq!(config.report.orders_path, None);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = FeedConfig::default();
        config.apply_overrides(|k| match k {
            "STOCKROOM_AUTO_COMPUTE" => Some("maybe".into()),
            "STOCKROOM_ACTIVITY_LIMIT" => Some("-1".into()),
            "STOCKROOM_REPORT_PERIOD" => Some("fortnight".into()),
            _ => None,
        });
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("config.toml");
        let mut config = FeedConfig::default();
        config.store.id = "east".into();
        config.dashboard.report_period = ReportPeriod::Week;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[dashboard]"));

        let loaded: FeedConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = temp_path("broken.toml");
        std::fs::write(&path, "[dashboard]\nactivity_limit = \"many\"\n").unwrap();

        let err = FeedConfig::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, FeedError::ConfigLoadFailed(_)));
        std::fs::remove_file(&path).ok();
    }
}
