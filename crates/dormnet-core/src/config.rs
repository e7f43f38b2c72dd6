//! Configuration resolution for DormNet.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/dormnet/settings.json)
//! 3. Project config (.dormnet/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dormnet_gwn::GwnConfig;
use dormnet_gwn::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

use crate::error::{Error, Result};

/// Complete DormNet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gwn: GwnConfig,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub vouchers: VoucherSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gwn: GwnConfig::default(),
            database: DatabaseSettings::default(),
            vouchers: VoucherSettings::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Local database settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseSettings {
    /// Database file path; the binary falls back to the per-OS default
    /// when unset.
    pub path: Option<PathBuf>,
}

/// Voucher issuing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherSettings {
    /// Controller voucher group new vouchers are created in.
    pub group_id: String,
    /// Voucher validity in days.
    pub duration_days: u32,
    /// How many devices may share one voucher code.
    pub device_limit: u32,
}

impl Default for VoucherSettings {
    fn default() -> Self {
        Self {
            group_id: String::new(),
            duration_days: 31,
            device_limit: 1,
        }
    }
}

/// Configuration source priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    Default = 0,
    Global = 1,
    Project = 2,
    Environment = 3,
    Cli = 4,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load global config
    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // Load project config
    if let Some(dir) = project_dir {
        let project_path = dir.join(".dormnet").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".dormnet").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/dormnet/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("dormnet").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Merge an overlay into `base`.
///
/// GWN credentials and other "identity" fields are merged individually so a
/// project file that only sets the database path cannot wipe credentials
/// loaded from the global file.
fn merge_config(base: &mut Config, overlay: Config) {
    merge_gwn(&mut base.gwn, overlay.gwn);

    if overlay.database.path.is_some() {
        base.database.path = overlay.database.path;
    }

    if !overlay.vouchers.group_id.is_empty() {
        base.vouchers.group_id = overlay.vouchers.group_id;
    }
    base.vouchers.duration_days = overlay.vouchers.duration_days;
    base.vouchers.device_limit = overlay.vouchers.device_limit;

    base.log_level = overlay.log_level;
}

fn merge_gwn(base: &mut GwnConfig, overlay: GwnConfig) {
    if overlay.base_url != DEFAULT_BASE_URL {
        base.base_url = overlay.base_url;
    }
    if !overlay.app_id.is_empty() {
        base.app_id = overlay.app_id;
    }
    if !overlay.app_secret.is_empty() {
        base.app_secret = overlay.app_secret;
    }
    if !overlay.network_id.is_empty() {
        base.network_id = overlay.network_id;
    }
    if overlay.access_token.is_some() {
        base.access_token = overlay.access_token;
    }
    if overlay.timeout_secs != DEFAULT_TIMEOUT_SECS {
        base.timeout_secs = overlay.timeout_secs;
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("DORMNET_GWN_BASE_URL") {
        config.gwn.base_url = val;
    }
    if let Ok(val) = std::env::var("DORMNET_GWN_APP_ID") {
        config.gwn.app_id = val;
    }
    if let Ok(val) = std::env::var("DORMNET_GWN_APP_SECRET") {
        config.gwn.app_secret = val;
    }
    if let Ok(val) = std::env::var("DORMNET_GWN_NETWORK_ID") {
        config.gwn.network_id = val;
    }
    if let Ok(val) = std::env::var("DORMNET_GWN_ACCESS_TOKEN") {
        config.gwn.access_token = Some(val);
    }
    if let Ok(val) = std::env::var("DORMNET_DB_PATH") {
        config.database.path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("DORMNET_VOUCHER_GROUP") {
        config.vouchers.group_id = val;
    }
    if let Ok(val) = std::env::var("DORMNET_LOG_LEVEL") {
        config.log_level = val;
    }
}
