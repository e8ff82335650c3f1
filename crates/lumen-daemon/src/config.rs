//! Configuration loading

use anyhow::Result;
use lumen_hue::ConfiguredBridge;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default, rename = "bridge")]
    pub bridges: Vec<ConfiguredBridge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Where the bridge registry is persisted
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
    /// Discovery scan interval in seconds (0 disables periodic scans)
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    /// Fetch light lists from authenticated bridges after each scan
    #[serde(default = "default_true")]
    pub refresh_devices: bool,
    /// Timeout for bridge HTTP requests
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            scan_interval_secs: default_scan_interval(),
            refresh_devices: true,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_settings_path() -> String {
    "./lumen-settings.toml".to_string()
}

fn default_scan_interval() -> u64 {
    60
}

fn default_http_timeout() -> u64 {
    lumen_hue::transport::DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Announce configured bridges on every scan
    #[serde(default = "default_true")]
    pub scan: bool,
    /// Addresses entered by hand; unknown ones become placeholders
    #[serde(default)]
    pub manual_addresses: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            scan: true,
            manual_addresses: Vec::new(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(
            path = %path.display(),
            bridges = config.bridges.len(),
            "Loaded configuration"
        );
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save an example configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        daemon: DaemonConfig::default(),
        discovery: DiscoveryConfig {
            scan: true,
            manual_addresses: vec!["192.168.1.20".to_string()],
        },
        bridges: vec![ConfiguredBridge {
            id: "001788FFFE123456".to_string(),
            address: Ipv4Addr::new(192, 168, 1, 10),
            name: Some("Living room".to_string()),
            username: None,
            clientkey: None,
        }],
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
