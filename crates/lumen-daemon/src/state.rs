//! Application state management

use anyhow::{Context, Result};
use lumen_core::{DevicePtr, ProviderSet, Settings};
use lumen_hue::{HttpTransport, HueProvider, MergeSummary, StaticDiscovery};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Hue bridge registry
    pub hue: Arc<HueProvider>,
    /// Every provider the host knows about
    pub providers: ProviderSet,
    /// Configuration
    pub config: Config,
    settings_path: PathBuf,
}

impl AppState {
    /// Create application state and restore the registry from the settings file
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let transport = HttpTransport::new(Duration::from_secs(config.daemon.http_timeout_secs))
            .context("Failed to create HTTP client")?;
        let discovery = StaticDiscovery::new(config.bridges.clone());
        let hue = Arc::new(HueProvider::new(Arc::new(transport), Arc::new(discovery)));

        let mut providers = ProviderSet::new();
        providers.register(hue.clone());

        let settings_path = PathBuf::from(&config.daemon.settings_path);
        let settings = load_settings(&settings_path);
        providers.load_all(&settings).await;

        Ok(Arc::new(Self {
            hue,
            providers,
            config,
            settings_path,
        }))
    }

    /// Run one discovery pass, then refresh lights if configured
    pub async fn scan(&self) -> MergeSummary {
        let discovery = &self.config.discovery;
        let summary = self
            .hue
            .search_for_bridges(&discovery.manual_addresses, discovery.scan)
            .await;

        if self.config.daemon.refresh_devices {
            let refreshed = self.hue.refresh_devices().await;
            info!(bridges = refreshed, "Refreshed bridge lights");
        }
        summary
    }

    /// Resolve a unique identifier across all providers
    pub async fn resolve(&self, uid: &str) -> Option<DevicePtr> {
        self.providers.device_from_unique_id(uid).await
    }

    /// Persist every provider into the settings file, keeping unrelated groups
    ///
    /// An existing file that cannot be parsed is left alone and the save fails.
    pub async fn save(&self) -> Result<()> {
        let mut settings = Settings::load_or_create(&self.settings_path).with_context(|| {
            format!(
                "Refusing to overwrite unreadable settings file {}",
                self.settings_path.display()
            )
        })?;
        self.providers.save_all(&mut settings).await;
        settings
            .save(&self.settings_path)
            .with_context(|| format!("Failed to write {}", self.settings_path.display()))?;
        info!(path = %self.settings_path.display(), "Saved settings");
        Ok(())
    }
}

/// Load settings from file, or start empty if missing or unreadable
fn load_settings(path: &Path) -> Settings {
    match Settings::load_or_create(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load settings, starting empty");
            Settings::new()
        }
    }
}
