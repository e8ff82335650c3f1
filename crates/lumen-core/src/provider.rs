//! Provider contract between lighting integrations and the host
//!
//! Every device in the host is addressed by one flat string of the form
//! `<ProviderTag>|<provider-local id>`. The tag selects the provider, the
//! provider alone interprets the remainder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::geometry::BoundingBox;
use crate::settings::Settings;

/// Separator between the segments of a unique identifier
pub const UID_SEPARATOR: char = '|';

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No provider registered for tag {0}")]
    UnknownProvider(String),
}

/// Lighting integrations known to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    /// Philips Hue bridges
    Hue,
}

impl ProviderType {
    /// Human-readable tag used as the unique identifier prefix and settings group
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hue => "Hue",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hue" => Ok(Self::Hue),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

/// Split a unique identifier into its provider tag and the provider-local part
///
/// Returns `None` when the tag is missing or unknown.
pub fn split_provider_tag(uid: &str) -> Option<(ProviderType, &str)> {
    let (tag, rest) = uid.split_once(UID_SEPARATOR)?;
    let provider = tag.parse().ok()?;
    Some((provider, rest))
}

/// Capability interface of a single controllable endpoint
pub trait Device: fmt::Debug + Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Identifier unique within the provider, without the provider tag
    fn unique_id_internal(&self) -> String;

    /// Identifier unique across the whole host
    fn unique_id(&self) -> String {
        format!(
            "{}{}{}",
            self.provider_type(),
            UID_SEPARATOR,
            self.unique_id_internal()
        )
    }

    fn display_name(&self) -> &str;

    /// Volumes occupied by the device, used for spatial effects
    fn bounding_boxes(&self) -> Vec<BoundingBox>;
}

/// Shared handle to a device as handed out to the host
pub type DevicePtr = Arc<dyn Device>;

/// A light state change requested by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightUpdateParams {
    /// Unique identifiers of the devices to change; empty means all
    #[serde(default)]
    pub targets: Vec<String>,
    pub on: Option<bool>,
    /// Brightness in 0.0..=1.0
    pub brightness: Option<f32>,
    pub color: Option<[u8; 3]>,
    pub transition_ms: Option<u32>,
}

/// Contract every lighting integration implements for the host
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// All devices, in a deterministic order
    async fn devices(&self) -> Vec<DevicePtr>;

    /// Resolve a unique identifier; never fails, may return an orphan marker
    async fn device_from_unique_id(&self, id: &str) -> DevicePtr;

    async fn update(&self, params: &LightUpdateParams) -> Result<(), ProviderError>;

    async fn save(&self, settings: &mut Settings);

    async fn load(&self, settings: &Settings);
}

/// The set of providers active in the host, in registration order
#[derive(Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn DeviceProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any earlier one with the same tag
    pub fn register(&mut self, provider: Arc<dyn DeviceProvider>) {
        let tag = provider.provider_type();
        self.providers.retain(|p| p.provider_type() != tag);
        self.providers.push(provider);
    }

    pub fn get(&self, provider: ProviderType) -> Option<&Arc<dyn DeviceProvider>> {
        self.providers.iter().find(|p| p.provider_type() == provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Devices of every provider, provider by provider
    pub async fn devices(&self) -> Vec<DevicePtr> {
        let mut devices = Vec::new();
        for provider in &self.providers {
            devices.extend(provider.devices().await);
        }
        devices
    }

    /// Route a unique identifier to the provider owning its tag
    pub async fn device_from_unique_id(&self, id: &str) -> Option<DevicePtr> {
        let Some((tag, _)) = split_provider_tag(id) else {
            debug!(uid = %id, "Unique id has no known provider tag");
            return None;
        };
        let provider = self.get(tag)?;
        Some(provider.device_from_unique_id(id).await)
    }

    pub async fn update(&self, params: &LightUpdateParams) -> Result<(), ProviderError> {
        for provider in &self.providers {
            provider.update(params).await?;
        }
        Ok(())
    }

    pub async fn save_all(&self, settings: &mut Settings) {
        for provider in &self.providers {
            provider.save(settings).await;
        }
    }

    pub async fn load_all(&self, settings: &Settings) {
        for provider in &self.providers {
            provider.load(settings).await;
        }
    }
}
