//! The Hue provider: registry of bridges and their lights

use async_trait::async_trait;
use lumen_core::{
    Device, DevicePtr, DeviceProvider, LightUpdateParams, ProviderError, ProviderType, Settings,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::discovery::BridgeDiscovery;
use crate::light::Light;
use crate::merge::{merge_discovered, MergeSummary};
use crate::persist::{load_bridges, save_bridges};
use crate::transport::BridgeTransport;
use crate::uid;

/// Registry of known Hue bridges
///
/// Merges, loads and device refreshes hold the write lock for their whole
/// read-modify-write step; lookups share the read lock.
pub struct HueProvider {
    bridges: Arc<RwLock<Vec<Bridge>>>,
    transport: Arc<dyn BridgeTransport>,
    discovery: Arc<dyn BridgeDiscovery>,
}

impl HueProvider {
    /// Create an empty registry; `transport` is handed to every bridge it creates
    pub fn new(transport: Arc<dyn BridgeTransport>, discovery: Arc<dyn BridgeDiscovery>) -> Self {
        Self {
            bridges: Arc::new(RwLock::new(Vec::new())),
            transport,
            discovery,
        }
    }

    /// Run discovery and merge the resulting batch into the registry
    pub async fn search_for_bridges(&self, manual_addresses: &[String], do_scan: bool) -> MergeSummary {
        let found = self.discovery.search(manual_addresses, do_scan).await;
        if found.is_empty() {
            debug!("Discovery returned no bridges");
            return MergeSummary::default();
        }

        let mut bridges = self.bridges.write().await;
        let summary = merge_discovered(&mut bridges, found, &self.transport);
        info!(
            added = summary.added,
            promoted = summary.promoted,
            untouched = summary.untouched,
            total = bridges.len(),
            "Merged discovered bridges"
        );
        summary
    }

    /// Snapshot of the bridge list
    pub async fn bridges(&self) -> Vec<Bridge> {
        self.bridges.read().await.clone()
    }

    pub async fn bridge(&self, id: &str) -> Option<Bridge> {
        self.bridges.read().await.iter().find(|b| b.id == id).cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.bridges.read().await.is_empty()
    }

    /// All lights, bridge by bridge, in each bridge's order
    pub async fn lights(&self) -> Vec<Light> {
        self.bridges
            .read()
            .await
            .iter()
            .flat_map(|b| b.devices.iter().cloned())
            .collect()
    }

    /// Resolve a unique identifier, or return an orphan placeholder
    pub async fn light_from_unique_id(&self, id: &str) -> Light {
        let Some(bridge_id) = uid::bridge_id_of(id) else {
            debug!(uid = %id, "Not a Hue unique id");
            return Light::orphan();
        };

        let bridges = self.bridges.read().await;
        let found = bridges
            .iter()
            .filter(|b| b.id == bridge_id)
            .flat_map(|b| b.devices.iter())
            .find(|light| light.unique_id() == id);

        match found {
            Some(light) => light.clone(),
            None => {
                debug!(uid = %id, "Unique id did not resolve, returning orphan");
                Light::orphan()
            }
        }
    }

    /// Re-fetch the light list of every authenticated bridge
    ///
    /// Returns the number of bridges refreshed. A bridge whose fetch fails
    /// keeps its previous lights.
    pub async fn refresh_devices(&self) -> usize {
        let targets: Vec<Bridge> = self
            .bridges
            .read()
            .await
            .iter()
            .filter(|b| b.is_authenticated())
            .cloned()
            .collect();

        let mut fetched = Vec::with_capacity(targets.len());
        for bridge in &targets {
            match bridge.fetch_lights().await {
                Ok(lights) => fetched.push((bridge.id.clone(), lights)),
                Err(e) => warn!(bridge = %bridge.id, error = %e, "Failed to refresh lights"),
            }
        }

        let mut bridges = self.bridges.write().await;
        let mut refreshed = 0;
        for (id, lights) in fetched {
            if let Some(bridge) = bridges.iter_mut().find(|b| b.id == id) {
                bridge.devices = lights;
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Persist the registry; returns the number of bridges written
    pub async fn save_to(&self, settings: &mut Settings) -> usize {
        let bridges = self.bridges.read().await;
        save_bridges(&bridges, settings)
    }

    /// Restore the registry from settings; does nothing if bridges are already known
    ///
    /// Returns the number of bridges loaded.
    pub async fn load_from(&self, settings: &Settings) -> usize {
        let mut bridges = self.bridges.write().await;
        if !bridges.is_empty() {
            debug!(known = bridges.len(), "Registry not empty, skipping load");
            return 0;
        }

        *bridges = load_bridges(settings, &self.transport);
        let devices: usize = bridges.iter().map(|b| b.devices.len()).sum();
        info!(bridges = bridges.len(), devices, "Loaded bridges from settings");
        bridges.len()
    }
}

#[async_trait]
impl DeviceProvider for HueProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Hue
    }

    async fn devices(&self) -> Vec<DevicePtr> {
        self.lights()
            .await
            .into_iter()
            .map(|light| Arc::new(light) as DevicePtr)
            .collect()
    }

    async fn device_from_unique_id(&self, id: &str) -> DevicePtr {
        Arc::new(self.light_from_unique_id(id).await)
    }

    async fn update(&self, params: &LightUpdateParams) -> Result<(), ProviderError> {
        debug!(targets = params.targets.len(), "Light update requested, Hue control not handled here");
        Ok(())
    }

    async fn save(&self, settings: &mut Settings) {
        self.save_to(settings).await;
    }

    async fn load(&self, settings: &Settings) {
        self.load_from(settings).await;
    }
}
