//! Bridge discovery collaborator
//!
//! Discovery yields one batch of descriptors per search. The registry awaits
//! the batch and merges it on its own side of the lock, regardless of where
//! the search itself ran.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use tracing::{debug, warn};

use crate::bridge::{BridgeDescriptor, BridgeStatus};

/// Source of discovery batches
#[async_trait]
pub trait BridgeDiscovery: Send + Sync {
    /// Search for bridges; the returned batch may be empty
    async fn search(&self, manual_addresses: &[String], do_scan: bool) -> Vec<BridgeDescriptor>;
}

/// A bridge declared in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredBridge {
    /// Bridge id (e.g. "001788FFFE123456")
    pub id: String,
    pub address: Ipv4Addr,
    #[serde(default)]
    pub name: Option<String>,
    /// Application key obtained when the bridge was paired
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub clientkey: Option<String>,
}

impl ConfiguredBridge {
    fn descriptor(&self) -> BridgeDescriptor {
        let username = self.username.clone().unwrap_or_default();
        let status = if username.is_empty() {
            BridgeStatus::Discovered
        } else {
            BridgeStatus::Authenticated
        };
        BridgeDescriptor {
            id: self.id.clone(),
            address: self.address.into(),
            status,
            friendly_name: self.name.clone().unwrap_or_default(),
            username,
            clientkey: self.clientkey.clone().unwrap_or_default(),
        }
    }
}

/// Discovery backed by a fixed list of configured bridges
///
/// A scan announces every configured bridge. A manual address announces the
/// configured bridge at that address, or an unconfirmed placeholder when no
/// configured bridge lives there.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    bridges: Vec<ConfiguredBridge>,
}

impl StaticDiscovery {
    pub fn new(bridges: Vec<ConfiguredBridge>) -> Self {
        Self { bridges }
    }
}

#[async_trait]
impl BridgeDiscovery for StaticDiscovery {
    async fn search(&self, manual_addresses: &[String], do_scan: bool) -> Vec<BridgeDescriptor> {
        let mut found: Vec<BridgeDescriptor> = Vec::new();

        if do_scan {
            found.extend(self.bridges.iter().map(ConfiguredBridge::descriptor));
        }

        for address in manual_addresses {
            let ip = match address.trim().parse::<Ipv4Addr>() {
                Ok(ip) => ip,
                Err(e) => {
                    warn!(address = %address, error = %e, "Ignoring invalid manual address");
                    continue;
                }
            };

            let descriptor = self
                .bridges
                .iter()
                .find(|b| b.address == ip)
                .map(ConfiguredBridge::descriptor)
                .unwrap_or_else(|| BridgeDescriptor::placeholder(ip));

            let duplicate = found
                .iter()
                .any(|d| d.address == descriptor.address && d.id == descriptor.id);
            if !duplicate {
                found.push(descriptor);
            }
        }

        debug!(count = found.len(), do_scan, "Discovery search complete");
        found
    }
}
