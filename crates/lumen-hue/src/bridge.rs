//! Hue bridges and the descriptors discovery produces for them

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::light::Light;
use crate::transport::{check_bridge_error, BridgeTransport, TransportError};

/// Connection state of a bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    /// Placeholder not yet confirmed on the network (e.g. a manual address)
    #[default]
    Undiscovered,
    /// Seen on the network, no credentials yet
    Discovered,
    /// Credentials obtained
    Authenticated,
}

/// What a discovery scan reports about one bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeDescriptor {
    pub id: String,
    /// IPv4 address in numeric form
    pub address: u32,
    pub status: BridgeStatus,
    pub friendly_name: String,
    pub username: String,
    pub clientkey: String,
}

impl BridgeDescriptor {
    /// Unconfirmed bridge at a manually entered address
    pub fn placeholder(address: Ipv4Addr) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }
}

/// A Hue bridge and the lights it owns
#[derive(Debug, Clone)]
pub struct Bridge {
    /// Vendor bridge id (MAC-derived); empty for transient placeholders
    pub id: String,
    /// IPv4 address in numeric form
    pub address: u32,
    pub username: String,
    pub clientkey: String,
    pub friendly_name: String,
    pub status: BridgeStatus,
    pub devices: Vec<Light>,
    transport: Arc<dyn BridgeTransport>,
}

impl Bridge {
    /// Create an undiscovered bridge with no credentials or devices
    pub fn new(transport: Arc<dyn BridgeTransport>, id: impl Into<String>, address: u32) -> Self {
        Self {
            id: id.into(),
            address,
            username: String::new(),
            clientkey: String::new(),
            friendly_name: String::new(),
            status: BridgeStatus::Undiscovered,
            devices: Vec::new(),
            transport,
        }
    }

    /// Build a bridge carrying exactly the state of a discovery descriptor
    pub fn from_descriptor(descriptor: BridgeDescriptor, transport: Arc<dyn BridgeTransport>) -> Self {
        Self {
            id: descriptor.id,
            address: descriptor.address,
            username: descriptor.username,
            clientkey: descriptor.clientkey,
            friendly_name: descriptor.friendly_name,
            status: descriptor.status,
            devices: Vec::new(),
            transport,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Bridges without an id are never persisted
    pub fn is_persistable(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == BridgeStatus::Authenticated && !self.username.is_empty()
    }

    /// Fetch the bridge's current light list, ordered by light id
    pub async fn fetch_lights(&self) -> Result<Vec<Light>, TransportError> {
        if !self.is_authenticated() {
            return Err(TransportError::Unauthenticated(self.id.clone()));
        }

        let path = format!("/api/{}/lights", self.username);
        let body = self.transport.get_json(self.ip(), &path).await?;
        check_bridge_error(&body)?;

        let lights = parse_lights(&self.id, &body)?;
        debug!(bridge = %self.id, count = lights.len(), "Fetched lights");
        Ok(lights)
    }
}

/// Light entry of the bridge's `/lights` resource
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiLight {
    name: String,
    #[serde(rename = "type")]
    device_type: String,
    productname: String,
    uniqueid: String,
    state: ApiLightState,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiLightState {
    reachable: bool,
}

/// Parse a `/lights` body (`{"<id>": {...}, ...}`) into lights owned by `bridge_id`
fn parse_lights(bridge_id: &str, body: &Value) -> Result<Vec<Light>, TransportError> {
    let entries = body
        .as_object()
        .ok_or_else(|| TransportError::InvalidResponse("lights is not an object".to_string()))?;

    let mut lights = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let Ok(id) = key.parse::<u32>() else {
            warn!(bridge = %bridge_id, key = %key, "Skipping light with non-numeric id");
            continue;
        };
        let api: ApiLight = match serde_json::from_value(entry.clone()) {
            Ok(api) => api,
            Err(e) => {
                warn!(bridge = %bridge_id, light = id, error = %e, "Skipping malformed light");
                continue;
            }
        };
        lights.push(Light {
            uniqueid: api.uniqueid,
            id,
            bridgeid: bridge_id.to_string(),
            name: api.name,
            device_type: api.device_type,
            productname: api.productname,
            reachable: api.state.reachable,
        });
    }
    lights.sort_by_key(|light| light.id);
    Ok(lights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::OfflineTransport;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct CannedTransport {
        body: Value,
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BridgeTransport for CannedTransport {
        async fn get_json(&self, _address: Ipv4Addr, path: &str) -> Result<Value, TransportError> {
            self.paths.lock().unwrap().push(path.to_string());
            Ok(self.body.clone())
        }
    }

    fn authenticated(transport: Arc<dyn BridgeTransport>) -> Bridge {
        let mut bridge = Bridge::new(transport, "B1", u32::from(Ipv4Addr::new(10, 0, 0, 2)));
        bridge.username = "user".to_string();
        bridge.status = BridgeStatus::Authenticated;
        bridge
    }

    #[test]
    fn test_from_descriptor() {
        let descriptor = BridgeDescriptor {
            id: "B1".to_string(),
            address: u32::from(Ipv4Addr::new(192, 168, 1, 10)),
            status: BridgeStatus::Discovered,
            friendly_name: "Hallway".to_string(),
            ..Default::default()
        };
        let bridge = Bridge::from_descriptor(descriptor, Arc::new(OfflineTransport));
        assert_eq!(bridge.id, "B1");
        assert_eq!(bridge.ip(), Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(bridge.status, BridgeStatus::Discovered);
        assert_eq!(bridge.friendly_name, "Hallway");
        assert!(bridge.devices.is_empty());
        assert!(bridge.is_persistable());
    }

    #[test]
    fn test_placeholder() {
        let placeholder = BridgeDescriptor::placeholder(Ipv4Addr::new(192, 168, 1, 20));
        assert!(placeholder.id.is_empty());
        assert_eq!(placeholder.status, BridgeStatus::Undiscovered);
        assert_eq!(placeholder.ip(), Ipv4Addr::new(192, 168, 1, 20));
    }

    #[tokio::test]
    async fn test_fetch_lights() {
        let transport = Arc::new(CannedTransport {
            body: json!({
                "10": {"name": "shelf", "type": "Dimmable light", "productname": "Hue white lamp",
                       "uniqueid": "00:17:88:01:00:aa:bb:cc-0b", "state": {"on": true, "reachable": true}},
                "2": {"name": "desk", "type": "Extended color light", "productname": "Hue color lamp",
                      "state": {"reachable": false}},
                "group": {"name": "ignored"}
            }),
            paths: Mutex::new(Vec::new()),
        });
        let bridge = authenticated(transport.clone());

        let lights = bridge.fetch_lights().await.unwrap();
        assert_eq!(transport.paths.lock().unwrap().as_slice(), ["/api/user/lights"]);
        assert_eq!(lights.len(), 2);

        assert_eq!(lights[0].id, 2);
        assert_eq!(lights[0].name, "desk");
        assert_eq!(lights[0].bridgeid, "B1");
        assert!(lights[0].uniqueid.is_empty());
        assert!(!lights[0].reachable);

        assert_eq!(lights[1].id, 10);
        assert_eq!(lights[1].device_type, "Dimmable light");
        assert_eq!(lights[1].productname, "Hue white lamp");
        assert!(lights[1].reachable);
    }

    #[tokio::test]
    async fn test_fetch_lights_bridge_error() {
        let transport = Arc::new(CannedTransport {
            body: json!([{"error": {"type": 1, "address": "/lights", "description": "unauthorized user"}}]),
            paths: Mutex::new(Vec::new()),
        });
        let bridge = authenticated(transport);
        assert!(matches!(
            bridge.fetch_lights().await,
            Err(TransportError::Bridge { code: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_lights_requires_credentials() {
        let bridge = Bridge::new(Arc::new(OfflineTransport), "B1", 0);
        assert!(matches!(
            bridge.fetch_lights().await,
            Err(TransportError::Unauthenticated(id)) if id == "B1"
        ));
    }
}
