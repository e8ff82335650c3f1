//! Hue lights

use lumen_core::{BoundingBox, Device, ProviderType};
use serde::{Deserialize, Serialize};

use crate::uid;

/// Sentinel for a light whose bridge-local id is not assigned
pub const INVALID_ID: u32 = u32::MAX;

/// Name given to the placeholder returned for unresolvable identifiers
pub const ORPHANED_LIGHT_NAME: &str = "ORPHANED LIGHT";

/// A light exposed by a Hue bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    /// Vendor-issued stable id (e.g. `00:17:88:01:00:bd:c7:b9-0b`), may be empty
    pub uniqueid: String,
    /// Bridge-local numeric id, `INVALID_ID` when unassigned
    pub id: u32,
    /// Id of the owning bridge
    pub bridgeid: String,
    pub name: String,
    /// Vendor device type (e.g. "Extended color light")
    pub device_type: String,
    pub productname: String,
    pub reachable: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            uniqueid: String::new(),
            id: INVALID_ID,
            bridgeid: String::new(),
            name: String::new(),
            device_type: String::new(),
            productname: String::new(),
            reachable: false,
        }
    }
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for an identifier that no longer resolves
    pub fn orphan() -> Self {
        Self {
            name: ORPHANED_LIGHT_NAME.to_string(),
            ..Self::default()
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.bridgeid.is_empty() && self.name == ORPHANED_LIGHT_NAME
    }
}

impl Device for Light {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Hue
    }

    fn unique_id_internal(&self) -> String {
        uid::encode_internal(&self.bridgeid, &self.uniqueid, &self.name, &self.device_type)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn bounding_boxes(&self) -> Vec<BoundingBox> {
        vec![BoundingBox::unit_cube()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_light() {
        let light = Light::new();
        assert_eq!(light.id, INVALID_ID);
        assert!(!light.reachable);
        assert!(light.uniqueid.is_empty());
    }

    #[test]
    fn test_unique_id() {
        let mut light = Light {
            uniqueid: "abcd".to_string(),
            bridgeid: "B1".to_string(),
            name: "desk".to_string(),
            device_type: "Color light".to_string(),
            ..Light::default()
        };
        assert_eq!(light.unique_id(), "Hue|B1|abcd");

        light.uniqueid.clear();
        assert_eq!(light.unique_id(), "Hue|B1|deskColor light");
    }

    #[test]
    fn test_orphan() {
        let orphan = Light::orphan();
        assert!(orphan.is_orphan());
        assert_eq!(orphan.display_name(), "ORPHANED LIGHT");
        assert_eq!(orphan.bounding_boxes(), vec![BoundingBox::unit_cube()]);
    }
}
