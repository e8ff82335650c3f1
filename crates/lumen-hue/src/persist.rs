//! Mapping between the bridge registry and the settings store
//!
//! Layout, under the `Hue` group:
//!
//! ```toml
//! [[Hue.bridges]]
//! id = "001788FFFE123456"
//! address = 3232235786
//! username = "..."
//! clientkey = "..."
//! friendlyName = "Living room"
//!
//! [[Hue.bridges.devices]]
//! uniqueid = "00:17:88:01:00:bd:c7:b9-0b"
//! id = 1
//! bridgeid = "001788FFFE123456"
//! name = "Desk"
//! type = "Extended color light"
//! productname = "Hue color lamp"
//! ```

use lumen_core::{ProviderType, Record, RecordMut, Settings};
use std::sync::Arc;
use tracing::debug;

use crate::bridge::{Bridge, BridgeStatus};
use crate::light::{Light, INVALID_ID};
use crate::transport::BridgeTransport;

pub const BRIDGES_KEY: &str = "bridges";
pub const DEVICES_KEY: &str = "devices";

/// Write every bridge with a non-empty id, replacing the stored bridge array
///
/// Returns the number of bridges written.
pub fn save_bridges(bridges: &[Bridge], settings: &mut Settings) -> usize {
    let mut written = 0;
    settings.update_group(ProviderType::Hue.as_str(), |group| {
        group.write_array(BRIDGES_KEY, |array| {
            for bridge in bridges.iter().filter(|b| b.is_persistable()) {
                array.push_record(|record| write_bridge(bridge, record));
            }
            written = array.len();
        });
    });
    debug!(
        written,
        skipped = bridges.len() - written,
        "Saved bridges to settings"
    );
    written
}

fn write_bridge(bridge: &Bridge, record: &mut RecordMut<'_>) {
    record.set_string("id", bridge.id.as_str());
    record.set_uint("address", bridge.address);
    record.set_string("username", bridge.username.as_str());
    record.set_string("clientkey", bridge.clientkey.as_str());
    record.set_string("friendlyName", bridge.friendly_name.as_str());
    record.write_array(DEVICES_KEY, |devices| {
        for light in &bridge.devices {
            devices.push_record(|d| write_light(light, d));
        }
    });
}

fn write_light(light: &Light, record: &mut RecordMut<'_>) {
    record.set_string("uniqueid", light.uniqueid.as_str());
    record.set_uint("id", light.id);
    record.set_string("bridgeid", light.bridgeid.as_str());
    record.set_string("name", light.name.as_str());
    record.set_string("type", light.device_type.as_str());
    record.set_string("productname", light.productname.as_str());
}

/// Rebuild bridges from settings, in stored order
///
/// Missing values read as empty/zero. An array element that cannot be read
/// ends that array; the elements before it are kept.
pub fn load_bridges(settings: &Settings, transport: &Arc<dyn BridgeTransport>) -> Vec<Bridge> {
    let Some(group) = settings.group(ProviderType::Hue.as_str()) else {
        debug!("No Hue settings group");
        return Vec::new();
    };

    group
        .array(BRIDGES_KEY)
        .map(|record| read_bridge(record, transport))
        .collect()
}

fn read_bridge(record: Record<'_>, transport: &Arc<dyn BridgeTransport>) -> Bridge {
    let mut bridge = Bridge::new(transport.clone(), record.string("id"), record.uint("address"));
    bridge.username = record.string("username");
    bridge.clientkey = record.string("clientkey");
    bridge.friendly_name = record.string("friendlyName");
    if !bridge.username.is_empty() {
        bridge.status = BridgeStatus::Authenticated;
    }
    bridge.devices = record.array(DEVICES_KEY).map(read_light).collect();
    bridge
}

fn read_light(record: Record<'_>) -> Light {
    let id = if record.contains("id") {
        record.uint("id")
    } else {
        INVALID_ID
    };
    Light {
        uniqueid: record.string("uniqueid"),
        id,
        bridgeid: record.string("bridgeid"),
        name: record.string("name"),
        device_type: record.string("type"),
        productname: record.string("productname"),
        reachable: false,
    }
}
