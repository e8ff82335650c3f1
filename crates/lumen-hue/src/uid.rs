//! Hue unique identifiers
//!
//! Format: `Hue|<bridge id>|<vendor unique id>`, or
//! `Hue|<bridge id>|<name><type>` when the bridge has not reported a vendor id.
//! The fallback is neither guaranteed unique nor stable across renames.

use lumen_core::{split_provider_tag, ProviderType, UID_SEPARATOR};

/// Provider-local part of a light's identifier (everything after `Hue|`)
pub fn encode_internal(bridge_id: &str, vendor_id: &str, name: &str, device_type: &str) -> String {
    if !vendor_id.is_empty() {
        format!("{}{}{}", bridge_id, UID_SEPARATOR, vendor_id)
    } else {
        format!("{}{}{}{}", bridge_id, UID_SEPARATOR, name, device_type)
    }
}

/// Full host-wide identifier
pub fn encode(bridge_id: &str, vendor_id: &str, name: &str, device_type: &str) -> String {
    format!(
        "{}{}{}",
        ProviderType::Hue,
        UID_SEPARATOR,
        encode_internal(bridge_id, vendor_id, name, device_type)
    )
}

/// Bridge id segment of a Hue identifier, `None` if the identifier isn't tagged `Hue`
pub fn bridge_id_of(uid: &str) -> Option<&str> {
    match split_provider_tag(uid)? {
        (ProviderType::Hue, rest) => Some(
            rest.split_once(UID_SEPARATOR)
                .map_or(rest, |(bridge_id, _)| bridge_id),
        ),
    }
}
