//! Lumen Hue - Philips Hue provider
//!
//! This crate keeps the registry of known Hue bridges and their lights:
//! - Merging discovery batches into the registry without losing identity
//! - Encoding and resolving the `Hue|<bridge>|<light>` unique identifiers
//! - Persisting the registry into the shared settings store and back
//! - Refreshing each authenticated bridge's light list over HTTP

pub mod bridge;
pub mod discovery;
pub mod light;
pub mod merge;
pub mod persist;
pub mod provider;
pub mod transport;
pub mod uid;

pub use bridge::{Bridge, BridgeDescriptor, BridgeStatus};
pub use discovery::{BridgeDiscovery, ConfiguredBridge, StaticDiscovery};
pub use light::{Light, INVALID_ID, ORPHANED_LIGHT_NAME};
pub use merge::{merge_discovered, MergeSummary};
pub use provider::HueProvider;
pub use transport::{BridgeTransport, HttpTransport, OfflineTransport, TransportError};
