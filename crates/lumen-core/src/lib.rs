//! Lumen Core - Provider contract, device capabilities, and settings store
//!
//! This crate provides the foundational types shared by every lighting provider:
//! - Provider tags and the unique identifier convention (`<Tag>|<provider-local id>`)
//! - The `Device` and `DeviceProvider` capability traits the host talks to
//! - Bounding geometry used by the host's spatial features
//! - A hierarchical, indexed settings store (groups, arrays, records)

pub mod geometry;
pub mod provider;
pub mod settings;

pub use geometry::BoundingBox;
pub use provider::{
    split_provider_tag, Device, DevicePtr, DeviceProvider, LightUpdateParams, ProviderError,
    ProviderSet, ProviderType, UID_SEPARATOR,
};
pub use settings::{ArrayWriter, Record, RecordMut, Records, Settings, SettingsError};
