//! Hierarchical settings store shared by all providers
//!
//! The store is a tree of named groups. A group is a record: scalar values
//! plus named, indexed arrays whose elements are records themselves. On disk
//! it is a TOML document, so a provider group `Hue` holding an array `bridges`
//! whose elements hold an array `devices` is written as `[[Hue.bridges]]` and
//! `[[Hue.bridges.devices]]`.
//!
//! Readers are lenient: missing scalars read as empty/zero, and an array
//! element that is not a record ends that array.

use std::path::Path;
use thiserror::Error;
use toml::{Table, Value};
use tracing::info;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Root of the settings tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    root: Table,
}

impl Settings {
    /// Create an empty settings tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let root: Table = toml::from_str(content)?;
        Ok(Self { root })
    }

    /// Render settings as TOML text
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(&self.root)?)
    }

    /// Load settings from a file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings or start empty if the file doesn't exist
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "Settings file not found, starting empty");
            Ok(Self::new())
        }
    }

    /// Save settings to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Read access to a group, `None` if absent or not a record
    pub fn group(&self, name: &str) -> Option<Record<'_>> {
        match self.root.get(name) {
            Some(Value::Table(table)) => Some(Record { table }),
            _ => None,
        }
    }

    /// Modify a group in place, creating it if needed
    pub fn update_group(&mut self, name: &str, fill: impl FnOnce(&mut RecordMut<'_>)) {
        let mut table = match self.root.remove(name) {
            Some(Value::Table(table)) => table,
            _ => Table::new(),
        };
        fill(&mut RecordMut { table: &mut table });
        self.root.insert(name.to_string(), Value::Table(table));
    }
}

/// Read-only view of one record
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
}

impl<'a> Record<'a> {
    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// String value, empty if missing; numbers and booleans are rendered
    pub fn string(&self, key: &str) -> String {
        match self.table.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Integer(i)) => i.to_string(),
            Some(Value::Float(f)) => f.to_string(),
            Some(Value::Boolean(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Unsigned value, zero if missing or out of range; numeric strings are accepted
    pub fn uint(&self, key: &str) -> u32 {
        match self.table.get(key) {
            Some(Value::Integer(i)) => u32::try_from(*i).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Number of elements stored under `key`, records or not
    pub fn array_len(&self, key: &str) -> usize {
        match self.table.get(key) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// Iterate the records of an indexed array, stopping at the first element
    /// that is not a record
    pub fn array(&self, key: &str) -> Records<'a> {
        let items = match self.table.get(key) {
            Some(Value::Array(items)) => Some(items.iter()),
            _ => None,
        };
        Records { items }
    }
}

/// Records of an indexed array, in index order
#[derive(Debug, Clone)]
pub struct Records<'a> {
    items: Option<std::slice::Iter<'a, Value>>,
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.items.as_mut()?.next() {
            Some(Value::Table(table)) => Some(Record { table }),
            Some(_) => {
                self.items = None;
                None
            }
            None => None,
        }
    }
}

/// Mutable view of one record
#[derive(Debug)]
pub struct RecordMut<'a> {
    table: &'a mut Table,
}

impl RecordMut<'_> {
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.table
            .insert(key.to_string(), Value::String(value.into()));
    }

    pub fn set_uint(&mut self, key: &str, value: u32) {
        self.table
            .insert(key.to_string(), Value::Integer(i64::from(value)));
    }

    /// Write an indexed array under `key`, replacing whatever was there
    pub fn write_array(&mut self, key: &str, fill: impl FnOnce(&mut ArrayWriter)) {
        let mut writer = ArrayWriter { items: Vec::new() };
        fill(&mut writer);
        self.table
            .insert(key.to_string(), Value::Array(writer.items));
    }
}

/// Appends records to an indexed array at the next free index
#[derive(Debug)]
pub struct ArrayWriter {
    items: Vec<Value>,
}

impl ArrayWriter {
    pub fn push_record(&mut self, fill: impl FnOnce(&mut RecordMut<'_>)) {
        let mut table = Table::new();
        fill(&mut RecordMut { table: &mut table });
        self.items.push(Value::Table(table));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
