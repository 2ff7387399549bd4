//! DNSBL zone registry.

use std::fmt;
use std::sync::Arc;

use crate::error::{CheckError, Result};

/// A DNSBL zone, e.g. `zen.spamhaus.org`.
///
/// Cheap to clone: every lookup record keeps its own handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zone {
    name: Arc<str>,
}

impl Zone {
    /// Create a zone from a domain suffix.
    ///
    /// Whitespace is trimmed and a single trailing `.` is dropped.
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if trimmed.is_empty() || trimmed.starts_with('.') || trimmed.contains("..") {
            return Err(CheckError::InvalidZone(name.to_string()));
        }
        Ok(Self {
            name: Arc::from(trimmed),
        })
    }

    /// Zone name as configured, without trailing dot
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered collection of zones to check every target against.
///
/// Registration order is the query submission order and the reporting order.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a zone
    pub fn add_zone(&mut self, name: &str) -> Result<()> {
        self.zones.push(Zone::new(name)?);
        Ok(())
    }

    /// Build a registry from names, in order
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.add_zone(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Number of configured zones
    #[must_use]
    pub fn count(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if no zone was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Iterate zones in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// Fail with [`CheckError::NoZones`] unless at least one zone exists.
    ///
    /// Must be called before any target is processed.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_empty() {
            Err(CheckError::NoZones)
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a ZoneRegistry {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
