//! Neighbourhood to zone resolution.
//!
//! The lookup table is data, not code: the built-in table is the YAML file
//! `data/zones.yaml` embedded at compile time, and an operator can supply
//! another file of the same shape to extend it.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::debug;

use etl_common::{EtlError, EtlResult, Zone};

/// Built-in neighbourhood table.
const BUILTIN_ZONES_YAML: &str = include_str!("../data/zones.yaml");

/// Exact-match lookup from neighbourhood name to zone.
#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    entries: HashMap<String, Zone>,
}

impl ZoneTable {
    /// The table shipped with the crate.
    pub fn builtin() -> EtlResult<Self> {
        Self::from_yaml_str(BUILTIN_ZONES_YAML)
    }

    /// Load a table from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> EtlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::InvalidConfig(format!("Failed to read zone table {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a table grouped by zone:
    ///
    /// ```yaml
    /// South:
    ///   - Koramangala
    /// East:
    ///   - Indiranagar
    /// ```
    pub fn from_yaml_str(yaml: &str) -> EtlResult<Self> {
        let grouped: BTreeMap<Zone, Vec<String>> = serde_yaml::from_str(yaml)
            .map_err(|e| EtlError::InvalidConfig(format!("Invalid zone table: {}", e)))?;

        let mut table = Self::default();
        for (zone, names) in grouped {
            for name in names {
                table.insert(name, zone)?;
            }
        }

        debug!(entries = table.len(), "Loaded zone table");
        Ok(table)
    }

    /// Add an entry. A name can belong to only one zone, and the fallback
    /// label cannot be assigned explicitly.
    pub fn insert(&mut self, name: impl Into<String>, zone: Zone) -> EtlResult<()> {
        let name = name.into();
        if zone.is_fallback() {
            return Err(EtlError::InvalidConfig(format!(
                "'{}' cannot be mapped to the fallback zone {}",
                name, zone
            )));
        }
        if let Some(existing) = self.entries.get(&name) {
            if *existing != zone {
                return Err(EtlError::InvalidConfig(format!(
                    "'{}' is listed under both {} and {}",
                    name, existing, zone
                )));
            }
        }
        self.entries.insert(name, zone);
        Ok(())
    }

    /// Merge another table into this one; entries must not conflict.
    pub fn extend(&mut self, other: ZoneTable) -> EtlResult<()> {
        for (name, zone) in other.entries {
            self.insert(name, zone)?;
        }
        Ok(())
    }

    /// Resolve a neighbourhood. Unknown or missing names fall back to `Other`.
    pub fn resolve(&self, neighbourhood: Option<&str>) -> Zone {
        neighbourhood
            .and_then(|name| self.entries.get(name).copied())
            .unwrap_or(Zone::Other)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves neighbourhoods against a table and remembers the misses.
pub struct ZoneResolver<'a> {
    table: &'a ZoneTable,
    misses: HashMap<String, usize>,
    distribution: BTreeMap<Zone, usize>,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(table: &'a ZoneTable) -> Self {
        Self {
            table,
            misses: HashMap::new(),
            distribution: BTreeMap::new(),
        }
    }

    /// Resolve one neighbourhood, recording it if it hit the fallback.
    pub fn resolve(&mut self, neighbourhood: Option<&str>) -> Zone {
        let zone = self.table.resolve(neighbourhood);
        *self.distribution.entry(zone).or_default() += 1;

        // Missing neighbourhoods get the fallback too but have no name to report.
        if zone.is_fallback() {
            if let Some(name) = neighbourhood {
                *self.misses.entry(name.to_string()).or_default() += 1;
            }
        }
        zone
    }

    /// Names that fell back to `Other`, most frequent first.
    pub fn unmapped(&self) -> Vec<(String, usize)> {
        let mut misses: Vec<(String, usize)> = self
            .misses
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        misses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        misses
    }

    /// Number of rows resolved to each zone.
    pub fn distribution(&self) -> &BTreeMap<Zone, usize> {
        &self.distribution
    }
}
