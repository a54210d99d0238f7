//! Data records shared between the catalog and stats components.

use std::collections::BTreeMap;

/// One playable entry in the remote catalog.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogItem {
    /// Stable numeric identifier. The only join key between catalog and stats.
    pub number: i64,
    /// Display name.
    pub name: String,
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Target platform labels.
    #[serde(default)]
    pub device: Option<Vec<String>>,
    /// Launch path relative to the provider base URL.
    #[serde(default)]
    pub link: Option<String>,
}

/// Persisted play statistics, stored whole as one JSON document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StatsRecord {
    /// Accumulated experience points. Never decreases.
    pub xp: u64,
    /// Level derived from `xp`. Recomputed after every mutation, never set
    /// independently.
    pub lvl: u64,
    /// Play count per item id.
    pub counts: BTreeMap<i64, u64>,
    /// Played ids, most recent first, deduplicated, at most 10 entries.
    pub history: Vec<i64>,
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self {
            xp: 0,
            lvl: 1,
            counts: BTreeMap::new(),
            history: Vec::new(),
        }
    }
}
