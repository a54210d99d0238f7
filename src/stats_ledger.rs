//! Persisted play statistics: counters, experience, and recent history.
//!
//! Every operation is a whole-record read-modify-write against one storage
//! slot, mirroring how the browser front end keeps the record in a single
//! serialized value.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, warn};
use serde_json::Value;

use crate::catalog_cache::CatalogCache;
use crate::protocol::{CatalogItem, StatsRecord};
use crate::stats_store::StatsStore;

const STATS_SLOT_KEY: &str = "stats";
const XP_PER_PLAY: u64 = 10;
const XP_PER_LEVEL: u64 = 100;
const HISTORY_CAP: usize = 10;

/// Entry count used by top-played views when the caller has no preference.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Level implied by an experience total.
pub fn level_for_xp(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

/// Rebuilds a stats record from raw slot contents.
///
/// Each field is coerced independently so one corrupt field cannot discard
/// the rest: non-numeric `xp`/`lvl` fall back to 0/1, a non-object `counts`
/// and a non-array `history` fall back to empty.
fn record_from_slot(raw: &str) -> StatsRecord {
    let value: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
    let mut counts = BTreeMap::new();
    if let Some(entries) = value.get("counts").and_then(Value::as_object) {
        for (key, count) in entries {
            if let (Ok(id), Some(count)) = (key.parse::<i64>(), count.as_u64()) {
                counts.insert(id, count);
            }
        }
    }
    let history = value
        .get("history")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    StatsRecord {
        xp: value.get("xp").and_then(Value::as_u64).unwrap_or(0),
        lvl: value.get("lvl").and_then(Value::as_u64).unwrap_or(1),
        counts,
        history,
    }
}

fn find_item(items: &[CatalogItem], id: i64) -> Option<CatalogItem> {
    items.iter().find(|item| item.number == id).cloned()
}

/// Accumulates play events and derives catalog-joined views.
pub struct StatsLedger {
    store: StatsStore,
    catalog: Arc<CatalogCache>,
}

impl StatsLedger {
    /// Creates a ledger over persisted storage and the shared catalog cache.
    pub fn new(store: StatsStore, catalog: Arc<CatalogCache>) -> Self {
        Self { store, catalog }
    }

    /// Loads the persisted record, defaulting missing or unreadable state.
    pub fn read(&self) -> StatsRecord {
        match self.store.read_slot(STATS_SLOT_KEY) {
            Ok(Some(raw)) => record_from_slot(&raw),
            Ok(None) => StatsRecord::default(),
            Err(err) => {
                warn!("Stats read failed, using default record: {err}");
                StatsRecord::default()
            }
        }
    }

    /// Records one play of `id`: bumps its count, awards experience,
    /// recomputes the level, and moves `id` to the history front. The
    /// updated record is persisted whole; a write failure loses only this
    /// play.
    pub fn record_play(&self, id: i64) {
        let mut record = self.read();
        *record.counts.entry(id).or_insert(0) += 1;
        record.xp += XP_PER_PLAY;
        record.lvl = level_for_xp(record.xp);
        record.history.retain(|entry| *entry != id);
        record.history.insert(0, id);
        record.history.truncate(HISTORY_CAP);
        self.persist(&record);
    }

    /// Returns the most-played items, resolved against the catalog.
    ///
    /// Ids are ranked by descending play count, ties in ascending id order,
    /// cut to `limit`, then resolved; ids with no catalog entry are dropped.
    pub fn top_played(&self, limit: usize) -> Vec<CatalogItem> {
        let record = self.read();
        let mut ranked: Vec<(i64, u64)> = record.counts.into_iter().collect();
        ranked.sort_by(|(_, left), (_, right)| right.cmp(left)); // stable, input is id-ordered
        let snapshot = self.catalog.load();
        ranked
            .into_iter()
            .take(limit)
            .filter_map(|(id, _)| find_item(&snapshot.items, id))
            .collect()
    }

    /// Returns recently played items, most recent first. Ids with no
    /// catalog entry are dropped.
    pub fn history(&self) -> Vec<CatalogItem> {
        let record = self.read();
        let snapshot = self.catalog.load();
        record
            .history
            .iter()
            .filter_map(|id| find_item(&snapshot.items, *id))
            .collect()
    }

    /// Removes the persisted record; the next read is the default record.
    pub fn reset(&self) {
        if let Err(err) = self.store.delete_slot(STATS_SLOT_KEY) {
            error!("Stats reset failed: {err}");
        }
    }

    fn persist(&self, record: &StatsRecord) {
        let serialized = match serde_json::to_string(record) {
            Ok(serialized) => serialized,
            Err(err) => {
                error!("Stats record serialization failed: {err}");
                return;
            }
        };
        if let Err(err) = self.store.write_slot(STATS_SLOT_KEY, &serialized) {
            error!("Stats write failed, play not persisted: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::backends::CatalogBackend;
    use crate::catalog_cache::CatalogCache;
    use crate::protocol::{CatalogItem, StatsRecord};
    use crate::stats_store::StatsStore;

    use super::{level_for_xp, record_from_slot, StatsLedger};

    struct FixedBackend {
        items: Vec<CatalogItem>,
    }

    impl CatalogBackend for FixedBackend {
        fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, String> {
            Ok(self.items.clone())
        }
    }

    fn item(number: i64, name: &str) -> CatalogItem {
        CatalogItem {
            number,
            name: name.to_string(),
            category: None,
            device: None,
            link: None,
        }
    }

    fn ledger_with_catalog(items: Vec<CatalogItem>) -> StatsLedger {
        let cache = Arc::new(CatalogCache::new(Box::new(FixedBackend { items })));
        StatsLedger::new(StatsStore::open_in_memory().expect("open store"), cache)
    }

    #[test]
    fn test_first_read_returns_default_record() {
        let ledger = ledger_with_catalog(Vec::new());

        assert_eq!(ledger.read(), StatsRecord::default());
    }

    #[test]
    fn test_level_follows_floor_division_law() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
    }

    #[test]
    fn test_ten_plays_reach_level_two() {
        let ledger = ledger_with_catalog(Vec::new());

        for id in 1..=10 {
            ledger.record_play(id);
        }

        let record = ledger.read();
        assert_eq!(record.xp, 100);
        assert_eq!(record.lvl, 2);
        assert_eq!(record.counts.len(), 10);
    }

    #[test]
    fn test_repeat_plays_accumulate_counts_monotonically() {
        let ledger = ledger_with_catalog(Vec::new());

        ledger.record_play(7);
        ledger.record_play(7);
        ledger.record_play(3);

        let record = ledger.read();
        assert_eq!(record.counts.get(&7), Some(&2));
        assert_eq!(record.counts.get(&3), Some(&1));
        assert_eq!(record.xp, 30);
    }

    #[test]
    fn test_history_is_bounded_and_deduplicated() {
        let ledger = ledger_with_catalog(Vec::new());

        for id in 1..=11 {
            ledger.record_play(id);
        }
        assert_eq!(ledger.read().history, vec![11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);

        ledger.record_play(5);
        let record = ledger.read();
        assert_eq!(record.history, vec![5, 11, 10, 9, 8, 7, 6, 4, 3, 2]);
        assert_eq!(record.history.len(), 10);
    }

    #[test]
    fn test_top_played_ranks_by_count_and_drops_unresolved_ids() {
        let ledger = ledger_with_catalog(vec![item(1, "Orbit Dash"), item(2, "Night Parade")]);

        for _ in 0..5 {
            ledger.record_play(1);
            ledger.record_play(2);
        }
        ledger.record_play(2);
        // Id 99 is not in the catalog; it stays counted but never renders.
        ledger.record_play(99);

        let top: Vec<i64> = ledger
            .top_played(5)
            .iter()
            .map(|entry| entry.number)
            .collect();
        assert_eq!(top, vec![2, 1]);
    }

    #[test]
    fn test_top_played_cuts_to_limit_before_resolving() {
        let ledger = ledger_with_catalog(vec![item(1, "Orbit Dash"), item(2, "Night Parade")]);

        ledger.record_play(1);
        ledger.record_play(2);
        for _ in 0..3 {
            ledger.record_play(99);
        }

        // The unresolved heaviest id consumes the single slot.
        assert!(ledger.top_played(1).is_empty());
    }

    #[test]
    fn test_top_played_ties_resolve_in_ascending_id_order() {
        let ledger = ledger_with_catalog(vec![
            item(2, "Night Parade"),
            item(1, "Orbit Dash"),
            item(3, "Drift"),
        ]);

        for _ in 0..5 {
            ledger.record_play(2);
            ledger.record_play(1);
        }
        ledger.record_play(3);

        let top: Vec<i64> = ledger
            .top_played(2)
            .iter()
            .map(|entry| entry.number)
            .collect();
        assert_eq!(top, vec![1, 2]);
    }

    #[test]
    fn test_history_view_resolves_most_recent_first() {
        let ledger = ledger_with_catalog(vec![item(1, "Orbit Dash"), item(3, "Drift")]);

        ledger.record_play(1);
        ledger.record_play(99);
        ledger.record_play(3);

        let names: Vec<String> = ledger
            .history()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        assert_eq!(names, vec!["Drift".to_string(), "Orbit Dash".to_string()]);
    }

    #[test]
    fn test_reset_restores_default_record() {
        let ledger = ledger_with_catalog(Vec::new());

        for id in 1..=4 {
            ledger.record_play(id);
        }
        ledger.reset();

        assert_eq!(ledger.read(), StatsRecord::default());

        // Reset of an already-absent record is also a no-op.
        ledger.reset();
        assert_eq!(ledger.read(), StatsRecord::default());
    }

    #[test]
    fn test_record_from_slot_coerces_corrupt_fields_independently() {
        let record = record_from_slot(
            "{\"xp\":\"lots\",\"lvl\":[],\"counts\":[1,2],\"history\":[4,\"x\",2]}",
        );

        assert_eq!(record.xp, 0);
        assert_eq!(record.lvl, 1);
        assert!(record.counts.is_empty());
        assert_eq!(record.history, vec![4, 2]);
    }

    #[test]
    fn test_record_from_slot_defaults_on_unparseable_json() {
        assert_eq!(record_from_slot("###"), StatsRecord::default());
    }

    #[test]
    fn test_persisted_record_round_trips_through_the_slot_format() {
        let ledger = ledger_with_catalog(Vec::new());

        ledger.record_play(12);
        ledger.record_play(7);
        ledger.record_play(12);

        let record = ledger.read();
        let serialized = serde_json::to_string(&record).expect("serialize");
        assert_eq!(record_from_slot(&serialized), record);
    }
}
