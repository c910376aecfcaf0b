// 👥 Cohort Aggregator - group on-site records for display
//
// Key: (affiliation, representative)
// Order: first time each key is seen in the snapshot, never alphabetical.
//
// Pure function over a snapshot; the store is never touched.

use crate::roster::EntryRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// COHORT KEY & VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CohortKey {
    pub affiliation: String,
    pub representative: String,
}

impl CohortKey {
    pub fn new(affiliation: impl Into<String>, representative: impl Into<String>) -> Self {
        CohortKey {
            affiliation: affiliation.into(),
            representative: representative.into(),
        }
    }

    fn of(record: &EntryRecord) -> Self {
        CohortKey::new(record.affiliation.clone(), record.representative.clone())
    }
}

/// Computed view of every record sharing a key. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    /// Number of member records
    pub count: usize,

    /// One label per vehicle-bearing member, in snapshot order
    pub vehicles: Vec<String>,

    /// Cohort id of the last member processed (last write wins).
    /// When several batches share a key this only points at the latest one.
    pub cohort_id: String,
}

// ============================================================================
// ORDERED COHORT MAP
// ============================================================================

/// Insertion-ordered map from key to cohort.
#[derive(Debug, Clone, Default)]
pub struct CohortMap {
    entries: Vec<(CohortKey, Cohort)>,
    index: HashMap<CohortKey, usize>,
}

impl CohortMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cohort for `key`, appended at the end if the key is new
    fn entry_mut(&mut self, key: CohortKey) -> &mut Cohort {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, Cohort::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &CohortKey) -> Option<&Cohort> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CohortKey, &Cohort)> {
        self.entries.iter().map(|(key, cohort)| (key, cohort))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of member counts over all cohorts
    pub fn total_count(&self) -> usize {
        self.entries.iter().map(|(_, cohort)| cohort.count).sum()
    }

    pub fn into_vec(self) -> Vec<(CohortKey, Cohort)> {
        self.entries
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Group a snapshot into cohorts in a single pass.
pub fn aggregate(records: &[EntryRecord]) -> CohortMap {
    let mut cohorts = CohortMap::new();

    for record in records {
        let cohort = cohorts.entry_mut(CohortKey::of(record));
        cohort.count += 1;
        if let (true, Some(vehicle)) = (record.has_vehicle, &record.vehicle) {
            cohort.vehicles.push(vehicle.clone());
        }
        cohort.cohort_id = record.cohort_id.clone();
    }

    cohorts
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterStore;

    #[test]
    fn test_empty_snapshot_gives_empty_map() {
        let store = RosterStore::new();
        let cohorts = aggregate(store.snapshot());

        assert!(cohorts.is_empty());
        assert_eq!(cohorts.total_count(), 0);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let mut store = RosterStore::new();
        store.add("전기팀", "이영희", 1, "").unwrap();
        store.add("건설팀", "김철수", 2, "").unwrap();
        store.add("전기팀", "이영희", 3, "34나5678").unwrap();

        let cohorts = aggregate(store.snapshot());
        let keys: Vec<&CohortKey> = cohorts.iter().map(|(key, _)| key).collect();

        assert_eq!(
            keys,
            vec![&CohortKey::new("전기팀", "이영희"), &CohortKey::new("건설팀", "김철수")]
        );
        let first = cohorts.get(&CohortKey::new("전기팀", "이영희")).unwrap();
        assert_eq!(first.count, 4);
        assert_eq!(first.vehicles, vec!["34나5678".to_string()]);
    }

    #[test]
    fn test_vehicles_follow_snapshot_order() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 2, "12가3456").unwrap();
        store.add("건설팀", "김철수", 1, "").unwrap();
        store.add("건설팀", "김철수", 1, "99다0001").unwrap();

        let cohorts = aggregate(store.snapshot());
        let cohort = cohorts.get(&CohortKey::new("건설팀", "김철수")).unwrap();

        assert_eq!(cohort.count, 4);
        assert_eq!(cohort.vehicles, vec!["12가3456".to_string(), "99다0001".to_string()]);
    }

    #[test]
    fn test_cohort_id_is_last_write_wins() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 2, "12가3456").unwrap();
        let latest = store.add("건설팀", "김철수", 1, "").unwrap();

        let cohorts = aggregate(store.snapshot());
        let cohort = cohorts.get(&CohortKey::new("건설팀", "김철수")).unwrap();

        assert_eq!(cohort.cohort_id, latest);

        // Removing through the displayed id leaves the earlier batch on site
        assert_eq!(store.remove(&cohort.cohort_id), 1);
        let after = aggregate(store.snapshot());
        assert_eq!(after.get(&CohortKey::new("건설팀", "김철수")).unwrap().count, 2);
    }

    #[test]
    fn test_total_count_matches_snapshot_len() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 3, "12가3456").unwrap();
        store.add("전기팀", "이영희", 5, "").unwrap();
        store.add("설비팀", "박민수", 1, "56라7890").unwrap();

        let cohorts = aggregate(store.snapshot());
        assert_eq!(cohorts.total_count(), store.len());
        assert_eq!(cohorts.len(), 3);
    }
}
