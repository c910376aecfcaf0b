// 🪪 Roster Store - who is on site right now
//
// One EntryRecord per physical person. Records are only created by `add`
// and only destroyed by `remove` (by cohort id) or `clear`.
//
// Counters:
//   total_entrants_today += batch size      (add)
//   total_exits_today    += records removed (remove)
//   both reset to zero                      (clear)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// Missing required field or non-positive head count.
    /// The store is left untouched when this is returned.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl RosterError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RosterError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// ENTRY RECORD
// ============================================================================

/// One person currently on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Stable identity of this record (UUID). Not used for grouping or removal.
    pub id: String,

    /// Organization the person belongs to
    pub affiliation: String,

    /// Named lead the batch was entered under
    pub representative: String,

    /// Vehicle label, only on the vehicle-bearer of a batch
    pub vehicle: Option<String>,

    /// True for exactly the first record of a batch that declared a vehicle
    pub has_vehicle: bool,

    /// Shared by every record of the same `add` call
    pub cohort_id: String,

    pub entered_at: DateTime<Utc>,
}

/// Derive the removal key for a batch.
///
/// `affiliation + "_" + representative + "_" + vehicle_label`, with the
/// vehicle label taken verbatim. Two batches with identical inputs collide
/// and are removed together.
pub fn derive_cohort_id(affiliation: &str, representative: &str, vehicle_label: &str) -> String {
    format!("{}_{}_{}", affiliation, representative, vehicle_label)
}

// ============================================================================
// ROSTER STORE
// ============================================================================

#[derive(Debug, Default)]
pub struct RosterStore {
    records: Vec<EntryRecord>,
    total_entrants_today: u64,
    total_exits_today: u64,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a batch in and return its cohort id.
    ///
    /// Appends `count` records. The first one carries the vehicle when
    /// `vehicle_label` is non-blank; the rest carry none.
    pub fn add(
        &mut self,
        affiliation: &str,
        representative: &str,
        count: i64,
        vehicle_label: &str,
    ) -> Result<String, RosterError> {
        if affiliation.trim().is_empty() {
            return Err(RosterError::invalid("affiliation", "must not be empty"));
        }
        if representative.trim().is_empty() {
            return Err(RosterError::invalid("representative", "must not be empty"));
        }
        if count < 1 {
            return Err(RosterError::invalid(
                "count",
                format!("must be at least 1, got {}", count),
            ));
        }
        // Only reachable where usize is narrower than i64
        let count = usize::try_from(count).map_err(|_| {
            RosterError::invalid(
                "count",
                format!("{} exceeds this platform's address space ({})", count, usize::MAX),
            )
        })?;

        let cohort_id = derive_cohort_id(affiliation, representative, vehicle_label);
        let declares_vehicle = !vehicle_label.trim().is_empty();
        let now = Utc::now();

        for i in 0..count {
            let bearer = i == 0 && declares_vehicle;
            self.records.push(EntryRecord {
                id: uuid::Uuid::new_v4().to_string(),
                affiliation: affiliation.to_string(),
                representative: representative.to_string(),
                vehicle: bearer.then(|| vehicle_label.to_string()),
                has_vehicle: bearer,
                cohort_id: cohort_id.clone(),
                entered_at: now,
            });
        }

        self.total_entrants_today += count as u64;
        Ok(cohort_id)
    }

    /// Check out every record sharing `cohort_id`. Unknown ids remove nothing.
    pub fn remove(&mut self, cohort_id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|rec| rec.cohort_id != cohort_id);
        let removed = before - self.records.len();

        self.total_exits_today += removed as u64;
        removed
    }

    /// Empty the store and zero both counters.
    pub fn clear(&mut self) {
        self.records.clear();
        self.total_entrants_today = 0;
        self.total_exits_today = 0;
    }

    /// Current records in insertion order
    pub fn snapshot(&self) -> &[EntryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of vehicle-bearing records on site
    pub fn vehicle_count(&self) -> usize {
        self.records.iter().filter(|rec| rec.has_vehicle).count()
    }

    pub fn total_entrants_today(&self) -> u64 {
        self.total_entrants_today
    }

    pub fn total_exits_today(&self) -> u64 {
        self.total_exits_today
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_marks_only_first_record_as_vehicle_bearer() {
        let mut store = RosterStore::new();

        let cohort_id = store.add("건설팀", "김철수", 3, "12가3456").unwrap();

        assert_eq!(cohort_id, "건설팀_김철수_12가3456");
        assert_eq!(store.len(), 3);
        assert_eq!(store.vehicle_count(), 1);

        let records = store.snapshot();
        assert!(records[0].has_vehicle);
        assert_eq!(records[0].vehicle.as_deref(), Some("12가3456"));
        assert!(records[1..].iter().all(|r| !r.has_vehicle && r.vehicle.is_none()));
        assert!(records.iter().all(|r| r.cohort_id == cohort_id));
        assert_eq!(store.total_entrants_today(), 3);
    }

    #[test]
    fn test_add_with_blank_vehicle_has_no_bearer() {
        let mut store = RosterStore::new();

        let cohort_id = store.add("전기팀", "이영희", 2, "   ").unwrap();

        // Label kept verbatim in the id even though it declares nothing
        assert_eq!(cohort_id, "전기팀_이영희_   ");
        assert_eq!(store.vehicle_count(), 0);
        assert!(store.snapshot().iter().all(|r| r.vehicle.is_none()));
    }

    #[test]
    fn test_add_rejects_invalid_input_without_mutation() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 1, "").unwrap();

        let zero = store.add("건설팀", "김철수", 0, "");
        assert!(matches!(zero, Err(RosterError::InvalidInput { field: "count", .. })));

        let negative = store.add("건설팀", "김철수", -4, "");
        assert!(matches!(negative, Err(RosterError::InvalidInput { field: "count", .. })));

        let no_affiliation = store.add("  ", "김철수", 2, "");
        assert!(matches!(
            no_affiliation,
            Err(RosterError::InvalidInput { field: "affiliation", .. })
        ));

        let no_representative = store.add("건설팀", "", 2, "");
        assert!(matches!(
            no_representative,
            Err(RosterError::InvalidInput { field: "representative", .. })
        ));

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_entrants_today(), 1);
        assert_eq!(store.total_exits_today(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = RosterStore::new();
        let cohort_id = store.add("건설팀", "김철수", 4, "").unwrap();

        assert_eq!(store.remove(&cohort_id), 4);
        assert_eq!(store.remove(&cohort_id), 0);

        assert!(store.is_empty());
        assert_eq!(store.total_entrants_today(), 4);
        assert_eq!(store.total_exits_today(), 4);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 2, "").unwrap();

        assert_eq!(store.remove("nobody_here_"), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_exits_today(), 0);
    }

    #[test]
    fn test_remove_only_touches_matching_cohort() {
        let mut store = RosterStore::new();
        let first = store.add("건설팀", "김철수", 2, "12가3456").unwrap();
        store.add("건설팀", "김철수", 3, "").unwrap();
        store.add("전기팀", "이영희", 1, "").unwrap();

        assert_eq!(store.remove(&first), 2);

        assert_eq!(store.len(), 4);
        assert!(store.snapshot().iter().all(|r| r.cohort_id != first));
        assert_eq!(store.vehicle_count(), 0);
    }

    #[test]
    fn test_colliding_cohort_ids_are_removed_together() {
        let mut store = RosterStore::new();
        let a = store.add("건설팀", "김철수", 2, "").unwrap();
        let b = store.add("건설팀", "김철수", 3, "").unwrap();
        assert_eq!(a, b);

        assert_eq!(store.remove(&a), 5);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = RosterStore::new();
        let cohort_id = store.add("건설팀", "김철수", 3, "12가3456").unwrap();
        store.remove(&cohort_id);
        store.add("전기팀", "이영희", 2, "").unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.total_entrants_today(), 0);
        assert_eq!(store.total_exits_today(), 0);

        // Clearing an empty store is fine too
        store.clear();
        assert!(store.is_empty());
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_count_beyond_address_space_names_platform_limit() {
        let mut store = RosterStore::new();

        let result = store.add("건설팀", "김철수", i64::from(u32::MAX) + 1, "");

        match result {
            Err(RosterError::InvalidInput { field, reason }) => {
                assert_eq!(field, "count");
                assert!(reason.contains("address space"));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(store.is_empty());
        assert_eq!(store.total_entrants_today(), 0);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let mut store = RosterStore::new();
        store.add("건설팀", "김철수", 5, "").unwrap();

        let mut ids: Vec<&str> = store.snapshot().iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
