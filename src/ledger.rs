// 🔒 Site Ledger - the four operations the outside world may call
//
//   add_entry     -> RosterStore::add
//   remove_cohort -> RosterStore::remove
//   clear_all     -> RosterStore::clear
//   get_report    -> snapshot -> aggregate -> format
//
// Every operation runs entirely under one lock, so a report never sees a
// half-applied mutation.

use crate::cohort::{aggregate, Cohort, CohortKey};
use crate::config::SiteConfig;
use crate::report::{EquipmentStatus, ReportFormatter, RosterTotals};
use crate::roster::{RosterError, RosterStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Everything a front end needs to render the current state
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    /// Cohorts in first-seen order
    pub cohorts: Vec<(CohortKey, Cohort)>,
    pub text: String,
    pub totals: RosterTotals,
    pub equipment: EquipmentStatus,
    pub generated_at: DateTime<Utc>,
}

impl SiteReport {
    /// Pretty JSON for machine consumers (CLI `--json`)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Cheap to clone; all clones share one store.
#[derive(Debug, Clone)]
pub struct SiteLedger {
    store: Arc<Mutex<RosterStore>>,
    formatter: Arc<ReportFormatter>,
}

impl SiteLedger {
    pub fn new(config: &SiteConfig) -> Self {
        SiteLedger {
            store: Arc::new(Mutex::new(RosterStore::new())),
            formatter: Arc::new(config.formatter()),
        }
    }

    // Each operation leaves the store consistent, so a poisoned lock is
    // still safe to reuse.
    fn lock(&self) -> MutexGuard<'_, RosterStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_entry(
        &self,
        affiliation: &str,
        representative: &str,
        count: i64,
        vehicle_label: &str,
    ) -> Result<String, RosterError> {
        let mut store = self.lock();

        let cohort_id = match store.add(affiliation, representative, count, vehicle_label) {
            Ok(cohort_id) => cohort_id,
            Err(e) => {
                warn!(affiliation, representative, count, error = %e, "entry rejected");
                return Err(e);
            }
        };

        info!(
            cohort_id = %cohort_id,
            count,
            on_site = store.len(),
            "entry checked in"
        );

        let equipment = self.formatter.equipment(&totals_of(&store));
        if equipment.is_short() {
            warn!(
                armbands_held = equipment.armbands_held,
                flags_held = equipment.flags_held,
                "on-site count exceeds equipment inventory"
            );
        }

        Ok(cohort_id)
    }

    pub fn remove_cohort(&self, cohort_id: &str) -> usize {
        let mut store = self.lock();
        let removed = store.remove(cohort_id);

        if removed == 0 {
            debug!(cohort_id, "no records for cohort, nothing removed");
        } else {
            info!(cohort_id, removed, on_site = store.len(), "cohort checked out");
        }

        removed
    }

    pub fn clear_all(&self) {
        let mut store = self.lock();
        let dropped = store.len();
        store.clear();

        info!(dropped, "roster cleared");
    }

    pub fn get_report(&self) -> SiteReport {
        let store = self.lock();

        let cohorts = aggregate(store.snapshot());
        let totals = totals_of(&store);
        let text = self.formatter.format(&cohorts, &totals);

        SiteReport {
            cohorts: cohorts.into_vec(),
            text,
            totals,
            equipment: self.formatter.equipment(&totals),
            generated_at: Utc::now(),
        }
    }
}

impl Default for SiteLedger {
    fn default() -> Self {
        Self::new(&SiteConfig::default())
    }
}

fn totals_of(store: &RosterStore) -> RosterTotals {
    RosterTotals {
        on_site: store.len(),
        vehicles_on_site: store.vehicle_count(),
        entrants_today: store.total_entrants_today(),
        exits_today: store.total_exits_today(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
