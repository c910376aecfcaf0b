// Site Roster - Core Library
// Who is on site, grouped by affiliation and representative, plus the
// daily status report. Used by the CLI, the web server and tests.

pub mod roster;
pub mod cohort;
pub mod report;
pub mod config;
pub mod ledger;
pub mod batch;

// Re-export commonly used types
pub use roster::{derive_cohort_id, EntryRecord, RosterError, RosterStore};
pub use cohort::{aggregate, Cohort, CohortKey, CohortMap};
pub use report::{
    personnel_phrase, EquipmentStatus, ReportFormatter, RosterTotals,
    TOTAL_ARMBANDS, TOTAL_FLAGS, WORK_DESCRIPTION,
};
pub use config::{ConfigError, SiteConfig, DEFAULT_BIND_ADDR};
pub use ledger::{SiteLedger, SiteReport};
pub use batch::{apply_batches, load_batches, read_batches, EntryBatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
