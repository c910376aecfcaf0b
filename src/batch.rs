// 📥 Batch Loader - check-in batches from CSV
//
// Expected header: affiliation,name,count,vehicle
// `vehicle` may be empty or missing. Every row goes through the same
// `add_entry` path as the web form.

use crate::ledger::SiteLedger;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntryBatch {
    pub affiliation: String,

    #[serde(rename = "name")]
    pub representative: String,

    pub count: i64,

    #[serde(default)]
    pub vehicle: String,
}

pub fn load_batches(csv_path: &Path) -> Result<Vec<EntryBatch>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_batches(file)
}

pub fn read_batches<R: Read>(reader: R) -> Result<Vec<EntryBatch>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut batches = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        // +2: one for the header, one for 1-based lines
        let batch: EntryBatch =
            result.with_context(|| format!("Failed to deserialize batch on line {}", i + 2))?;
        batches.push(batch);
    }

    Ok(batches)
}

/// Check every batch in, in file order. Stops at the first rejected row.
pub fn apply_batches(ledger: &SiteLedger, batches: &[EntryBatch]) -> Result<Vec<String>> {
    let mut cohort_ids = Vec::with_capacity(batches.len());

    for (i, batch) in batches.iter().enumerate() {
        let cohort_id = ledger
            .add_entry(&batch.affiliation, &batch.representative, batch.count, &batch.vehicle)
            .with_context(|| format!("Batch on line {} rejected", i + 2))?;
        cohort_ids.push(cohort_id);
    }

    Ok(cohort_ids)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "affiliation,name,count,vehicle\n\
                          건설팀,김철수,3,12가3456\n\
                          전기팀,이영희,1,\n";

    #[test]
    fn test_read_batches() {
        let batches = read_batches(SAMPLE.as_bytes()).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[0],
            EntryBatch {
                affiliation: "건설팀".to_string(),
                representative: "김철수".to_string(),
                count: 3,
                vehicle: "12가3456".to_string(),
            }
        );
        assert_eq!(batches[1].vehicle, "");
    }

    #[test]
    fn test_missing_vehicle_column_defaults_to_empty() {
        let batches = read_batches("affiliation,name,count\n건설팀,김철수,2\n".as_bytes()).unwrap();
        assert_eq!(batches[0].vehicle, "");
    }

    #[test]
    fn test_non_numeric_count_names_the_line() {
        let err = read_batches("affiliation,name,count,vehicle\n건설팀,김철수,셋,\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_batches_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let batches = load_batches(file.path()).unwrap();
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn test_apply_batches_checks_everyone_in() {
        let ledger = SiteLedger::default();
        let batches = read_batches(SAMPLE.as_bytes()).unwrap();

        let cohort_ids = apply_batches(&ledger, &batches).unwrap();
        assert_eq!(cohort_ids, vec!["건설팀_김철수_12가3456", "전기팀_이영희_"]);

        let report = ledger.get_report();
        assert_eq!(report.totals.on_site, 4);
        assert!(report.text.contains("김철수 등 3명"));
        assert!(report.text.contains("이영희 1명"));
    }

    #[test]
    fn test_apply_batches_stops_at_invalid_row() {
        let ledger = SiteLedger::default();
        let batches = read_batches(
            "affiliation,name,count,vehicle\n건설팀,김철수,2,\n전기팀,이영희,0,\n설비팀,박민수,1,\n"
                .as_bytes(),
        )
        .unwrap();

        let err = apply_batches(&ledger, &batches).unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert_eq!(ledger.get_report().totals.on_site, 2);
    }
}
