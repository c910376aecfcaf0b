// 📋 Report Formatter - the daily on-site status report
//
// Layout:
//   header
//   per cohort: affiliation, personnel, vehicles, blank
//   armband / flag holdings and issued counts
//   work description
//   running totals
//   closing line
//
// Remainders are never clamped: more people than armbands shows up as a
// negative holding.

use crate::cohort::CohortMap;
use serde::{Deserialize, Serialize};

/// Blue armbands in stock (one per person on site)
pub const TOTAL_ARMBANDS: i64 = 13;

/// Blue hand flags in stock (one per vehicle-bearing entry)
pub const TOTAL_FLAGS: i64 = 10;

pub const WORK_DESCRIPTION: &str = "면회실 공사 작업";

// ============================================================================
// REPORT INPUTS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTotals {
    /// Records currently on site
    pub on_site: usize,

    /// Vehicle-bearing records currently on site
    pub vehicles_on_site: usize,

    pub entrants_today: u64,
    pub exits_today: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentStatus {
    pub armbands_issued: i64,
    pub armbands_held: i64,
    pub flags_issued: i64,
    pub flags_held: i64,
}

impl EquipmentStatus {
    /// True when more items are out than the inventory holds
    pub fn is_short(&self) -> bool {
        self.armbands_held < 0 || self.flags_held < 0
    }
}

/// "김철수 1명" for a single person, "김철수 등 3명" otherwise
pub fn personnel_phrase(representative: &str, count: usize) -> String {
    if count == 1 {
        format!("{} 1명", representative)
    } else {
        format!("{} 등 {}명", representative, count)
    }
}

// ============================================================================
// REPORT FORMATTER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ReportFormatter {
    pub total_armbands: i64,
    pub total_flags: i64,
    pub work_description: String,
}

impl ReportFormatter {
    pub fn new() -> Self {
        ReportFormatter {
            total_armbands: TOTAL_ARMBANDS,
            total_flags: TOTAL_FLAGS,
            work_description: WORK_DESCRIPTION.to_string(),
        }
    }

    pub fn with_inventory(total_armbands: i64, total_flags: i64, work_description: &str) -> Self {
        ReportFormatter {
            total_armbands,
            total_flags,
            work_description: work_description.to_string(),
        }
    }

    /// issued = what is on site, held = inventory - issued
    pub fn equipment(&self, totals: &RosterTotals) -> EquipmentStatus {
        let armbands_issued = totals.on_site as i64;
        let flags_issued = totals.vehicles_on_site as i64;

        EquipmentStatus {
            armbands_issued,
            armbands_held: self.total_armbands - armbands_issued,
            flags_issued,
            flags_held: self.total_flags - flags_issued,
        }
    }

    /// Render the report. Same inputs always give the same text.
    pub fn format(&self, cohorts: &CohortMap, totals: &RosterTotals) -> String {
        let equipment = self.equipment(totals);

        let mut lines: Vec<String> = vec![
            "단결!".to_string(),
            "공사 인원 입영 보고 드립니다.".to_string(),
            String::new(),
        ];

        for (key, cohort) in cohorts.iter() {
            lines.push(format!("소속: {}", key.affiliation));
            lines.push(format!(
                "인원: {}",
                personnel_phrase(&key.representative, cohort.count)
            ));
            for vehicle in &cohort.vehicles {
                lines.push(format!("차량: {}", vehicle));
            }
            lines.push(String::new());
        }

        lines.extend([
            "<완장 및 수기 보유 현황>".to_string(),
            format!("✅ 청색 완장: {}개", equipment.armbands_held),
            format!("✅ 청색 수기: {}개", equipment.flags_held),
            String::new(),
            format!(
                "불출 : 청색 완장 {}개, 수기 {}개",
                equipment.armbands_issued, equipment.flags_issued
            ),
            String::new(),
            format!("오늘 공사내용은 {}입니다.", self.work_description),
            String::new(),
            format!(
                "총 {}명 입영 중 {}명 퇴영, {}명 공사 중, 차량 {}대 입니다.",
                totals.entrants_today, totals.exits_today, totals.on_site, totals.vehicles_on_site
            ),
            String::new(),
            "이상입니다.".to_string(),
        ]);

        lines.join("\n")
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
