// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shape raw API rows for presentation: drop transport metadata, map report/agency ids to display names
// role: transform/normalize
// inputs: One page of raw rows; report and agency DescriptorTables
// outputs: Rows without notice/id; report_name/report_agency rewritten when a descriptor matches
// invariants:
// - Row count and order are preserved
// - Metric fields pass through untouched
// - The first row decides the display names for the whole page (one report/agency per call)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::{Map, Value};

use crate::descriptor::DescriptorTable;
use crate::ext::serde_json::JsonFetch;

/// One analytics record as returned by the API.
pub type ReportRow = Map<String, Value>;

pub const REPORT_NAME_FIELD: &str = "report_name";
pub const REPORT_AGENCY_FIELD: &str = "report_agency";

/// Transport metadata that never reaches callers.
pub const DROPPED_FIELDS: [&str; 2] = ["notice", "id"];

fn representative_label(rows: &[ReportRow], field: &str, table: &DescriptorTable) -> Option<String> {
  let key = rows.first()?.fetch(field).as_lookup_key()?;
  table.display_name(&key).map(str::to_owned)
}

pub fn normalize_rows(rows: Vec<ReportRow>, reports: &DescriptorTable, agencies: &DescriptorTable) -> Vec<ReportRow> {
  let report_label = representative_label(&rows, REPORT_NAME_FIELD, reports);
  let agency_label = representative_label(&rows, REPORT_AGENCY_FIELD, agencies);

  rows
    .into_iter()
    .map(|mut row| {
      for field in DROPPED_FIELDS {
        row.remove(field);
      }

      if let Some(label) = &report_label {
        row.insert(REPORT_NAME_FIELD.into(), Value::String(label.clone()));
      }

      if let Some(label) = &agency_label {
        row.insert(REPORT_AGENCY_FIELD.into(), Value::String(label.clone()));
      }

      row
    })
    .collect()
}
