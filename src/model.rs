// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON export document written by the CLI (one entry per report and month)
// role: model/types
// outputs: Serializable structs with stable field names
// invariants: count == rows.len(); window strings are yyyy-MM-dd; reports keep job order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

use crate::fetcher::MonthlyReport;
use crate::normalize::ReportRow;
use crate::window::{ReportWindow, YearMonth};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WindowRange {
  pub after: String,
  pub before: String,
}

impl From<&ReportWindow> for WindowRange {
  fn from(w: &ReportWindow) -> Self {
    Self {
      after: w.after(),
      before: w.before(),
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthExport {
  pub report: String,
  pub month: String,
  pub window: WindowRange,
  pub pages: u32,
  pub count: usize,
  pub rows: Vec<ReportRow>,
}

impl MonthExport {
  pub fn from_monthly(report: &str, month: YearMonth, fetched: MonthlyReport) -> Self {
    Self {
      report: report.to_string(),
      month: month.to_string(),
      window: WindowRange::from(&fetched.window),
      pages: fetched.pages,
      count: fetched.rows.len(),
      rows: fetched.rows,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportExport {
  pub generated_at: String,
  pub api_url: String,
  pub agency: Option<String>,
  pub reports: Vec<MonthExport>,
}
