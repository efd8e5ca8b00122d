// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch one month of one report from the paginated DAP API and return every normalized row
// role: fetch/paginate
// inputs: report name, optional agency, month, year; immutable API base + descriptor tables
// outputs: Vec<ReportRow> (or MonthlyReport with window and page count)
// side_effects: Sequential GETs through the ReportApi seam; tracing events per page/month
// invariants:
// - Required params are validated before any request is issued
// - Page N+1 is requested only after page N came back full (API_PAGE_LIMIT rows)
// - The first short (or empty) page ends the sequence
// - At most max_pages requests per call; hitting the cap is TooManyPages
// - Any failure discards already-fetched pages
// errors: ReportError (MissingParameter, InvalidParameter, NoCompletedDays, Transport, TooManyPages)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::iter::FusedIterator;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::api::{HttpReportApi, ReportApi};
use crate::descriptor::DescriptorTable;
use crate::error::{ReportError, ReportResult};
use crate::normalize::{ReportRow, normalize_rows};
use crate::window::{ReportWindow, effective_today, resolve_window};

/// Rows per request; also the "maybe more data" signal when a page comes back full.
pub const API_PAGE_LIMIT: usize = 10_000;

/// Default ceiling on requests per month (10M rows).
pub const DEFAULT_MAX_PAGES: u32 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
  pub number: u32,
  pub rows: Vec<ReportRow>,
}

impl Page {
  /// A short page is the last one the API has.
  pub fn is_terminal(&self) -> bool {
    self.rows.len() < API_PAGE_LIMIT
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
  pub window: ReportWindow,
  pub pages: u32,
  pub rows: Vec<ReportRow>,
}

pub struct ReportFetcher {
  api_base: String,
  reports: DescriptorTable,
  agencies: DescriptorTable,
  api: Box<dyn ReportApi>,
  max_pages: u32,
  now_override: Option<DateTime<Local>>,
}

fn require<'a>(name: &'static str, value: &'a str) -> ReportResult<&'a str> {
  let trimmed = value.trim();

  if trimmed.is_empty() {
    return Err(ReportError::MissingParameter(name));
  }

  Ok(trimmed)
}

impl ReportFetcher {
  /// Fetcher backed by the real HTTP transport.
  pub fn new(api_base: impl Into<String>, reports: DescriptorTable, agencies: DescriptorTable) -> Self {
    Self::with_api(api_base, reports, agencies, Box::new(HttpReportApi::new()))
  }

  pub fn with_api(
    api_base: impl Into<String>,
    reports: DescriptorTable,
    agencies: DescriptorTable,
    api: Box<dyn ReportApi>,
  ) -> Self {
    Self {
      api_base: api_base.into(),
      reports,
      agencies,
      api,
      max_pages: DEFAULT_MAX_PAGES,
      now_override: None,
    }
  }

  /// Cap the number of page requests per month. Values below 1 are raised to 1.
  pub fn with_max_pages(mut self, max_pages: u32) -> Self {
    self.max_pages = max_pages.max(1);
    self
  }

  /// Freeze the clock used to clamp in-progress months.
  pub fn with_now(mut self, now: Option<DateTime<Local>>) -> Self {
    self.now_override = now;
    self
  }

  pub fn api_base(&self) -> &str {
    &self.api_base
  }

  pub fn max_pages(&self) -> u32 {
    self.max_pages
  }

  /// `{base}[/agencies/{agency}]/reports/{report}/data?after=..&before=..&limit=10000`
  pub fn month_report_url(&self, report: &str, agency: Option<&str>, window: &ReportWindow) -> String {
    let mut url = self.api_base.trim_end_matches('/').to_string();

    if let Some(agency) = agency {
      url.push_str("/agencies/");
      url.push_str(agency);
    }

    format!("{url}/reports/{report}/data?{}&limit={API_PAGE_LIMIT}", window.query())
  }

  /// Lazy page sequence for a month URL built by [`Self::month_report_url`].
  pub fn pages(&self, base_url: String) -> Pages<'_> {
    Pages {
      fetcher: self,
      base_url,
      next_page: 1,
      done: false,
    }
  }

  /// Every normalized row of `report` (optionally scoped to `agency`) for one month.
  ///
  /// `month` is 1-12 (leading zero optional) and `year` four digits. Rows of one
  /// call must all belong to the same report/agency pair; the first row of each
  /// page picks the display names.
  pub fn get_report_for_month(
    &self,
    report: &str,
    agency: Option<&str>,
    month: &str,
    year: &str,
  ) -> ReportResult<Vec<ReportRow>> {
    self.fetch_month(report, agency, month, year).map(|m| m.rows)
  }

  pub fn fetch_month(&self, report: &str, agency: Option<&str>, month: &str, year: &str) -> ReportResult<MonthlyReport> {
    // Phase 1: validate before any I/O
    let report = require("report", report)?;
    let month = require("month", month)?;
    let year = require("year", year)?;
    let agency = agency.map(str::trim).filter(|a| !a.is_empty());

    // Phase 2: window and URL
    let window = resolve_window(month, year, effective_today(self.now_override))?;
    let url = self.month_report_url(report, agency, &window);

    // Phase 3: drain pages; the first error aborts the whole month
    let mut rows: Vec<ReportRow> = Vec::new();
    let mut pages = 0;

    for page in self.pages(url) {
      let page = page?;
      pages = page.number;
      rows.extend(page.rows);
    }

    info!(
      report,
      agency = agency.unwrap_or("<all>"),
      after = %window.after(),
      before = %window.before(),
      pages,
      rows = rows.len(),
      "fetched monthly report"
    );

    Ok(MonthlyReport { window, pages, rows })
  }
}

/// Pages of one month, requested one at a time.
///
/// Not restartable: once the terminal page or an error has been yielded the
/// iterator is exhausted.
pub struct Pages<'a> {
  fetcher: &'a ReportFetcher,
  base_url: String,
  next_page: u32,
  done: bool,
}

impl Iterator for Pages<'_> {
  type Item = ReportResult<Page>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    if self.next_page > self.fetcher.max_pages {
      self.done = true;
      warn!(url = %self.base_url, max_pages = self.fetcher.max_pages, "page cap reached without a short page");
      return Some(Err(ReportError::TooManyPages {
        max_pages: self.fetcher.max_pages,
      }));
    }

    let number = self.next_page;
    let url = format!("{}&page={number}", self.base_url);

    let raw = match self.fetcher.api.get_page(&url) {
      Ok(raw) => raw,
      Err(failure) => {
        self.done = true;
        return Some(Err(failure.into()));
      }
    };

    debug!(url = %url, page = number, rows = raw.len(), "fetched page");

    let page = Page {
      number,
      rows: normalize_rows(raw, &self.fetcher.reports, &self.fetcher.agencies),
    };

    if page.is_terminal() {
      self.done = true;
    } else {
      self.next_page += 1;
    }

    Some(Ok(page))
  }
}

impl FusedIterator for Pages<'_> {}
