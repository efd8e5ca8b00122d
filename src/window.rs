// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the inclusive [after, before] date window for a calendar month, clamped to yesterday
// role: windowing/resolver
// inputs: month (1-12, string or number), 4-digit year, "today" (local clock or override)
// outputs: ReportWindow with yyyy-MM-dd strings; YearMonth spans for multi-month runs
// invariants:
// - start_date is always the 1st of the month
// - start_date <= end_date; end_date never reaches today when the month is still running
// - after()/before() are formatted %Y-%m-%d (API contract, not display)
// errors: InvalidParameter for malformed month/year; NoCompletedDays when the window would be empty
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// Date format the reports API expects for `after` / `before`.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ReportWindow {
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

impl ReportWindow {
  pub fn after(&self) -> String {
    self.start_date.format(API_DATE_FORMAT).to_string()
  }

  pub fn before(&self) -> String {
    self.end_date.format(API_DATE_FORMAT).to_string()
  }

  /// Query fragment shared by every page of the month: `after=..&before=..`.
  pub fn query(&self) -> String {
    format!("after={}&before={}", self.after(), self.before())
  }
}

/// A calendar month, labelled `YYYY-MM`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct YearMonth {
  pub year: i32,
  pub month: u32,
}

impl YearMonth {
  /// Month as the API service takes it: digits without a leading zero.
  pub fn month_param(&self) -> String {
    self.month.to_string()
  }

  pub fn year_param(&self) -> String {
    format!("{:04}", self.year)
  }

  fn next(self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

pub fn parse_month(raw: &str) -> ReportResult<u32> {
  let trimmed = raw.trim();
  let invalid = || ReportError::InvalidParameter {
    name: "month",
    value: raw.to_string(),
  };

  if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(invalid());
  }

  match trimmed.parse::<u32>() {
    Ok(m) if (1..=12).contains(&m) => Ok(m),
    _ => Err(invalid()),
  }
}

pub fn parse_year(raw: &str) -> ReportResult<i32> {
  let trimmed = raw.trim();

  if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(ReportError::InvalidParameter {
      name: "year",
      value: raw.to_string(),
    });
  }

  trimmed.parse::<i32>().map_err(|_| ReportError::InvalidParameter {
    name: "year",
    value: raw.to_string(),
  })
}

/// True last calendar day of `(year, month)`.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
  let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  NaiveDate::from_ymd_opt(ny, nm, 1).and_then(|first_next| first_next.pred_opt())
}

/// Window for already-validated numeric inputs.
pub fn window_for(year: i32, month: u32, today: NaiveDate) -> ReportResult<ReportWindow> {
  let no_days = || ReportError::NoCompletedDays { year, month };

  let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| ReportError::InvalidParameter {
    name: "month",
    value: month.to_string(),
  })?;
  let last = last_day_of_month(year, month).ok_or_else(no_days)?;

  let end_date = if last > today {
    today.pred_opt().ok_or_else(no_days)?
  } else {
    last
  };

  if end_date < start_date {
    return Err(no_days());
  }

  Ok(ReportWindow { start_date, end_date })
}

/// Resolve the `[after, before]` window for the given month and year strings.
///
/// `today` is the date-only reference for future detection; callers pass
/// `effective_today(..)` so tests can freeze the clock.
pub fn resolve_window(month: &str, year: &str, today: NaiveDate) -> ReportResult<ReportWindow> {
  let m = parse_month(month)?;
  let y = parse_year(year)?;
  window_for(y, m, today)
}

/// Local calendar date of the effective "now".
pub fn effective_today(now: Option<DateTime<Local>>) -> NaiveDate {
  now.unwrap_or_else(Local::now).date_naive()
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}

pub fn parse_year_month(raw: &str) -> Result<YearMonth> {
  static RE_YM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());

  let trimmed = raw.trim();
  let Some(caps) = RE_YM.captures(trimmed) else {
    bail!("invalid month {raw:?}, expected YYYY-MM");
  };

  let year = parse_year(&caps[1]).with_context(|| format!("parsing year in {raw:?}"))?;
  let month = parse_month(&caps[2]).with_context(|| format!("parsing month in {raw:?}"))?;

  Ok(YearMonth { year, month })
}

/// Inclusive list of months from `from` through `through`, earliest first.
pub fn month_span(from: YearMonth, through: YearMonth) -> Result<Vec<YearMonth>> {
  if through < from {
    bail!("--through {through} is before --month {from}");
  }

  let mut out = Vec::new();
  let mut cursor = from;

  while cursor <= through {
    out.push(cursor);
    cursor = cursor.next();
  }

  Ok(out)
}
