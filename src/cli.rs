use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::fetcher::DEFAULT_MAX_PAGES;
use crate::window::{YearMonth, month_span, parse_now_override, parse_year_month};

pub const DEFAULT_API_URL: &str = "https://api.gsa.gov/analytics/dap/v2.0.0";
pub const API_URL_ENV: &str = "DAP_API_URL";

#[derive(Parser, Debug)]
#[command(
    name = "dap-report",
    version,
    about = "Fetch monthly DAP analytics reports from the paginated reports API as normalized JSON",
    long_about = None
)]
pub struct Cli {
  /// Base URL of the reports API (default: $DAP_API_URL, then the public v2 endpoint)
  #[arg(long)]
  pub api_url: Option<String>,

  /// Report name, e.g. site, language, device (repeatable)
  #[arg(long = "report")]
  pub reports: Vec<String>,

  /// Limit results to one agency (default: all agencies)
  #[arg(long)]
  pub agency: Option<String>,

  /// Calendar month, e.g. 2024-03
  #[arg(long)]
  pub month: Option<String>,

  /// Last month of an inclusive span starting at --month, e.g. 2024-06
  #[arg(long)]
  pub through: Option<String>,

  /// JSON file of report descriptors: [{"value": "...", "name": "..."}]
  #[arg(long)]
  pub reports_file: Option<PathBuf>,

  /// JSON file of agency descriptors: [{"value": "...", "name": "..."}]
  #[arg(long)]
  pub agencies_file: Option<PathBuf>,

  /// Give up on a month after this many full pages
  #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
  pub max_pages: u32,

  /// Output file (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Debug logging to stderr
  #[arg(long, short)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used to clamp the current month (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub api_url: String,
  pub reports: Vec<String>,
  pub agency: Option<String>,
  pub months: Vec<YearMonth>,
  pub reports_file: Option<PathBuf>,
  pub agencies_file: Option<PathBuf>,
  pub max_pages: u32,
  pub out: String,
  pub now_override: Option<String>,
}

/// Pick the API base: flag, then `$DAP_API_URL`, then the public endpoint.
pub fn resolve_api_url(flag: Option<&str>) -> String {
  if let Some(url) = flag.map(str::trim).filter(|u| !u.is_empty()) {
    return url.to_string();
  }

  if let Ok(url) = std::env::var(API_URL_ENV) {
    if !url.trim().is_empty() {
      return url.trim().to_string();
    }
  }

  DEFAULT_API_URL.to_string()
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  // Validate month selection
  let months = match (&cli.month, &cli.through) {
    (Some(from), None) => vec![parse_year_month(from)?],
    (Some(from), Some(through)) => month_span(parse_year_month(from)?, parse_year_month(through)?)?,
    (None, Some(_)) => bail!("--through requires --month"),
    (None, None) => bail!("Provide --month YYYY-MM"),
  };

  let reports: Vec<String> = cli
    .reports
    .iter()
    .map(|r| r.trim().to_string())
    .filter(|r| !r.is_empty())
    .collect();

  if reports.is_empty() {
    bail!("Provide at least one --report");
  }

  if let Some(raw) = cli.now_override.as_deref() {
    if parse_now_override(Some(raw)).is_none() {
      bail!("invalid --now-override {raw:?}, expected RFC3339 or YYYY-MM-DDTHH:MM:SS");
    }
  }

  let agency = cli.agency.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());

  Ok(EffectiveConfig {
    api_url: resolve_api_url(cli.api_url.as_deref()),
    reports,
    agency,
    months,
    reports_file: cli.reports_file,
    agencies_file: cli.agencies_file,
    max_pages: cli.max_pages,
    out: cli.out,
    now_override: cli.now_override,
  })
}
