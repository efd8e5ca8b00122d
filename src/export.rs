// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate (report, month) jobs against the fetcher and assemble the export document
// role: processing/orchestrator
// inputs: EffectiveConfig, optional now override
// outputs: ReportExport written to stdout or --out
// side_effects: Network calls (via ReportFetcher); writes JSON output
// invariants:
// - Jobs are report-major, then month ascending; output keeps that order
// - Jobs run concurrently; each job paginates sequentially
// - Any failed job fails the run; nothing is written
// errors: Propagates fetch errors with report/month context; descriptor load errors with file path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rayon::prelude::*;

use crate::cli::EffectiveConfig;
use crate::descriptor::DescriptorTable;
use crate::fetcher::ReportFetcher;
use crate::model::{MonthExport, ReportExport};
use crate::util;
use crate::window::YearMonth;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJob {
  pub report: String,
  pub month: YearMonth,
}

pub fn plan_jobs(reports: &[String], months: &[YearMonth]) -> Vec<ReportJob> {
  reports
    .iter()
    .flat_map(|report| {
      months.iter().map(move |month| ReportJob {
        report: report.clone(),
        month: *month,
      })
    })
    .collect()
}

/// Fetch every job concurrently; results come back in job order.
pub fn run_jobs(fetcher: &ReportFetcher, agency: Option<&str>, jobs: &[ReportJob]) -> Result<Vec<MonthExport>> {
  jobs
    .par_iter()
    .map(|job| {
      let fetched = fetcher
        .fetch_month(&job.report, agency, &job.month.month_param(), &job.month.year_param())
        .with_context(|| format!("fetching report {:?} for {}", job.report, job.month))?;

      Ok(MonthExport::from_monthly(&job.report, job.month, fetched))
    })
    .collect()
}

pub fn build_fetcher(cfg: &EffectiveConfig, now_opt: Option<DateTime<Local>>) -> Result<ReportFetcher> {
  let reports = DescriptorTable::load_optional(cfg.reports_file.as_deref())?;
  let agencies = DescriptorTable::load_optional(cfg.agencies_file.as_deref())?;

  Ok(
    ReportFetcher::new(cfg.api_url.clone(), reports, agencies)
      .with_max_pages(cfg.max_pages)
      .with_now(now_opt),
  )
}

pub fn build_export(
  cfg: &EffectiveConfig,
  fetcher: &ReportFetcher,
  now_opt: Option<DateTime<Local>>,
) -> Result<ReportExport> {
  let jobs = plan_jobs(&cfg.reports, &cfg.months);
  let reports = run_jobs(fetcher, cfg.agency.as_deref(), &jobs)?;

  Ok(ReportExport {
    generated_at: util::rfc3339(util::effective_now(now_opt)),
    api_url: fetcher.api_base().to_string(),
    agency: cfg.agency.clone(),
    reports,
  })
}

pub fn run(cfg: &EffectiveConfig, now_opt: Option<DateTime<Local>>) -> Result<()> {
  // Phase 1: descriptor tables + fetcher
  let fetcher = build_fetcher(cfg, now_opt)?;

  // Phase 2: fetch all (report, month) jobs
  let export = build_export(cfg, &fetcher, now_opt)?;

  // Phase 3: write
  util::write_json_output(&cfg.out, &export)
}
