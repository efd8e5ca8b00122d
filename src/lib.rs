//! `dap-report` library crate.
//!
//! Retrieves one calendar month of a DAP analytics report from the paginated
//! reports API and returns the normalized rows. The `dap-report` binary is a
//! thin wrapper that fans out over reports and months and writes JSON.
//!
//! ```no_run
//! use dap_report::descriptor::{Descriptor, DescriptorTable};
//! use dap_report::fetcher::ReportFetcher;
//!
//! let fetcher = ReportFetcher::new(
//!   "https://api.gsa.gov/analytics/dap/v2.0.0",
//!   DescriptorTable::new(vec![Descriptor::new("site", "Sites")]),
//!   DescriptorTable::empty(),
//! );
//! let rows = fetcher.get_report_for_month("site", None, "3", "2024")?;
//! println!("{} rows", rows.len());
//! # Ok::<(), dap_report::error::ReportError>(())
//! ```

pub mod api;
pub mod cli;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod ext;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod util;
pub mod window;
