// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for the effective clock, logging setup, JSON output, and man page rendering
// role: utilities/helpers
// inputs: optional now override; output target ("-" or path); clap CommandFactory
// outputs: timestamps, stdout/file JSON, man page text
// side_effects: write_json_output creates parent directories and writes files; init_logging installs a global subscriber
// invariants:
// - "-" always means stdout
// - init_logging is idempotent (later calls are no-ops)
// errors: IO errors bubble with the target path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};
use clap::CommandFactory;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

pub fn rfc3339(dt: DateTime<Local>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Install the stderr `tracing` subscriber for the CLI.
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG` wins,
/// falling back to `warn`.
pub fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("dap_report=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Write `value` as pretty JSON to stdout (`out == "-"`) or to the file at `out`.
pub fn write_json_output<T: Serialize>(out: &str, value: &T) -> Result<()> {
  let body = serde_json::to_string_pretty(value).context("serializing report export")?;

  if out == "-" {
    println!("{}", body);
    return Ok(());
  }

  let path = Path::new(out);

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;

  tracing::info!(path = %path.display(), "wrote report export");

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
