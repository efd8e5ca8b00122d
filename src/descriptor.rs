// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Static lookup tables mapping API report/agency identifiers to display names
// role: model/descriptors
// inputs: JSON arrays of {value, name} (dashboard shape) or {apiValue, displayName}
// outputs: DescriptorTable with first-match lookup
// invariants: Tables are immutable after construction; order is preserved; empty tables are valid
// errors: Loading surfaces file path and JSON error context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
  #[serde(alias = "value", alias = "apiValue")]
  pub api_value: String,
  #[serde(alias = "name", alias = "displayName")]
  pub display_name: String,
}

impl Descriptor {
  pub fn new(api_value: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      api_value: api_value.into(),
      display_name: display_name.into(),
    }
  }
}

/// Ordered descriptor list. Lookups return the first matching entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorTable(Vec<Descriptor>);

impl DescriptorTable {
  pub fn new(entries: Vec<Descriptor>) -> Self {
    Self(entries)
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn display_name(&self, api_value: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|d| d.api_value == api_value)
      .map(|d| d.display_name.as_str())
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn from_json_str(raw: &str) -> Result<Self> {
    let entries: Vec<Descriptor> = serde_json::from_str(raw).context("parsing descriptor table JSON")?;
    Ok(Self(entries))
  }

  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading descriptor table {}", path.display()))?;

    Self::from_json_str(&raw).with_context(|| format!("loading descriptor table {}", path.display()))
  }

  /// Load from an optional path; `None` yields an empty table.
  pub fn load_optional(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(p) => Self::from_json_file(p),
      None => Ok(Self::empty()),
    }
  }
}

impl From<Vec<Descriptor>> for DescriptorTable {
  fn from(entries: Vec<Descriptor>) -> Self {
    Self(entries)
  }
}
