// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read report-row fields out of serde_json values without panicking
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper with lookup-key extraction
// invariants: No panics; missing keys and non-objects yield None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;

/// A (possibly missing) field of a JSON row.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  /// The field as a descriptor lookup key.
  ///
  /// Strings are used verbatim and numbers by their JSON text; null, bools,
  /// arrays and objects never match a descriptor.
  pub fn as_lookup_key(&self) -> Option<String> {
    match self.inner? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }
}

/// Fetch a top-level field from a row object.
pub trait JsonFetch {
  fn fetch(&self, key: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, key: &str) -> JsonFetched<'_> {
    JsonFetched {
      inner: self.as_object().and_then(|obj| obj.get(key)),
    }
  }
}

impl JsonFetch for serde_json::Map<String, Value> {
  fn fetch(&self, key: &str) -> JsonFetched<'_> {
    JsonFetched { inner: self.get(key) }
  }
}
