// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Transport seam for the DAP reports API (one GET per page) and its ureq-backed implementation
// role: api/transport
// inputs: Fully-built page URL
// outputs: Raw rows of one page (JSON objects), or a TransportFailure
// side_effects: Network calls to the configured API base
// invariants:
// - Redirects are never followed; a 3xx is a failure
// - Every request carries Content-Type: application/json
// - No retries and no caching at this layer
// errors: Network, non-2xx status, redirect, and malformed bodies map to TransportFailure variants
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;

use serde_json::Value;

use crate::error::TransportFailure;
use crate::normalize::ReportRow;

pub const USER_AGENT: &str = concat!("dap-report/", env!("CARGO_PKG_VERSION"));

// --- Trait seam for the reports API ---
pub trait ReportApi: Send + Sync {
  fn get_page(&self, url: &str) -> Result<Vec<ReportRow>, TransportFailure>;
}

pub struct HttpReportApi {
  agent: ureq::Agent,
}

impl HttpReportApi {
  pub fn new() -> Self {
    let agent = ureq::AgentBuilder::new().redirects(0).user_agent(USER_AGENT).build();
    Self { agent }
  }
}

impl Default for HttpReportApi {
  fn default() -> Self {
    Self::new()
  }
}

impl ReportApi for HttpReportApi {
  fn get_page(&self, url: &str) -> Result<Vec<ReportRow>, TransportFailure> {
    let resp = match self.agent.get(url).set("Content-Type", "application/json").call() {
      Ok(r) => r,
      Err(ureq::Error::Status(status, _)) => {
        return Err(TransportFailure::Status {
          url: url.to_string(),
          status,
        });
      }
      Err(other) => {
        return Err(TransportFailure::Network {
          url: url.to_string(),
          message: other.to_string(),
        });
      }
    };

    let status = resp.status();
    tracing::trace!(url, status, "page response");

    if (300..400).contains(&status) {
      return Err(TransportFailure::Redirect {
        url: url.to_string(),
        status,
        location: resp.header("location").map(str::to_owned),
      });
    }

    if !(200..300).contains(&status) {
      return Err(TransportFailure::Status {
        url: url.to_string(),
        status,
      });
    }

    parse_page(url, resp.into_reader())
  }
}

fn json_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Decode one page body: a JSON array whose items are all objects.
pub fn parse_page<R: Read>(url: &str, reader: R) -> Result<Vec<ReportRow>, TransportFailure> {
  let malformed = |message: String| TransportFailure::MalformedResponse {
    url: url.to_string(),
    message,
  };

  let body: Value = serde_json::from_reader(reader).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

  let Value::Array(items) = body else {
    return Err(malformed(format!("expected a JSON array, got {}", json_kind(&body))));
  };

  items
    .into_iter()
    .enumerate()
    .map(|(idx, item)| match item {
      Value::Object(row) => Ok(row),
      other => Err(malformed(format!("row {idx} is {}, expected an object", json_kind(&other)))),
    })
    .collect()
}
