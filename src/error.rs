// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed failures for window resolution, report pagination, and per-page transport
// role: errors/taxonomy
// outputs: ReportError (caller-facing) and TransportFailure (one page request)
// invariants:
// - Every transport-level problem (network, non-2xx, redirect, bad body) is a TransportFailure
// - Validation errors are raised before any network call
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

/// Why a single page request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
  /// The request never produced an HTTP response (DNS, connect, reset, ...).
  #[error("request to {url} failed: {message}")]
  Network { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("request to {url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  /// The server tried to redirect; redirects are never followed.
  #[error("request to {url} was redirected (HTTP {status}) to {}", .location.as_deref().unwrap_or("<no location>"))]
  Redirect {
    url: String,
    status: u16,
    location: Option<String>,
  },

  /// The body was not a JSON array of row objects.
  #[error("malformed response from {url}: {message}")]
  MalformedResponse { url: String, message: String },
}

impl TransportFailure {
  pub fn url(&self) -> &str {
    match self {
      Self::Network { url, .. }
      | Self::Status { url, .. }
      | Self::Redirect { url, .. }
      | Self::MalformedResponse { url, .. } => url,
    }
  }
}

/// Errors surfaced by [`crate::fetcher::ReportFetcher`] and [`crate::window`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
  #[error("missing required parameter for report API call: {0}")]
  MissingParameter(&'static str),

  #[error("invalid {name}: {value:?}")]
  InvalidParameter { name: &'static str, value: String },

  /// The requested month has no completed day yet (today is the 1st, or the month is in the future).
  #[error("no completed days in {year:04}-{month:02} yet")]
  NoCompletedDays { year: i32, month: u32 },

  #[error(transparent)]
  Transport(#[from] TransportFailure),

  #[error("gave up after {max_pages} full pages; the API never returned a short page")]
  TooManyPages { max_pages: u32 },
}

impl ReportError {
  pub fn is_transport_failure(&self) -> bool {
    matches!(self, Self::Transport(_))
  }

  pub fn is_missing_parameter(&self) -> bool {
    matches!(self, Self::MissingParameter(_))
  }
}

pub type ReportResult<T> = Result<T, ReportError>;
