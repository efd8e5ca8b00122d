//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,no_run
//! use test_support::{init_tracing, MockApi, MockResponse};
//!
//! init_tracing();
//! let api = MockApi::start(|_target| MockResponse::rows(3, "site", "gsa"));
//! let _base = api.base_url();
//! ```

use once_cell::sync::Lazy;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use std::env;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,dap_report=debug"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

// --- Mock DAP reports API ---

/// Canned HTTP response for one request.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// A page of `n` rows shaped like the reports API output.
    pub fn rows(n: usize, report: &str, agency: &str) -> Self {
        Self::json(rows_json(n, report, agency))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".into(), location.into())],
            body: String::new(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            301 => "Moved Permanently",
            302 => "Found",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Status",
        }
    }
}

/// JSON array of `n` report rows including the transport fields (`notice`, `id`).
pub fn rows_json(n: usize, report: &str, agency: &str) -> String {
    let rows: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": i,
                "notice": "Data is sampled",
                "date": "2024-03-01",
                "report_name": report,
                "report_agency": agency,
                "visits": i,
            })
        })
        .collect();
    Value::Array(rows).to_string()
}

/// Value of `key` in the query string of a request target.
pub fn query_param(target: &str, key: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

/// The `page` query parameter of a request target (0 when absent).
pub fn page_of(target: &str) -> u32 {
    query_param(target, "page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(0)
}

/// Local HTTP server standing in for the reports API.
///
/// Every request target (path + query) is recorded in arrival order before the
/// route closure answers it. The server thread lives for the rest of the test
/// process.
pub struct MockApi {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockApi {
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str) -> MockResponse + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle_client(stream, &route, &seen);
            }
        });

        Self {
            base_url: format!("http://{}/analytics/dap/v2", addr),
            requests,
        }
    }

    /// Serve `pages[n - 1]` rows for `page=n`; pages past the end are empty.
    pub fn paged(pages: Vec<usize>, report: &'static str, agency: &'static str) -> Self {
        Self::start(move |target| {
            let page = page_of(target) as usize;
            let n = page.checked_sub(1).and_then(|i| pages.get(i)).copied().unwrap_or(0);
            MockResponse::rows(n, report, agency)
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets seen so far, e.g. `/analytics/dap/v2/reports/site/data?...&page=1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

fn handle_client<F>(mut stream: TcpStream, route: &F, seen: &Mutex<Vec<String>>)
where
    F: Fn(&str) -> MockResponse,
{
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&chunk[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();

    if let Ok(mut requests) = seen.lock() {
        requests.push(target.clone());
    }

    let resp = route(&target);
    let mut extra = String::new();
    for (k, v) in &resp.headers {
        extra.push_str(&format!("{}: {}\r\n", k, v));
    }

    let out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        resp.status,
        resp.reason(),
        extra,
        resp.body.len(),
        resp.body
    );
    let _ = stream.write_all(out.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_helpers() {
        let t = "/v2/reports/site/data?after=2024-03-01&before=2024-03-31&limit=10000&page=2";
        assert_eq!(query_param(t, "after").as_deref(), Some("2024-03-01"));
        assert_eq!(page_of(t), 2);
        assert_eq!(page_of("/v2/reports/site/data"), 0);
    }

    #[test]
    fn rows_json_shape() {
        let v: Value = serde_json::from_str(&rows_json(2, "site", "gsa")).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
        assert_eq!(v[1]["id"], 1);
        assert_eq!(v[0]["report_agency"], "gsa");
    }
}
