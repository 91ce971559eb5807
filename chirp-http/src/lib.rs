//! Minimal JSON-over-HTTP client with safe logging and bearer auth.
//!
//! - Request options: `Auth`, query params, timeout
//! - Redacts sensitive query params and never logs secret values
//! - Optional *raw* response logging via `CHIRP_HTTP_RAW=1`
//!
//! Failures are reported once and never retried; callers decide what to do with them.
//!
//! ```no_run
//! # async fn demo() -> Result<(), chirp_http::HttpError> {
//! let client = chirp_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", chirp_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "CHIRP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request authenticates.
///
/// ```
/// use chirp_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert_eq!(bearer.kind(), "bearer");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
}

impl Auth<'_> {
    /// Label used in logs in place of the credential.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
        }
    }
}

/// Per-request knobs.
///
/// ```
/// use chirp_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(vec![("q", "rust".into())]),
///     ..Default::default()
/// };
/// assert!(opts.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A missing trailing slash is added so relative paths always append to the base.
    ///
    /// ```
    /// use chirp_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v2")?;
    /// assert_eq!(client.base_url().as_str(), "https://api.example.com/v2/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default per-request timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Base every request path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET `path` (relative to the base URL) and decode the JSON body into `T`.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let method = Method::GET;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);
        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(Auth::Bearer(tok)) = &opts.auth {
            rb = rb.bearer_auth(sanitize_api_key(tok)?);
        }

        let req_id = uuid::Uuid::new_v4().simple().to_string();
        let auth_kind = opts.auth.as_ref().map_or("none", |a| a.kind());
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redact_query(opts.query.as_deref().unwrap_or_default()),
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            "http.request.start"
        );

        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = header_str(&headers, "x-request-id")
            .or_else(|| header_str(&headers, "x-transaction-id"))
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%request_id,
            rate_limit.limit=?header_str(&headers, "x-rate-limit-limit"),
            rate_limit.remaining=?header_str(&headers, "x-rate-limit-remaining"),
            rate_limit.reset=?header_str(&headers, "x-rate-limit-reset"),
            "http.response.headers"
        );

        if raw_enabled() {
            let end = bytes.len().min(RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                body=%String::from_utf8_lossy(&bytes[..end]),
                truncated = bytes.len() > RAW_MAX_BODY,
                "response"
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            error_message=%message,
            x_request_id=%request_id,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn redact_query(q: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    q.iter()
        .map(|(k, v)| {
            let secret = SECRET_PARAMS.contains(&k.to_ascii_lowercase().as_str());
            let v = if secret { "<redacted>" } else { v.as_ref() };
            ((*k).to_string(), v.to_string())
        })
        .collect()
}

/// Pull a human-readable message out of an error body.
///
/// Understands the Twitter `{"errors":[..]}` envelope, RFC 7807 style problem bodies
/// (`title`/`detail`), and plain `{"message":..}` / `{"error":..}` objects. Anything
/// else falls back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Errors {
        errors: Vec<Msg>,
    }
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        error: String,
    }
    impl Msg {
        fn first_non_empty(self) -> Option<String> {
            [self.message, self.detail, self.title, self.error]
                .into_iter()
                .find(|s| !s.is_empty())
        }
    }

    let found = match serde_json::from_slice::<Errors>(body) {
        Ok(env) => env.errors.into_iter().next().and_then(Msg::first_non_empty),
        Err(_) => serde_json::from_slice::<Msg>(body)
            .ok()
            .and_then(Msg::first_non_empty),
    };
    found.unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        assert_eq!(sanitize_api_key("  \"abc def\n\" ").unwrap(), "abcdef");
    }

    #[test]
    fn sanitize_rejects_non_ascii() {
        assert!(matches!(
            sanitize_api_key("tökén"),
            Err(HttpError::Build(_))
        ));
    }

    #[test]
    fn twitter_error_envelope() {
        let body = br#"{"errors":[{"parameters":{},"message":"Invalid max_results"}]}"#;
        assert_eq!(extract_error_message(body), "Invalid max_results");
    }

    #[test]
    fn problem_body_prefers_detail_over_title() {
        let body = br#"{"title":"Unauthorized","type":"about:blank","status":401,"detail":"Unauthorized request"}"#;
        assert_eq!(extract_error_message(body), "Unauthorized request");
    }

    #[test]
    fn unknown_body_falls_back_to_snippet() {
        assert_eq!(extract_error_message(b"bad gateway"), "bad gateway");
        let long = "x".repeat(600);
        let snip = extract_error_message(long.as_bytes());
        assert_eq!(snip.len(), SNIPPET_MAX + 3);
    }

    #[test]
    fn secret_params_are_redacted() {
        let q = vec![("query", Cow::from("rust")), ("token", Cow::from("s3cret"))];
        let red = redact_query(&q);
        assert_eq!(red[0], ("query".into(), "rust".into()));
        assert_eq!(red[1], ("token".into(), "<redacted>".into()));
    }
}
