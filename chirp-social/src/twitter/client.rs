//! Wrapper around the Twitter/X recent search endpoint.
//!
//! [`TwitterApi::fetch`] is the main entry point: it validates the request, performs a
//! single search call and hands back a one-column [`Table`] of post text, cleaned
//! unless the caller opts out. The bearer token is supplied at construction time.
use crate::clean::{self, DEFAULT_COLUMN};
use crate::table::{Table, TableError};
use crate::twitter::types::SearchResponse;
use chirp_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
const SEARCH_PATH: &str = "2/tweets/search/recent";

/// Accepted values for [`FetchOptions::count`].
pub const COUNT_RANGE: RangeInclusive<u32> = 5..=100;
/// The endpoint rejects `max_results` below this.
const API_MIN_RESULTS: u32 = 10;

/// Name of the column produced by [`TwitterApi::fetch`].
pub const TEXT_COLUMN: &str = DEFAULT_COLUMN;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("Wrong count parameter, it should be between 5 and 100. (got {count})")]
    CountOutOfRange { count: u32 },
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Run the text column through [`clean::clean_column`].
    pub clean: bool,
    /// Upper bound on returned rows, within [`COUNT_RANGE`].
    pub count: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            clean: true,
            count: 100,
        }
    }
}

/// Check a result count against [`COUNT_RANGE`].
///
/// ```
/// use chirp_social::twitter::client::{validate_count, SearchError};
///
/// assert_eq!(validate_count(5).unwrap(), 5);
/// assert!(matches!(validate_count(101), Err(SearchError::CountOutOfRange { count: 101 })));
/// ```
pub fn validate_count(count: u32) -> Result<u32, SearchError> {
    if COUNT_RANGE.contains(&count) {
        Ok(count)
    } else {
        Err(SearchError::CountOutOfRange { count })
    }
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Result<Self, SearchError> {
        Self::with_base_url(DEFAULT_BASE_URL, bearer_token)
    }

    /// Point the client at another host, e.g. a proxy or a test server.
    pub fn with_base_url(base: &str, bearer_token: String) -> Result<Self, SearchError> {
        let http = HttpClient::new(base)?;
        Ok(Self {
            http,
            bearer: bearer_token,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// One call to the recent search endpoint, no pagination and no retries.
    pub async fn recent_search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<SearchResponse, SearchError> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", query.into()),
            ("max_results", max_results.to_string().into()),
        ];

        let resp: SearchResponse = self
            .http
            .get_json(
                SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            returned = resp.tweets().len(),
            result_count = ?resp.meta.as_ref().and_then(|m| m.result_count),
            has_next = resp.meta.as_ref().is_some_and(|m| m.next_token.is_some()),
            "twitter.search.response"
        );
        Ok(resp)
    }

    /// Search recent posts and return them as a table with a single `text` column.
    ///
    /// Fails before any network call if `query` is blank or `opts.count` is outside
    /// [`COUNT_RANGE`]. Counts below the endpoint's own minimum of 10 still work: ten
    /// results are requested and the table is cut down to `count` rows.
    pub async fn fetch(&self, query: &str, opts: FetchOptions) -> Result<Table, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let count = validate_count(opts.count)?;

        tracing::info!(
            host = self.http.base_url().host_str().unwrap_or("-"),
            query,
            count,
            clean = opts.clean,
            "twitter.fetch.start"
        );

        let resp = self
            .recent_search(query, count.max(API_MIN_RESULTS))
            .await?;

        let mut table = Table::from_column(
            TEXT_COLUMN,
            resp.data.unwrap_or_default().into_iter().map(|t| t.text),
        );
        table.truncate(count as usize);

        if opts.clean {
            table = clean::clean_column(table, TEXT_COLUMN)?;
        }

        tracing::info!(rows = table.len(), "twitter.fetch.done");
        Ok(table)
    }
}
