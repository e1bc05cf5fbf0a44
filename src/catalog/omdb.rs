//! OMDb (Open Movie Database) HTTP client.
//!
//! Three request shapes, all `GET <base_url>?apikey=<key>&...`:
//!
//! - `t=<title>` -- exact title lookup returning one full record.
//! - `s=<title>` -- fuzzy search returning a `Search` array of summary hits.
//! - `i=<imdb id>&plot=full` -- full details for one known record.
//!
//! Every response is a JSON object with a `Response` field of `"True"` or
//! `"False"`. Requests are throttled with a token bucket via [`governor`],
//! since a genre-filtered search issues one detail request per hit.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use moviedeck_common::{Movie, NOT_AVAILABLE, UNKNOWN_TITLE, UNKNOWN_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;

/// Failure of one provider request.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No response at all (connection, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {0}")]
    Status(StatusCode),

    /// The response body was not the JSON we expect.
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// The provider answered `Response: "False"`.
    #[error("provider reported no match: {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// OMDb response types
// ---------------------------------------------------------------------------

/// Full title record as returned by `t=` and `i=` lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    poster: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
    plot: Option<String>,
    #[serde(rename = "imdbRating")]
    rating: Option<String>,
    actors: Option<String>,
    director: Option<String>,
    genre: Option<String>,
    runtime: Option<String>,
    released: Option<String>,
}

/// One entry of a `s=` search page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSummary {
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    poster: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchPage {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSummary>,
}

fn or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl OmdbTitle {
    /// Genre as reported, `"N/A"` when absent.
    pub fn genre(&self) -> String {
        or_na(&self.genre)
    }

    /// Build a fully detailed record.
    pub fn to_movie(&self) -> Movie {
        let mut movie = Movie {
            title: self.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            year: or_na(&self.year),
            imdb_id: self.imdb_id.clone().unwrap_or_default(),
            poster_url: or_na(&self.poster),
            kind: self.kind.clone().unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            ..Movie::default()
        };
        self.apply_to(&mut movie);
        movie
    }

    /// Copy the detail fields onto an existing record and mark it detailed.
    /// Identity and summary fields are left alone.
    pub fn apply_to(&self, movie: &mut Movie) {
        movie.plot = or_na(&self.plot);
        movie.rating = or_na(&self.rating);
        movie.actors = or_na(&self.actors);
        movie.director = or_na(&self.director);
        movie.genre = or_na(&self.genre);
        movie.runtime = or_na(&self.runtime);
        movie.released = or_na(&self.released);
        movie.has_details = true;
    }
}

impl OmdbSummary {
    /// Build a summary record (`has_details == false`).
    pub fn to_movie(&self) -> Movie {
        Movie {
            title: self.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            year: or_na(&self.year),
            imdb_id: self.imdb_id.clone().unwrap_or_default(),
            poster_url: or_na(&self.poster),
            kind: self.kind.clone().unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            ..Movie::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OMDb API client.
///
/// Holds one pooled `reqwest` client, so a single instance should be shared
/// (behind an `Arc`) by every operation.
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl OmdbClient {
    pub fn new(config: &ProviderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            rate_limiter,
        }
    }

    /// Exact title lookup (`t=`).
    pub async fn find_title(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> Result<OmdbTitle, ProviderError> {
        debug!(title, year, "OMDb exact title lookup");
        let mut params = vec![("t", title)];
        if let Some(year) = year {
            params.push(("y", year));
        }
        self.get(&params).await
    }

    /// Fuzzy search (`s=`), one page of summary hits.
    pub async fn search(
        &self,
        query: &str,
        year: Option<&str>,
    ) -> Result<Vec<OmdbSummary>, ProviderError> {
        debug!(query, year, "OMDb search");
        let mut params = vec![("s", query)];
        if let Some(year) = year {
            params.push(("y", year));
        }
        let page: OmdbSearchPage = self.get(&params).await?;
        Ok(page.search)
    }

    /// Full details for one record (`i=<id>&plot=full`).
    pub async fn details(&self, imdb_id: &str) -> Result<OmdbTitle, ProviderError> {
        debug!(imdb_id, "OMDb detail lookup");
        self.get(&[("i", imdb_id), ("plot", "full")]).await
    }

    /// Issue one rate-limited request and decode a `Response: "True"` body.
    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, ProviderError> {
        self.rate_limiter.until_ready().await;

        let resp = self.client.get(self.url(params)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body = resp.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;

        if value.get("Response").and_then(|r| r.as_str()) != Some("True") {
            let reason = value
                .get("Error")
                .and_then(|e| e.as_str())
                .unwrap_or_default()
                .to_string();
            return Err(ProviderError::NotFound(reason));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Build the request URL. Parameter values go through [`encode_query`].
    fn url(&self, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}?apikey={}", self.base_url, encode_query(&self.api_key));
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&encode_query(value));
        }
        url
    }
}

/// Percent-encode a query value: ASCII alphanumerics and `-` pass through,
/// space becomes `+`, every other byte becomes `%XX`.
pub fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' => out.push(b as char),
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";
