//! Search and detail enrichment on top of [`OmdbClient`].
//!
//! [`SearchService`] never blocks its caller: every search and every detail
//! fetch runs as its own background task and reports through a completion
//! callback invoked on a runtime thread. Overlapping calls are allowed and are
//! not serialized against each other.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use moviedeck_common::Movie;
use tracing::{debug, info, warn};

use super::omdb::{OmdbClient, ProviderError};
use crate::state::ResultList;
use crate::tasks::Background;

/// Pre-state shown by the presentation layer while a search runs. Never
/// delivered to a completion callback.
pub const SEARCHING: &str = "Searching...";

/// Terminal status of one search, delivered exactly once to its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// The query was empty; nothing was requested.
    EmptyQuery,
    /// The provider answered; `n` records passed the filters.
    Found(usize),
    /// The provider reported no match.
    NoResults,
    /// No response, or a non-success HTTP status.
    RequestFailed,
    /// The response body could not be decoded.
    ParseError(String),
}

impl SearchStatus {
    /// Whether the search produced a result list (possibly empty).
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "Empty search query"),
            Self::Found(n) => write!(f, "Found {n} results"),
            Self::NoResults => write!(f, "No results found"),
            Self::RequestFailed => write!(f, "Request failed!"),
            Self::ParseError(detail) => write!(f, "Error parsing response: {detail}"),
        }
    }
}

impl From<&ProviderError> for SearchStatus {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Transport(_) | ProviderError::Status(_) => Self::RequestFailed,
            ProviderError::Parse(e) => Self::ParseError(e.to_string()),
            ProviderError::NotFound(_) => Self::NoResults,
        }
    }
}

/// Parameters of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Release year; only sent when exactly four characters long.
    pub year: String,
    /// Genre filter; empty matches everything.
    pub genre: String,
    /// Exact title lookup instead of a fuzzy search.
    pub exact_match: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn exact(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    /// Year as sent to the provider, if it qualifies.
    fn year_filter(&self) -> Option<&str> {
        (self.year.chars().count() == 4).then_some(self.year.as_str())
    }
}

/// Outcome of a [`SearchService::fetch_details`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRequest {
    /// A background fetch was started; the callback will fire.
    Started,
    /// The record already has details.
    AlreadyLoaded,
    /// A fetch for this record is already in flight.
    InFlight,
    /// No listed record has this id.
    NotInList,
    /// The record has no id to look up.
    MissingId,
}

/// Case-insensitive substring match of the requested genre against the
/// record's genre list. An empty request matches everything.
pub fn genre_matches(movie_genre: &str, requested: &str) -> bool {
    if requested.is_empty() {
        return true;
    }
    movie_genre
        .to_lowercase()
        .contains(&requested.to_lowercase())
}

/// Searches the catalog and enriches records, off the calling thread.
pub struct SearchService {
    client: Arc<OmdbClient>,
    background: Background,
    in_flight: Arc<AtomicUsize>,
}

impl SearchService {
    pub fn new(client: Arc<OmdbClient>, background: Background) -> Self {
        Self {
            client,
            background,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether at least one search is in flight. Observability only; it does
    /// not gate new searches.
    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Start a search and report `(results, status)` to `callback`.
    ///
    /// An empty query calls back synchronously, on the caller's thread, with
    /// no results and [`SearchStatus::EmptyQuery`]. Otherwise the callback runs
    /// on a background thread once the provider has answered.
    pub fn search<F>(&self, request: SearchRequest, callback: F)
    where
        F: FnOnce(Vec<Movie>, SearchStatus) + Send + 'static,
    {
        if request.query.is_empty() {
            callback(Vec::new(), SearchStatus::EmptyQuery);
            return;
        }

        let client = self.client.clone();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        self.background.spawn(async move {
            let (results, status) = match collect(&client, &request).await {
                Ok(results) => {
                    let n = results.len();
                    (results, SearchStatus::Found(n))
                }
                Err(e) => {
                    debug!(query = %request.query, error = %e, "Search ended without results");
                    (Vec::new(), SearchStatus::from(&e))
                }
            };
            in_flight.fetch_sub(1, Ordering::SeqCst);

            info!(
                query = %request.query,
                exact = request.exact_match,
                genre = %request.genre,
                status = %status,
                "Search completed"
            );
            callback(results, status);
        });
    }

    /// Fill in full details for the listed record `imdb_id`.
    ///
    /// Returns without doing anything (and without ever calling `callback`)
    /// unless the record is listed, has an id, and has neither details nor a
    /// fetch in flight. Otherwise marks it `fetching`, requests the details in
    /// the background, applies them in place on success, clears `fetching` on
    /// every path and only then calls `callback` with the record.
    ///
    /// Failures are logged and swallowed: the record simply stays without
    /// details. If the list was dropped meanwhile the completion is a no-op;
    /// if only the record left the list, `callback` receives the record as
    /// computed from the copy taken at entry.
    pub fn fetch_details<F>(&self, list: &ResultList, imdb_id: &str, callback: F) -> DetailRequest
    where
        F: FnOnce(Movie) + Send + 'static,
    {
        let mut snapshot = {
            let mut state = list.lock();
            let Some(movie) = state.find_mut(imdb_id) else {
                return DetailRequest::NotInList;
            };
            if movie.has_details {
                return DetailRequest::AlreadyLoaded;
            }
            if movie.fetching {
                return DetailRequest::InFlight;
            }
            if !movie.has_id() {
                return DetailRequest::MissingId;
            }
            movie.fetching = true;
            movie.clone()
        };

        let client = self.client.clone();
        let list = list.downgrade();
        let imdb_id = imdb_id.to_string();

        self.background.spawn(async move {
            let detail = match client.details(&imdb_id).await {
                Ok(detail) => Some(detail),
                Err(e) => {
                    warn!(imdb_id = %imdb_id, error = %e, "Failed to fetch movie details");
                    None
                }
            };

            if let Some(ref detail) = detail {
                detail.apply_to(&mut snapshot);
            }
            snapshot.fetching = false;

            let Some(list) = list.upgrade() else {
                debug!(imdb_id = %imdb_id, "Result list dropped before details arrived");
                return;
            };

            let updated = list.update(&imdb_id, |movie| {
                if let Some(ref detail) = detail {
                    detail.apply_to(movie);
                }
                movie.fetching = false;
            });

            let movie = updated.unwrap_or_else(|| {
                debug!(imdb_id = %imdb_id, "Record left the result list during detail fetch");
                snapshot
            });
            callback(movie);
        });

        DetailRequest::Started
    }

    /// Fetch one fully detailed record by id, outside of any result list.
    pub async fn lookup(&self, imdb_id: &str) -> Result<Movie, ProviderError> {
        let detail = self.client.details(imdb_id).await?;
        let mut movie = detail.to_movie();
        if !movie.has_id() {
            movie.imdb_id = imdb_id.to_string();
        }
        Ok(movie)
    }
}

/// Body of one search: query the provider and apply the genre filter.
async fn collect(client: &OmdbClient, request: &SearchRequest) -> Result<Vec<Movie>, ProviderError> {
    let year = request.year_filter();

    if request.exact_match {
        let movie = client.find_title(&request.query, year).await?.to_movie();
        if genre_matches(&movie.genre, &request.genre) {
            return Ok(vec![movie]);
        }
        return Ok(Vec::new());
    }

    let hits = client.search(&request.query, year).await?;
    if request.genre.is_empty() {
        return Ok(hits.iter().map(|hit| hit.to_movie()).collect());
    }

    // Summary hits carry no genre, so each one needs its own detail request.
    let mut results = Vec::new();
    for hit in &hits {
        let mut movie = hit.to_movie();
        if !movie.has_id() {
            debug!(title = %movie.title, "Skipping search hit without an id");
            continue;
        }
        match client.details(&movie.imdb_id).await {
            Ok(detail) => {
                movie.genre = detail.genre();
                if genre_matches(&movie.genre, &request.genre) {
                    detail.apply_to(&mut movie);
                    results.push(movie);
                }
            }
            Err(ProviderError::Parse(e)) => return Err(ProviderError::Parse(e)),
            Err(e) => {
                debug!(imdb_id = %movie.imdb_id, error = %e, "Skipping search hit without details");
            }
        }
    }
    Ok(results)
}
