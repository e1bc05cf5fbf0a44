//! The controller a front end drives: one result list, one status line.
//!
//! A [`Session`] wires the search service, the favorites store and the sort
//! engine to a shared [`ResultList`]. Every method returns immediately; the
//! work runs in background tasks whose completions write back into the list.
//! A front end renders [`Session::results`] each frame and calls the methods
//! below on user input. The CLI uses it the same way and then waits with
//! [`Session::settle`].

use std::path::Path;
use std::sync::Arc;

use moviedeck_common::{Error, Result};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::catalog::{DetailRequest, OmdbClient, SearchRequest, SearchService, SEARCHING};
use crate::config::{Config, SortConfig};
use crate::favorites::FavoritesStore;
use crate::sort::{SortCriteria, SortEngine};
use crate::state::ResultList;
use crate::tasks::Background;

pub const LOADING_FAVORITES: &str = "Loading favorites...";
pub const FAVORITES_UPDATED: &str = "favorites updated";

/// How a status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Nothing to show.
    Empty,
    /// An operation is running.
    Pending,
    /// The last operation succeeded.
    Success,
    /// A favorites mutation was applied.
    Updated,
    /// The last operation failed or found nothing.
    Failure,
}

impl StatusTone {
    pub fn of(status: &str) -> Self {
        if status.is_empty() {
            Self::Empty
        } else if status == SEARCHING || status == LOADING_FAVORITES {
            Self::Pending
        } else if status.starts_with("Found") || status.starts_with("Loaded") {
            Self::Success
        } else if status == FAVORITES_UPDATED {
            Self::Updated
        } else {
            Self::Failure
        }
    }
}

pub struct Session {
    results: ResultList,
    service: SearchService,
    favorites: FavoritesStore,
    sorter: SortEngine,
    sort: Arc<Mutex<SortConfig>>,
    background: Background,
}

impl Session {
    /// Build a session from configuration. Nothing is loaded or requested
    /// until the corresponding method is called.
    pub fn new(config: &Config, background: Background) -> Self {
        let client = Arc::new(OmdbClient::new(&config.provider));
        Self {
            results: ResultList::new(),
            service: SearchService::new(client, background.clone()),
            favorites: FavoritesStore::new(config.favorites.path.clone(), &background),
            sorter: SortEngine::new(background.clone()),
            sort: Arc::new(Mutex::new(config.sort)),
            background,
        }
    }

    /// The list the front end renders.
    pub fn results(&self) -> &ResultList {
        &self.results
    }

    pub fn status(&self) -> String {
        self.results.status()
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn service(&self) -> &SearchService {
        &self.service
    }

    pub fn favorites_path(&self) -> &Path {
        self.favorites.path()
    }

    /// Current sort settings.
    pub fn sort_settings(&self) -> SortConfig {
        *self.sort.lock()
    }

    /// Run a search. The list shows [`SEARCHING`] until the completion
    /// replaces records and status. A search that found results is then
    /// re-sorted with the settings current at that moment.
    pub fn search(&self, request: SearchRequest) {
        self.results.set_status(SEARCHING);
        let generation = self.results.generation();
        let list = self.results.downgrade();
        let sorter = self.sorter.clone();
        let sort = self.sort.clone();

        self.service.search(request, move |movies, status| {
            let Some(list) = list.upgrade() else {
                return;
            };
            if !list.replace_if_current(generation, movies, status.to_string()) {
                debug!("Discarding search results for a cleared list");
                return;
            }
            if status.is_success() {
                let settings = *sort.lock();
                sorter.sort(&list, settings.criteria, settings.ascending);
            }
        });
    }

    /// Load the favorites document and show its contents.
    pub fn load_favorites(&self) {
        self.results.set_status(LOADING_FAVORITES);
        let generation = self.results.generation();
        let list = self.results.downgrade();

        let started = self.favorites.load_async(move |movies| {
            let Some(list) = list.upgrade() else {
                return;
            };
            let status = format!("Loaded {} favorite movies", movies.len());
            if list.replace_if_current(generation, movies, status) {
                info!(count = list.len(), "Showing favorites");
            }
        });
        if !started {
            debug!("Favorites already loading");
        }
    }

    /// Change the sort key and re-sort.
    pub fn set_sort_criteria(&self, criteria: SortCriteria) {
        let settings = {
            let mut sort = self.sort.lock();
            sort.criteria = criteria;
            *sort
        };
        self.sorter
            .sort(&self.results, settings.criteria, settings.ascending);
    }

    /// Flip the sort direction and re-sort. Returns the new direction.
    pub fn toggle_direction(&self) -> bool {
        let settings = {
            let mut sort = self.sort.lock();
            sort.ascending = !sort.ascending;
            *sort
        };
        self.sorter
            .sort(&self.results, settings.criteria, settings.ascending);
        settings.ascending
    }

    /// Enrich the listed record `imdb_id` with full details.
    pub fn open_details(&self, imdb_id: &str) -> DetailRequest {
        self.service
            .fetch_details(&self.results, imdb_id, |movie| {
                debug!(imdb_id = %movie.imdb_id, has_details = movie.has_details, "Details settled");
            })
    }

    /// Toggle favorite membership of the listed record `imdb_id` and return
    /// the new membership.
    pub fn toggle_favorite(&self, imdb_id: &str) -> Result<bool> {
        let movie = self
            .results
            .lock()
            .find(imdb_id)
            .cloned()
            .ok_or_else(|| Error::invalid_input(format!("{imdb_id} is not in the result list")))?;

        let now_favorite = self.favorites.toggle(&movie)?;
        self.results.set_status(FAVORITES_UPDATED);
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, imdb_id: &str) -> bool {
        self.favorites.is_favorite(imdb_id)
    }

    /// Empty the list and status. Searches and loads already in flight will
    /// not repopulate it.
    pub fn clear(&self) {
        self.results.clear();
    }

    /// Wait until every operation started so far, including the sorts and
    /// saves they trigger, has finished.
    pub async fn settle(&self) {
        loop {
            self.background.drain().await;
            self.favorites.shutdown().await;
            if self.background.in_flight() == 0 && !self.favorites.is_saving() {
                break;
            }
        }
    }

    /// Finish all background work. The session stays usable afterwards.
    pub async fn shutdown(&self) {
        self.settle().await;
        info!("Session shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tones() {
        assert_eq!(StatusTone::of(""), StatusTone::Empty);
        assert_eq!(StatusTone::of(SEARCHING), StatusTone::Pending);
        assert_eq!(StatusTone::of(LOADING_FAVORITES), StatusTone::Pending);
        assert_eq!(StatusTone::of("Found 3 results"), StatusTone::Success);
        assert_eq!(StatusTone::of("Loaded 2 favorite movies"), StatusTone::Success);
        assert_eq!(StatusTone::of(FAVORITES_UPDATED), StatusTone::Updated);
        assert_eq!(StatusTone::of("Request failed!"), StatusTone::Failure);
        assert_eq!(StatusTone::of("No results found"), StatusTone::Failure);
    }
}
