//! Persisted favorites list.
//!
//! [`FavoritesStore`] owns the favorites collection and its JSON document.
//! Membership checks and mutations are synchronous and run against the
//! in-memory collection under its lock; every mutation is followed by an
//! asynchronous flush. Loading and saving happen in background tasks.
//!
//! At most one load and one writer run at a time. A save requested while the
//! writer is busy does not start a second writer: it marks the collection
//! dirty and the running writer takes another snapshot before it exits, so
//! the document always ends up matching the last in-memory state.

mod document;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moviedeck_common::{Error, Movie, Result};
use parking_lot::{Condvar, Mutex};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::tasks::Background;

pub use document::{read_document, write_document, write_document_blocking};

/// Which background operations are running.
#[derive(Debug, Default)]
struct Activity {
    loading: bool,
    saving: bool,
    /// A save was requested since the writer took its last snapshot.
    save_requested: bool,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    favorites: Mutex<Vec<Movie>>,
    activity: Mutex<Activity>,
    idle: Condvar,
}

impl Inner {
    fn snapshot(&self) -> Vec<Movie> {
        self.favorites.lock().clone()
    }

    /// Block the calling thread until no load or save is running.
    fn wait_idle(&self) {
        let mut activity = self.activity.lock();
        while activity.loading || activity.saving {
            self.idle.wait(&mut activity);
        }
    }
}

/// Clears the `loading` flag when a load task ends, including by panic in the
/// completion callback.
struct LoadGuard(Arc<Inner>);

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.0.activity.lock().loading = false;
        self.0.idle.notify_all();
    }
}

/// Clears the `saving` flag if a writer task ends without going through its
/// normal exit path.
struct SaveGuard(Option<Arc<Inner>>);

impl SaveGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.0.take() {
            inner.activity.lock().saving = false;
            inner.idle.notify_all();
        }
    }
}

/// The user's favorites, unique by IMDb id, in insertion order.
///
/// Dropping the store blocks until in-flight loads and saves have finished;
/// on a current-thread runtime it writes the collection synchronously
/// instead. Prefer [`shutdown`](Self::shutdown) from async code.
#[derive(Debug)]
pub struct FavoritesStore {
    inner: Arc<Inner>,
    background: Background,
}

impl FavoritesStore {
    /// Store backed by the document at `path`. Nothing is read until
    /// [`load_async`](Self::load_async).
    ///
    /// Background work runs on `background`'s runtime under a tracker of its
    /// own, so [`shutdown`](Self::shutdown) only waits for favorites I/O.
    pub fn new(path: impl Into<PathBuf>, background: &Background) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                favorites: Mutex::new(Vec::new()),
                activity: Mutex::new(Activity::default()),
                idle: Condvar::new(),
            }),
            background: background.scoped(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn is_favorite(&self, imdb_id: &str) -> bool {
        self.inner
            .favorites
            .lock()
            .iter()
            .any(|m| m.imdb_id == imdb_id)
    }

    pub fn count(&self) -> usize {
        self.inner.favorites.lock().len()
    }

    /// Copy of the collection.
    pub fn snapshot(&self) -> Vec<Movie> {
        self.inner.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.activity.lock().loading
    }

    pub fn is_saving(&self) -> bool {
        self.inner.activity.lock().saving
    }

    /// Insert `movie` unless its id is already present, then flush.
    ///
    /// Returns whether it was inserted. Records without an id are rejected.
    pub fn add(&self, movie: &Movie) -> Result<bool> {
        if !movie.has_id() {
            return Err(Error::MissingId);
        }

        let inserted = {
            let mut favorites = self.inner.favorites.lock();
            if favorites.iter().any(|m| m.imdb_id == movie.imdb_id) {
                false
            } else {
                favorites.push(stored(movie));
                true
            }
        };

        debug!(imdb_id = %movie.imdb_id, inserted, "Add favorite");
        self.save_async();
        Ok(inserted)
    }

    /// Remove the record with `imdb_id`, then flush. Returns whether one was
    /// removed.
    pub fn remove(&self, imdb_id: &str) -> bool {
        let removed = {
            let mut favorites = self.inner.favorites.lock();
            let before = favorites.len();
            favorites.retain(|m| m.imdb_id != imdb_id);
            favorites.len() < before
        };

        debug!(imdb_id, removed, "Remove favorite");
        self.save_async();
        removed
    }

    /// Flip membership of `movie` and return the new membership, then flush.
    ///
    /// The check and the mutation happen under a single lock acquisition, so
    /// a concurrent `add`/`remove` cannot interleave between them.
    pub fn toggle(&self, movie: &Movie) -> Result<bool> {
        if !movie.has_id() {
            return Err(Error::MissingId);
        }

        let now_favorite = {
            let mut favorites = self.inner.favorites.lock();
            match favorites.iter().position(|m| m.imdb_id == movie.imdb_id) {
                Some(index) => {
                    favorites.remove(index);
                    false
                }
                None => {
                    favorites.push(stored(movie));
                    true
                }
            }
        };

        debug!(imdb_id = %movie.imdb_id, now_favorite, "Toggle favorite");
        self.save_async();
        Ok(now_favorite)
    }

    /// Load the document in the background and pass a copy of the resulting
    /// collection to `callback`.
    ///
    /// Does nothing and returns `false` if a load is already running. A
    /// successfully read document replaces the collection; a missing,
    /// unreadable or malformed one leaves it as it was. The callback fires
    /// either way, on a background thread.
    pub fn load_async<F>(&self, callback: F) -> bool
    where
        F: FnOnce(Vec<Movie>) + Send + 'static,
    {
        {
            let mut activity = self.inner.activity.lock();
            if activity.loading {
                debug!("Favorites load already in flight");
                return false;
            }
            activity.loading = true;
        }

        let guard = LoadGuard(self.inner.clone());
        self.background.spawn(async move {
            let inner = guard.0.clone();
            match read_document(&inner.path).await {
                Ok(Some(movies)) => {
                    let movies = dedupe(movies);
                    info!(path = ?inner.path, count = movies.len(), "Loaded favorites");
                    *inner.favorites.lock() = movies;
                }
                Ok(None) => {
                    debug!(path = ?inner.path, "No favorites document yet");
                }
                Err(e) => {
                    warn!(path = ?inner.path, error = %e, "Failed to load favorites; keeping current list");
                }
            }

            callback(inner.snapshot());
            drop(guard);
        });

        true
    }

    /// Flush the collection to its document in the background.
    ///
    /// Returns `false` when a writer is already running; that writer will
    /// pick up the current state before it finishes.
    pub fn save_async(&self) -> bool {
        {
            let mut activity = self.inner.activity.lock();
            activity.save_requested = true;
            if activity.saving {
                return false;
            }
            activity.saving = true;
        }

        let mut guard = SaveGuard(Some(self.inner.clone()));
        let inner = self.inner.clone();
        self.background.spawn(async move {
            loop {
                inner.activity.lock().save_requested = false;

                let snapshot = inner.snapshot();
                match write_document(&inner.path, &snapshot).await {
                    Ok(()) => debug!(path = ?inner.path, count = snapshot.len(), "Saved favorites"),
                    Err(e) => warn!(path = ?inner.path, error = %e, "Failed to save favorites"),
                }

                let mut activity = inner.activity.lock();
                if !activity.save_requested {
                    activity.saving = false;
                    drop(activity);
                    guard.disarm();
                    inner.idle.notify_all();
                    break;
                }
            }
        });

        true
    }

    /// Wait for every in-flight load and save.
    pub async fn shutdown(&self) {
        self.background.drain().await;
    }
}

impl Drop for FavoritesStore {
    fn drop(&mut self) {
        let saving = {
            let activity = self.inner.activity.lock();
            if !activity.loading && !activity.saving {
                return;
            }
            activity.saving
        };

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                // The writer task cannot make progress while this thread is
                // blocked, so flush the current state synchronously instead.
                warn!(
                    path = ?self.inner.path,
                    "Favorites store dropped with I/O in flight on a current-thread runtime; \
                     call shutdown().await before dropping"
                );
                if saving {
                    let snapshot = self.inner.snapshot();
                    match write_document_blocking(&self.inner.path, &snapshot) {
                        Ok(()) => debug!(path = ?self.inner.path, count = snapshot.len(), "Saved favorites on drop"),
                        Err(e) => warn!(path = ?self.inner.path, error = %e, "Failed to save favorites on drop"),
                    }
                }
            }
            Ok(_) => tokio::task::block_in_place(|| self.inner.wait_idle()),
            Err(_) => self.inner.wait_idle(),
        }
    }
}

/// Copy of `movie` as it is kept in the collection.
fn stored(movie: &Movie) -> Movie {
    let mut movie = movie.clone();
    movie.fetching = false;
    movie
}

/// Keep the first record per id and drop records without one.
fn dedupe(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = std::collections::HashSet::new();
    movies
        .into_iter()
        .filter(|m| {
            if !m.has_id() {
                warn!(title = %m.title, "Dropping stored favorite without an id");
                return false;
            }
            seen.insert(m.imdb_id.clone())
        })
        .collect()
}
