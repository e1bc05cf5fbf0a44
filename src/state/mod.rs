//! The shared result list read by the foreground and mutated by completions.
//!
//! [`ResultList`] is the one piece of state the presentation layer and the
//! background operations both touch: searches and favorites loads replace it
//! wholesale, the sort engine reorders it, detail fetches update single
//! records. Every mutation happens under one exclusive lock and no lock is
//! ever held across network or file I/O.
//!
//! Completions never hold a strong reference. They capture a
//! [`WeakResultList`] and become no-ops once the owner has dropped the list,
//! and they can pin a [`Generation`] so results requested before a
//! [`clear`](ResultList::clear) are discarded instead of resurrecting the
//! cleared view.

use std::sync::{Arc, Weak};

use moviedeck_common::Movie;
use parking_lot::{Mutex, MutexGuard};

/// Contents of the result list: the records on screen plus the status line.
#[derive(Debug, Default)]
pub struct ListState {
    pub movies: Vec<Movie>,
    pub status: String,
    generation: u64,
}

impl ListState {
    /// Generation of the view these contents belong to.
    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Find a record by id.
    pub fn find(&self, imdb_id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.imdb_id == imdb_id)
    }

    /// Find a record by id for in-place mutation.
    pub fn find_mut(&mut self, imdb_id: &str) -> Option<&mut Movie> {
        self.movies.iter_mut().find(|m| m.imdb_id == imdb_id)
    }
}

/// Identifies one view of the list; bumped by every [`ResultList::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Lock-protected list of records owned by the presentation layer.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    inner: Arc<Mutex<ListState>>,
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the list lock. Keep the guard for the duration of one frame's read
    /// or one mutation, never across I/O.
    pub fn lock(&self) -> MutexGuard<'_, ListState> {
        self.inner.lock()
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> Vec<Movie> {
        self.inner.lock().movies.clone()
    }

    /// Current status line.
    pub fn status(&self) -> String {
        self.inner.lock().status.clone()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        self.inner.lock().status = status.into();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().movies.is_empty()
    }

    /// Current view generation, to be pinned by an operation about to start.
    pub fn generation(&self) -> Generation {
        self.inner.lock().generation()
    }

    /// Replace records and status unconditionally.
    pub fn replace(&self, movies: Vec<Movie>, status: impl Into<String>) {
        let mut state = self.inner.lock();
        state.movies = movies;
        state.status = status.into();
    }

    /// Replace records and status only if the view has not been cleared since
    /// `generation` was taken. Returns whether the replacement happened.
    pub fn replace_if_current(
        &self,
        generation: Generation,
        movies: Vec<Movie>,
        status: impl Into<String>,
    ) -> bool {
        let mut state = self.inner.lock();
        if state.generation() != generation {
            return false;
        }
        state.movies = movies;
        state.status = status.into();
        true
    }

    /// Empty the list and status, and invalidate every pinned generation.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.movies.clear();
        state.status.clear();
        state.generation += 1;
    }

    /// Apply `update` to the record with `imdb_id` in place and return a copy
    /// of the result, or `None` if no such record is listed.
    pub fn update<F>(&self, imdb_id: &str, update: F) -> Option<Movie>
    where
        F: FnOnce(&mut Movie),
    {
        let mut state = self.inner.lock();
        let movie = state.find_mut(imdb_id)?;
        update(movie);
        Some(movie.clone())
    }

    /// Non-owning handle for completions that may outlive the list's owner.
    pub fn downgrade(&self) -> WeakResultList {
        WeakResultList {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Weak counterpart of [`ResultList`], captured by background completions.
#[derive(Debug, Clone)]
pub struct WeakResultList {
    inner: Weak<Mutex<ListState>>,
}

impl WeakResultList {
    /// The list, if its owner still holds it.
    pub fn upgrade(&self) -> Option<ResultList> {
        self.inner.upgrade().map(|inner| ResultList { inner })
    }
}
