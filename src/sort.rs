//! Client-side ordering of the shared result list.
//!
//! The provider returns records in its own relevance order; the user can
//! reorder them by title, year, rating, release year or runtime. All of those
//! arrive as free-form provider strings (`"2010"`, `"2008–2013"`, `"8.8"`,
//! `"N/A"`, `"148 min"`), so each criterion parses leniently and falls back to
//! a fixed position instead of failing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use moviedeck_common::Movie;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::ResultList;
use crate::tasks::Background;

/// Key the result list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortCriteria {
    #[default]
    #[serde(alias = "title")]
    Title,
    #[serde(alias = "year")]
    Year,
    #[serde(alias = "rating")]
    Rating,
    #[serde(alias = "released")]
    Released,
    #[serde(alias = "runtime")]
    Runtime,
}

impl SortCriteria {
    pub const ALL: [SortCriteria; 5] = [
        Self::Title,
        Self::Year,
        Self::Rating,
        Self::Released,
        Self::Runtime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Year => "Year",
            Self::Rating => "Rating",
            Self::Released => "Released",
            Self::Runtime => "Runtime",
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortCriteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown sort criteria '{s}' (expected title, year, rating, released or runtime)")
            })
    }
}

/// Runtime in minutes from provider text such as `"142 min"`; 0 when the text
/// carries no number.
pub fn extract_runtime(runtime: &str) -> u32 {
    let trimmed = runtime.trim();
    let number = trimmed.strip_suffix("min").unwrap_or(trimmed).trim();
    number.parse().unwrap_or(0)
}

/// Leading year digits: `"1999"` and `"2008–2013"` parse, `"N/A"` does not.
fn parse_year(year: &str) -> Option<i32> {
    let trimmed = year.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn parse_rating(rating: &str) -> Option<f64> {
    rating
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
}

/// Last four characters of the release date (`"16 Jul 2010"` -> `"2010"`),
/// `"0000"` when shorter.
fn release_year(released: &str) -> String {
    let chars: Vec<char> = released.chars().collect();
    if chars.len() < 4 {
        return "0000".to_string();
    }
    chars[chars.len() - 4..].iter().collect()
}

/// Parsed values order numerically; anything unparsable orders after every
/// parsed value and equal to other unparsable values.
fn compare_parsed<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending comparison of two records under `criteria`. Total, so it is safe
/// for the standard library sorts.
pub fn compare(criteria: SortCriteria, a: &Movie, b: &Movie) -> Ordering {
    match criteria {
        SortCriteria::Title => a.title.cmp(&b.title),
        SortCriteria::Year => compare_parsed(parse_year(&a.year), parse_year(&b.year)),
        SortCriteria::Rating => compare_parsed(parse_rating(&a.rating), parse_rating(&b.rating)),
        SortCriteria::Released => release_year(&a.released).cmp(&release_year(&b.released)),
        SortCriteria::Runtime => extract_runtime(&a.runtime).cmp(&extract_runtime(&b.runtime)),
    }
}

/// Stable in-place sort; `ascending == false` reverses every comparison.
pub fn sort_movies(movies: &mut [Movie], criteria: SortCriteria, ascending: bool) {
    movies.sort_by(|a, b| {
        let ordering = compare(criteria, a, b);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// Reorders a [`ResultList`] off the calling thread.
#[derive(Debug, Clone)]
pub struct SortEngine {
    background: Background,
}

impl SortEngine {
    pub fn new(background: Background) -> Self {
        Self { background }
    }

    /// Sort `list` in place on the blocking pool, holding the list lock for
    /// the whole comparison and swap phase.
    ///
    /// Concurrent sorts are not queued or cancelled: whichever takes the lock
    /// last determines the final order.
    pub fn sort(&self, list: &ResultList, criteria: SortCriteria, ascending: bool) {
        let list = list.downgrade();
        self.background.spawn_blocking(move || {
            let Some(list) = list.upgrade() else {
                return;
            };
            let mut state = list.lock();
            sort_movies(&mut state.movies, criteria, ascending);
            debug!(
                criteria = %criteria,
                ascending,
                count = state.movies.len(),
                "Sorted result list"
            );
        });
    }
}
