//! The movie record shared by every moviedeck pipeline.
//!
//! A [`Movie`] starts life either as a lightweight search hit (title, year,
//! id, poster, type) or as a fully detailed record, and is enriched in place
//! once the provider has been asked for the remaining fields. The same struct
//! is what the favorites document stores on disk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder the provider uses (and we default to) for missing fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Title used when the provider response carries none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Type used when the provider response carries none.
pub const UNKNOWN_TYPE: &str = "unknown";

const IMDB_TITLE_URL: &str = "https://imdb.com/title/";

/// A single movie, series or episode as reported by the metadata provider.
///
/// Equality is by `imdb_id` only: two records for the same title compare equal
/// regardless of how much detail each one carries.
///
/// The serialized form is the favorites document entry: every descriptive
/// field plus `hasDetails`. The `fetching` flag is transient and never
/// written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub imdb_id: String,
    pub poster_url: String,
    /// `movie`, `series`, `episode`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub plot: String,
    pub rating: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
    pub runtime: String,
    /// Release date as the provider formats it, e.g. `"16 Jul 2010"`.
    pub released: String,
    /// Full detail fields (plot, cast, ...) have been populated.
    #[serde(rename = "hasDetails")]
    pub has_details: bool,
    /// A detail fetch is in flight for this record.
    #[serde(skip)]
    pub fetching: bool,
}

impl Default for Movie {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            year: NOT_AVAILABLE.to_string(),
            imdb_id: String::new(),
            poster_url: NOT_AVAILABLE.to_string(),
            kind: UNKNOWN_TYPE.to_string(),
            plot: NOT_AVAILABLE.to_string(),
            rating: NOT_AVAILABLE.to_string(),
            actors: NOT_AVAILABLE.to_string(),
            director: NOT_AVAILABLE.to_string(),
            genre: NOT_AVAILABLE.to_string(),
            runtime: NOT_AVAILABLE.to_string(),
            released: NOT_AVAILABLE.to_string(),
            has_details: false,
            fetching: false,
        }
    }
}

impl Movie {
    /// Build a summary record (no details) from the three fields every search
    /// hit carries.
    pub fn summary(
        imdb_id: impl Into<String>,
        title: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: title.into(),
            year: year.into(),
            ..Self::default()
        }
    }

    /// Whether the record can be keyed (favorited, looked up by id).
    pub fn has_id(&self) -> bool {
        !self.imdb_id.trim().is_empty()
    }

    /// Header text for list views: `Title (Year)`, with ` [type]` appended for
    /// anything that is not a plain movie.
    pub fn label(&self) -> String {
        if self.kind == "movie" {
            format!("{} ({})", self.title, self.year)
        } else {
            format!("{} ({}) [{}]", self.title, self.year, self.kind)
        }
    }

    /// Link to the IMDb title page, if the record has an id.
    pub fn imdb_url(&self) -> Option<String> {
        self.has_id()
            .then(|| format!("{IMDB_TITLE_URL}{}", self.imdb_id))
    }

    /// Poster link, unless the provider had none.
    pub fn poster(&self) -> Option<&str> {
        known(&self.poster_url)
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.imdb_id == other.imdb_id
    }
}

impl Eq for Movie {}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Returns the value unless it is empty or the provider's `"N/A"` marker.
pub fn known(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_provider_placeholders() {
        let movie = Movie::default();
        assert_eq!(movie.title, "Unknown Title");
        assert_eq!(movie.kind, "unknown");
        assert_eq!(movie.plot, "N/A");
        assert!(movie.imdb_id.is_empty());
        assert!(!movie.has_details);
        assert!(!movie.fetching);
    }

    #[test]
    fn equality_is_by_id() {
        let mut a = Movie::summary("tt0111161", "The Shawshank Redemption", "1994");
        let b = Movie::summary("tt0111161", "Shawshank", "N/A");
        assert_eq!(a, b);

        a.imdb_id = "tt0068646".into();
        assert_ne!(a, b);
    }

    #[test]
    fn has_id_rejects_blank() {
        assert!(!Movie::default().has_id());
        assert!(!Movie::summary("  ", "Blank", "2000").has_id());
        assert!(Movie::summary("tt1375666", "Inception", "2010").has_id());
    }

    #[test]
    fn label_marks_non_movies() {
        let mut movie = Movie::summary("tt0903747", "Breaking Bad", "2008–2013");
        movie.kind = "series".into();
        assert_eq!(movie.label(), "Breaking Bad (2008–2013) [series]");

        movie.kind = "movie".into();
        assert_eq!(movie.label(), "Breaking Bad (2008–2013)");
    }

    #[test]
    fn imdb_url_requires_id() {
        let movie = Movie::summary("tt1375666", "Inception", "2010");
        assert_eq!(
            movie.imdb_url().as_deref(),
            Some("https://imdb.com/title/tt1375666")
        );
        assert_eq!(Movie::default().imdb_url(), None);
    }

    #[test]
    fn serialized_form_uses_document_field_names() {
        let mut movie = Movie::summary("tt1375666", "Inception", "2010");
        movie.kind = "movie".into();
        movie.fetching = true;

        let json = serde_json::to_value(&movie).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 13);
        assert_eq!(json["type"], "movie");
        assert_eq!(json["hasDetails"], false);
        assert!(object.get("fetching").is_none());
        assert!(object.get("kind").is_none());
    }

    #[test]
    fn deserialized_record_is_never_fetching() {
        let json = r#"{
            "title": "Inception", "year": "2010", "imdb_id": "tt1375666",
            "poster_url": "N/A", "type": "movie", "plot": "N/A", "rating": "8.8",
            "actors": "N/A", "director": "N/A", "genre": "Action", "runtime": "148 min",
            "released": "16 Jul 2010", "hasDetails": true
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert!(movie.has_details);
        assert!(!movie.fetching);
        assert_eq!(movie.rating, "8.8");
    }

    #[test]
    fn known_filters_placeholders() {
        assert_eq!(known("N/A"), None);
        assert_eq!(known("   "), None);
        assert_eq!(known(" 8.1 "), Some("8.1"));
    }
}
