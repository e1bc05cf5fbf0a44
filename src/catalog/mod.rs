//! Movie catalog access: the OMDb client and the search service built on it.
//!
//! # Module layout
//!
//! - [`omdb`] -- HTTP client, response types and query encoding.
//! - [`search`] -- Background search, genre filtering and detail enrichment.

pub mod omdb;
pub mod search;

pub use omdb::{encode_query, OmdbClient, ProviderError};
pub use search::{
    genre_matches, DetailRequest, SearchRequest, SearchService, SearchStatus, SEARCHING,
};
