//! Moviedeck-Common: Shared types used across moviedeck.
//!
//! - **Movie record**: the flat value type that flows through search, detail
//!   enrichment, sorting and favorites persistence.
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use moviedeck_common::{Movie, Error, Result};
//!
//! let movie = Movie::summary("tt0133093", "The Matrix", "1999");
//! assert!(movie.has_id());
//! assert!(!movie.has_details);
//!
//! fn example() -> Result<()> {
//!     Err(Error::MissingId)
//! }
//! ```

pub mod error;
pub mod movie;

pub use error::{Error, Result};
pub use movie::*;
