use clap::{Parser, Subcommand};
use moviedeck::sort::SortCriteria;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moviedeck")]
#[command(author, version, about = "Search OMDb and keep a list of favorite movies")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog
    Search {
        /// Title or part of a title
        #[arg(required = true)]
        query: String,

        /// Release year (four digits)
        #[arg(short, long)]
        year: Option<String>,

        /// Only keep titles whose genre list contains this
        #[arg(short, long)]
        genre: Option<String>,

        /// Look up the exact title instead of searching
        #[arg(long)]
        exact: bool,

        /// Sort results by title, year, rating, released or runtime
        #[arg(short, long)]
        sort: Option<SortCriteria>,

        /// Sort in descending order
        #[arg(long)]
        descending: bool,
    },

    /// Show full details for one title
    Details {
        /// IMDb id, e.g. tt0133093
        #[arg(required = true)]
        imdb_id: String,
    },

    /// Manage the favorites list
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// Print the stored favorites
    List,

    /// Look up a title and add it
    Add {
        #[arg(required = true)]
        imdb_id: String,
    },

    /// Remove a title
    Remove {
        #[arg(required = true)]
        imdb_id: String,
    },

    /// Add a title if absent, remove it if present
    Toggle {
        #[arg(required = true)]
        imdb_id: String,
    },
}
