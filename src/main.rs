mod cli;

use moviedeck::{
    catalog::{SearchRequest, SearchStatus},
    config::{self, Config},
    session::{Session, StatusTone},
    tasks::Background,
};
use moviedeck_common::Movie;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, FavoritesCommand};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "moviedeck=trace,moviedeck_common=debug,reqwest=debug".to_string()
        } else {
            "moviedeck=warn,moviedeck_common=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            query,
            year,
            genre,
            exact,
            sort,
            descending,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            config::require_api_key(&config)?;
            if let Some(criteria) = sort {
                config.sort.criteria = criteria;
            }
            if descending {
                config.sort.ascending = false;
            }

            let request = SearchRequest::new(query)
                .year(year.unwrap_or_default())
                .genre(genre.unwrap_or_default())
                .exact(exact);

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(search(&config, request))
        }
        Commands::Details { imdb_id } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            config::require_api_key(&config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(details(&config, &imdb_id))
        }
        Commands::Favorites { action } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            if !matches!(action, FavoritesCommand::List | FavoritesCommand::Remove { .. }) {
                config::require_api_key(&config)?;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(favorites(&config, action))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("moviedeck {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn search(config: &Config, request: SearchRequest) -> Result<()> {
    let session = Session::new(config, Background::current());

    tracing::info!(query = %request.query, "Searching");
    session.search(request);
    session.settle().await;

    let status = session.status();
    let movies = session.results().snapshot();

    if StatusTone::of(&status) == StatusTone::Failure
        && status != SearchStatus::NoResults.to_string()
    {
        anyhow::bail!("{}", status);
    }

    println!("{}", status);
    for movie in &movies {
        let marker = if session.is_favorite(&movie.imdb_id) {
            "*"
        } else {
            " "
        };
        println!("{} {}  {}", marker, movie.imdb_id, movie.label());
    }

    Ok(())
}

async fn details(config: &Config, imdb_id: &str) -> Result<()> {
    let session = Session::new(config, Background::current());

    let movie = session
        .service()
        .lookup(imdb_id)
        .await
        .with_context(|| format!("Failed to fetch details for {}", imdb_id))?;

    print_details(&movie);
    Ok(())
}

async fn favorites(config: &Config, action: FavoritesCommand) -> Result<()> {
    let session = Session::new(config, Background::current());
    session.load_favorites();
    session.settle().await;

    let store = session.favorites();

    match action {
        FavoritesCommand::List => {
            println!("{}", session.status());
            for movie in session.results().snapshot() {
                println!("  {}  {}", movie.imdb_id, movie.label());
            }
        }
        FavoritesCommand::Add { imdb_id } => {
            if store.is_favorite(&imdb_id) {
                println!("{} is already a favorite", imdb_id);
            } else {
                let movie = lookup(&session, &imdb_id).await?;
                store.add(&movie)?;
                println!("Added {}", movie.label());
            }
        }
        FavoritesCommand::Remove { imdb_id } => {
            if store.remove(&imdb_id) {
                println!("Removed {}", imdb_id);
            } else {
                println!("{} is not a favorite", imdb_id);
            }
        }
        FavoritesCommand::Toggle { imdb_id } => {
            let movie = match store.snapshot().into_iter().find(|m| m.imdb_id == imdb_id) {
                Some(movie) => movie,
                None => lookup(&session, &imdb_id).await?,
            };
            if store.toggle(&movie)? {
                println!("Added {}", movie.label());
            } else {
                println!("Removed {}", movie.label());
            }
        }
    }

    session.shutdown().await;
    tracing::info!(
        path = ?session.favorites_path(),
        count = session.favorites().count(),
        "Favorites saved"
    );
    Ok(())
}

async fn lookup(session: &Session, imdb_id: &str) -> Result<Movie> {
    session
        .service()
        .lookup(imdb_id)
        .await
        .with_context(|| format!("Failed to look up {}", imdb_id))
}

fn print_details(movie: &Movie) {
    println!("{}", movie.label());
    if let Some(url) = movie.imdb_url() {
        println!("  IMDb:     {}", url);
    }
    println!("  Genre:    {}", movie.genre);
    println!("  Rating:   {}", movie.rating);
    println!("  Runtime:  {}", movie.runtime);
    println!("  Released: {}", movie.released);
    println!("  Director: {}", movie.director);
    println!("  Actors:   {}", movie.actors);
    if let Some(poster) = movie.poster() {
        println!("  Poster:   {}", poster);
    }
    println!();
    println!("{}", movie.plot);
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using default locations");
            config::load_config_or_default(None)?
        }
    };

    println!("  Provider: {}", config.provider.base_url);
    println!(
        "  API key: {}",
        if config.provider.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!("  Timeout: {}s", config.provider.timeout_secs);
    println!("  Rate limit: {}/s", config.provider.requests_per_second);
    println!("  Favorites: {}", config.favorites.path.display());
    println!(
        "  Sort: {} ({})",
        config.sort.criteria,
        if config.sort.ascending {
            "ascending"
        } else {
            "descending"
        }
    );

    Ok(())
}
