//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which starts a `wiremock` server standing in for
//! OMDb, a temporary directory for the favorites document, and a [`Config`]
//! pointing at both.

#![allow(dead_code)]

use std::path::PathBuf;

use moviedeck::config::Config;
use moviedeck::session::Session;
use moviedeck::tasks::Background;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";

pub struct TestHarness {
    pub server: MockServer,
    pub dir: TempDir,
    pub config: Config,
}

impl TestHarness {
    /// Mock provider plus a config that talks to it.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().expect("failed to create temp dir");

        let mut config = Config::default();
        config.provider.base_url = format!("{}/", server.uri());
        config.provider.api_key = API_KEY.to_string();
        config.provider.timeout_secs = 5;
        config.provider.requests_per_second = 1000;
        config.favorites.path = dir.path().join("favorites.json");

        Self {
            server,
            dir,
            config,
        }
    }

    /// Session on the current runtime.
    pub fn session(&self) -> Session {
        Session::new(&self.config, Background::current())
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.config.favorites.path.clone()
    }

    /// Answer `s=<query>` with the given hits.
    pub async fn mount_search(&self, query: &str, hits: &[(&str, &str, &str)]) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("s", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(hits)))
            .mount(&self.server)
            .await;
    }

    /// Answer `i=<imdb_id>` with a detailed record.
    pub async fn mount_details(&self, imdb_id: &str, title: &str, year: &str, genre: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("i", imdb_id))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(title_body(imdb_id, title, year, genre)),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer `t=<title>` with a detailed record.
    pub async fn mount_title(&self, imdb_id: &str, title: &str, year: &str, genre: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("t", title))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(title_body(imdb_id, title, year, genre)),
            )
            .mount(&self.server)
            .await;
    }
}

pub fn search_body(hits: &[(&str, &str, &str)]) -> Value {
    let search: Vec<Value> = hits
        .iter()
        .map(|(id, title, year)| {
            json!({
                "Title": title,
                "Year": year,
                "imdbID": id,
                "Type": "movie",
                "Poster": format!("https://img.example/{id}.jpg"),
            })
        })
        .collect();

    json!({
        "Search": search,
        "totalResults": hits.len().to_string(),
        "Response": "True",
    })
}

pub fn title_body(imdb_id: &str, title: &str, year: &str, genre: &str) -> Value {
    json!({
        "Title": title,
        "Year": year,
        "Rated": "R",
        "Released": format!("01 Jan {year}"),
        "Runtime": "120 min",
        "Genre": genre,
        "Director": "Some Director",
        "Actors": "Actor One, Actor Two",
        "Plot": format!("The plot of {title}."),
        "Poster": "N/A",
        "imdbRating": "7.5",
        "imdbID": imdb_id,
        "Type": "movie",
        "Response": "True",
    })
}

pub fn not_found_body() -> Value {
    json!({ "Response": "False", "Error": "Movie not found!" })
}
