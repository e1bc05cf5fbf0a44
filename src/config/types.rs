use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sort::SortCriteria;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub favorites: FavoritesConfig,

    #[serde(default)]
    pub sort: SortConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// OMDb API key (overridden by `MOVIEDECK_API_KEY` when set)
    #[serde(default)]
    pub api_key: String,

    /// Base URL requests are issued against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token-bucket rate limit for outbound requests
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_base_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesConfig {
    /// JSON document holding the favorites list
    #[serde(default = "default_favorites_path")]
    pub path: PathBuf,
}

fn default_favorites_path() -> PathBuf {
    PathBuf::from("favorites.json")
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: default_favorites_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SortConfig {
    #[serde(default)]
    pub criteria: SortCriteria,

    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            criteria: SortCriteria::default(),
            ascending: default_ascending(),
        }
    }
}
