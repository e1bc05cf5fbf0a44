mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "MOVIEDECK_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_config(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = ["./moviedeck.toml", "~/.config/moviedeck/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    prepare_config(&mut config);
    Ok(config)
}

/// Apply environment overrides and expand `~` in paths.
fn prepare_config(config: &mut Config) {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.provider.api_key = key.trim().to_string();
        }
    }

    let expanded = shellexpand::tilde(&config.favorites.path.to_string_lossy()).into_owned();
    config.favorites.path = PathBuf::from(expanded);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    reqwest::Url::parse(&config.provider.base_url)
        .with_context(|| format!("Invalid provider base_url: {}", config.provider.base_url))?;

    if config.provider.timeout_secs == 0 {
        anyhow::bail!("Provider timeout_secs cannot be 0");
    }

    if config.provider.requests_per_second == 0 {
        anyhow::bail!("Provider requests_per_second cannot be 0");
    }

    if config.provider.api_key.is_empty() {
        tracing::warn!(
            "No provider API key configured; set provider.api_key or {}",
            API_KEY_ENV
        );
    }

    if config.favorites.path.as_os_str().is_empty() {
        anyhow::bail!("Favorites path cannot be empty");
    }

    Ok(())
}

/// Fail unless an API key is available, for commands that hit the network.
pub fn require_api_key(config: &Config) -> Result<()> {
    if config.provider.api_key.is_empty() {
        anyhow::bail!(
            "No provider API key configured; set provider.api_key or {}",
            API_KEY_ENV
        );
    }
    Ok(())
}
