use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Loads the configuration at `path`, or the built-in defaults when no path is given
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

/// The settings that shape the frontier; a checkpoint written under one
/// fingerprint may not line up with a crawl run under another.
#[derive(Serialize)]
struct FingerprintView<'a> {
    base_url: &'a str,
    citations_per_publication_limit: usize,
}

/// Computes a SHA-256 fingerprint of the crawl-shaping configuration
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 digest
/// * `Err(ConfigError)` - The view could not be serialized
pub fn compute_fingerprint(config: &Config) -> Result<String, ConfigError> {
    let view = FingerprintView {
        base_url: config.provider.base_url.trim_end_matches('/'),
        citations_per_publication_limit: config.crawler.citations_per_publication_limit,
    };
    let content = toml::to_string(&view)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

impl Config {
    /// See [`compute_fingerprint`]
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        compute_fingerprint(self)
    }
}
