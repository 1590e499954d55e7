use crate::config::types::{Config, CrawlerConfig, ProviderConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_crawler_config(&config.crawler)?;
    validate_provider_config(&config.provider)?;
    Ok(())
}

/// Validates storage locations
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.authors_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "authors_dir cannot be empty".to_string(),
        ));
    }

    if config.publications_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "publications_dir cannot be empty".to_string(),
        ));
    }

    // Shared directories would let an author id shadow a publication id
    if config.authors_dir == config.publications_dir {
        return Err(ConfigError::Validation(format!(
            "authors_dir and publications_dir must differ, both are '{}'",
            config.authors_dir
        )));
    }

    if config.checkpoint_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(_config: &CrawlerConfig) -> Result<(), ConfigError> {
    // Any limit is valid: 0 means uncapped
    Ok(())
}

/// Validates provider configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 16 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 16, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    Ok(())
}
