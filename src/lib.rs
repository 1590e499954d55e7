//! Citegraph: a resumable citation-graph crawler
//!
//! This crate discovers the citation graph rooted at a seed author. It lists
//! the author's publications, then follows "cited by" edges outward layer by
//! layer, persisting every newly discovered publication and author exactly
//! once. The pending frontier is checkpointed after every publication so an
//! interrupted crawl resumes where it stopped.

pub mod config;
pub mod crawler;
pub mod gateway;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for citegraph operations
#[derive(Debug, Error)]
pub enum CiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] gateway::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("No author found matching '{name}'")]
    AuthorNotFound { name: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for citegraph operations
pub type Result<T> = std::result::Result<T, CiteError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSummary, Crawler};
pub use gateway::{FetchGateway, SemanticScholarGateway};
pub use model::{Author, AuthorId, EntityKind, Publication, PublicationId};
pub use storage::{EntityStore, FileStore, FrontierCheckpoint};
