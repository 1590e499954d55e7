//! Configuration module for citegraph
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key is optional; missing keys take the defaults defined on the
//! config types, so a crawl can run with no file at all.
//!
//! # Example
//!
//! ```no_run
//! use citegraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("citegraph.toml")).unwrap();
//! println!(
//!     "Following at most {} citations per publication",
//!     config.crawler.citations_per_publication_limit
//! );
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, ProviderConfig, StorageConfig};

pub use parser::{compute_fingerprint, load_config, load_config_or_default};
pub use validation::validate;
