use serde::{Deserialize, Serialize};

/// Main configuration structure for citegraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Where records and the checkpoint live on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one record file per author
    #[serde(rename = "authors-dir")]
    pub authors_dir: String,

    /// Directory holding one record file per publication
    #[serde(rename = "publications-dir")]
    pub publications_dir: String,

    /// File holding the pending frontier of an interrupted crawl
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            authors_dir: "./data/authors".to_string(),
            publications_dir: "./data/publications".to_string(),
            checkpoint_path: "./pending_citations.json".to_string(),
        }
    }
}

/// Crawl traversal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum citing works consumed per publication (0 disables the cap)
    #[serde(rename = "citations-per-publication-limit")]
    pub citations_per_publication_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            citations_per_publication_limit: 100,
        }
    }
}

/// Upstream data source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the Semantic Scholar Graph API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// API key; falls back to SEMANTIC_SCHOLAR_API_KEY when unset
    #[serde(rename = "api-key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum requests in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,

    /// Minimum time between the start of two requests (milliseconds)
    #[serde(rename = "min-request-interval-ms")]
    pub min_request_interval_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Retries for a transient failure before giving up
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, doubled on each further attempt (milliseconds)
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,

    /// Items requested per page from listing endpoints
    #[serde(rename = "page-size")]
    pub page_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.semanticscholar.org/graph/v1".to_string(),
            api_key: None,
            user_agent: format!("citegraph/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_requests: 1,
            min_request_interval_ms: 3000,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 2000,
            page_size: 100,
        }
    }
}
