//! Fetch gateway: the crawler's only view of the external data source
//!
//! This module contains:
//! - The `FetchGateway` trait (resolve and enrich authors, enrich
//!   publications, list citing works)
//! - Lazy paginated sequences over listing endpoints
//! - A request throttle bounding concurrency and request rate
//! - `SemanticScholarGateway`, an HTTP implementation over the Semantic
//!   Scholar Graph API with bounded retry

mod paging;
mod semantic_scholar;
mod throttle;
mod traits;

pub use paging::{author_candidates, cited_by, AuthorSearch, CitedBy, PageSource, Paginated};
pub use semantic_scholar::SemanticScholarGateway;
pub use throttle::{Throttle, ThrottlePermit};
pub use traits::{FetchError, FetchGateway, FetchResult, Page};
