//! Semantic Scholar Graph API gateway
//!
//! Endpoints used:
//! - `GET /author/search` - author candidates by name
//! - `GET /author/{id}` and `GET /author/{id}/papers` - author enrichment
//! - `GET /paper/{id}` - publication enrichment
//! - `GET /paper/search/match` - identifier lookup for title-only stubs
//! - `GET /paper/{id}/citations` - citing works
//!
//! Every request passes through the shared [`Throttle`] and is retried with
//! exponential backoff on rate limiting, server errors, timeouts, and
//! connection failures.

use crate::config::ProviderConfig;
use crate::gateway::throttle::Throttle;
use crate::gateway::traits::{FetchError, FetchGateway, FetchResult, Page};
use crate::model::{
    Author, AuthorId, Bibliography, FilledPublication, Publication, PublicationId, PublicationStub,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "SEMANTIC_SCHOLAR_API_KEY";

const AUTHOR_FIELDS: &str = "name,affiliations";
const PAPER_FIELDS: &str = "paperId,title,venue,year,authors";
const AUTHOR_PAPER_FIELDS: &str = "paperId,title,venue,year,authors,fieldsOfStudy";

/// How many fields of study are kept as an author's interests
const MAX_INTERESTS: usize = 5;

// ============================================================================
// API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    next: Option<usize>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AuthorData {
    #[serde(rename = "authorId")]
    author_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    affiliations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PaperAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaperData {
    #[serde(rename = "paperId", default)]
    paper_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    authors: Vec<PaperAuthor>,
    #[serde(rename = "fieldsOfStudy", default)]
    fields_of_study: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CitationData {
    #[serde(rename = "citingPaper", default)]
    citing_paper: Option<PaperData>,
}

impl AuthorData {
    fn into_author(self) -> Option<Author> {
        let id = self.author_id.filter(|id| !id.is_empty())?;
        let mut author = Author::candidate(id, self.name.unwrap_or_default());
        author.affiliations = self.affiliations;
        Some(author)
    }
}

impl PaperData {
    fn bibliography(&self) -> Option<Bibliography> {
        let title = self.title.clone().filter(|title| !title.is_empty())?;
        Some(Bibliography {
            title,
            venue: self.venue.clone().filter(|venue| !venue.is_empty()),
            year: self.year,
            authors: self
                .authors
                .iter()
                .filter_map(|author| author.name.clone())
                .collect(),
        })
    }

    /// Filled when the listing carried an id and a title, a stub otherwise
    fn into_publication(self) -> Publication {
        match (self.paper_id.clone(), self.bibliography()) {
            (Some(id), Some(bib)) if !id.is_empty() => {
                Publication::Filled(FilledPublication::new(id, bib))
            }
            _ => self.into_stub().into(),
        }
    }

    fn into_stub(self) -> PublicationStub {
        PublicationStub {
            id: self.paper_id.filter(|id| !id.is_empty()).map(PublicationId::new),
            title: self.title,
            ..PublicationStub::default()
        }
    }
}

/// Ranks fields of study by how many of the author's papers carry them
fn rank_interests(papers: &[PaperData]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for field in papers
        .iter()
        .filter_map(|paper| paper.fields_of_study.as_ref())
        .flatten()
    {
        *counts.entry(field.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(MAX_INTERESTS)
        .map(|(field, _)| field.to_string())
        .collect()
}

// ============================================================================
// Gateway
// ============================================================================

/// HTTP gateway over the Semantic Scholar Graph API
pub struct SemanticScholarGateway {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    throttle: Throttle,
    max_retries: u32,
    retry_base_delay: Duration,
    page_size: usize,
}

impl SemanticScholarGateway {
    /// Builds a gateway from provider configuration
    ///
    /// Uses `api_key` from the configuration, falling back to the
    /// `SEMANTIC_SCHOLAR_API_KEY` environment variable.
    pub fn new(config: &ProviderConfig) -> FetchResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| FetchError::Http {
                url: config.base_url.clone(),
                source,
            })?;

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
            throttle: Throttle::new(
                config.max_concurrent_requests,
                Duration::from_millis(config.min_request_interval_ms),
            ),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            page_size: config.page_size,
        })
    }

    /// Builds the URL for `segments` below the base path
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    fn listing_query(&self, fields: &str, offset: usize) -> Vec<(&'static str, String)> {
        vec![
            ("fields", fields.to_string()),
            ("offset", offset.to_string()),
            ("limit", self.page_size.to_string()),
        ]
    }

    /// Fetches JSON with bounded exponential-backoff retry
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> FetchResult<T> {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(url).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self
                        .retry_base_delay
                        .saturating_mul(1u32 << (attempt - 1).min(16));
                    tracing::warn!(
                        "{}; retrying ({}/{}) in {:?}",
                        e,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &Url) -> FetchResult<T> {
        let _permit = self.throttle.acquire().await?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(ref api_key) = self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                what: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(url, e))?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_paper(&self, id: &PublicationId) -> FetchResult<PaperData> {
        let url = self.endpoint(
            &["paper", id.as_str()],
            &[("fields", PAPER_FIELDS.to_string())],
        )?;
        self.get_json(&url).await
    }

    async fn match_title(&self, title: &str) -> FetchResult<Option<PaperData>> {
        let url = self.endpoint(
            &["paper", "search", "match"],
            &[
                ("query", title.to_string()),
                ("fields", PAPER_FIELDS.to_string()),
            ],
        )?;
        match self.get_json::<ListResponse<PaperData>>(&url).await {
            Ok(response) => Ok(response.data.into_iter().next()),
            Err(FetchError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn author_papers(&self, id: &AuthorId) -> FetchResult<Vec<PaperData>> {
        let mut papers = Vec::new();
        let mut offset = 0;
        loop {
            let url = self.endpoint(
                &["author", id.as_str(), "papers"],
                &self.listing_query(AUTHOR_PAPER_FIELDS, offset),
            )?;
            let page: ListResponse<PaperData> = self.get_json(&url).await?;
            let fetched = page.data.len();
            papers.extend(page.data);
            match page.next {
                Some(next) if next > offset && fetched > 0 => offset = next,
                _ => break,
            }
        }
        Ok(papers)
    }
}

/// Maps reqwest transport failures onto gateway errors
fn classify_transport_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl FetchGateway for SemanticScholarGateway {
    async fn search_authors(&self, name: &str, offset: usize) -> FetchResult<Page<Author>> {
        let mut query = self.listing_query(AUTHOR_FIELDS, offset);
        query.push(("query", name.to_string()));
        let url = self.endpoint(&["author", "search"], &query)?;

        let response: ListResponse<AuthorData> = self.get_json(&url).await?;
        let authors = response
            .data
            .into_iter()
            .filter_map(AuthorData::into_author)
            .collect();
        Ok(Page::new(authors, response.next))
    }

    async fn enrich_author(&self, author: Author) -> FetchResult<Author> {
        let url = self.endpoint(
            &["author", author.id.as_str()],
            &[("fields", AUTHOR_FIELDS.to_string())],
        )?;
        let detail: AuthorData = self.get_json(&url).await?;
        let papers = self.author_papers(&author.id).await?;

        let enriched = Author {
            name: detail.name.unwrap_or(author.name),
            affiliations: if detail.affiliations.is_empty() {
                author.affiliations
            } else {
                detail.affiliations
            },
            interests: rank_interests(&papers),
            publications: papers.into_iter().map(PaperData::into_publication).collect(),
            id: author.id,
        };

        tracing::debug!(
            "Enriched author {} ({}) with {} publications",
            enriched.name,
            enriched.id,
            enriched.publications.len()
        );
        Ok(enriched)
    }

    async fn enrich_publication(&self, publication: Publication) -> FetchResult<Publication> {
        let stub = match publication {
            Publication::Filled(_) => return Ok(publication),
            Publication::Stub(stub) => stub,
        };

        let paper = match (&stub.id, &stub.title) {
            (Some(id), _) => match self.fetch_paper(id).await {
                Ok(paper) => Some(paper),
                Err(FetchError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            (None, Some(title)) => self.match_title(title).await?,
            (None, None) => None,
        };

        let filled = paper.and_then(|paper| {
            let bib = paper.bibliography()?;
            let id = stub
                .id
                .clone()
                .or_else(|| paper.paper_id.clone().map(PublicationId::new))?;
            Some(FilledPublication {
                id,
                bib,
                author: stub.author.clone(),
                cited_in: stub.cited_in.clone(),
            })
        });

        Ok(match filled {
            Some(filled) => Publication::Filled(filled),
            None => Publication::Stub(stub),
        })
    }

    async fn citing_works(&self, id: &PublicationId, offset: usize) -> FetchResult<Page<Publication>> {
        let url = self.endpoint(
            &["paper", id.as_str(), "citations"],
            &self.listing_query(PAPER_FIELDS, offset),
        )?;

        let response: ListResponse<CitationData> = match self.get_json(&url).await {
            Ok(response) => response,
            Err(FetchError::NotFound { .. }) => {
                tracing::debug!("No citation listing for {}", id);
                return Ok(Page::last(Vec::new()));
            }
            Err(e) => return Err(e),
        };
        let works = response
            .data
            .into_iter()
            .filter_map(|citation| citation.citing_paper)
            .map(PaperData::into_publication)
            .collect();
        Ok(Page::new(works, response.next))
    }
}
