//! Integration tests for the crawler
//!
//! These tests drive full crawls against a scripted in-memory gateway and a
//! file store in a temporary directory.

use async_trait::async_trait;
use citegraph::crawler::{Crawler, CrawlerSettings};
use citegraph::gateway::{FetchError, FetchGateway, FetchResult, Page};
use citegraph::model::{
    Author, Bibliography, EntityKind, FilledPublication, Publication, PublicationId,
    PublicationStub,
};
use citegraph::storage::{EntityStore, FileStore, FrontierCheckpoint};
use citegraph::CiteError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Citing works per listing page, small enough to force pagination
const PAGE_SIZE: usize = 2;

/// A citing work in a script: identified, or a bare title
enum Citing {
    Id(&'static str),
    Untitled(&'static str),
}

/// In-memory data source with a fixed citation graph
#[derive(Default)]
struct ScriptedGateway {
    /// Author name -> (author id, owned publication ids)
    authors: HashMap<String, (String, Vec<String>)>,
    /// Publication id -> (title, bibliographic author names)
    papers: HashMap<String, (String, Vec<String>)>,
    /// Publication id -> citing works in listing order
    citations: HashMap<String, Vec<Citing>>,
    /// Publication whose citation listing fails while `failing` is set
    fail_citations_for: Option<String>,
    failing: AtomicBool,
    /// Every `citing_works` call as (publication id, offset)
    citation_calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedGateway {
    fn author(mut self, name: &str, id: &str, publications: &[&str]) -> Self {
        self.authors.insert(
            name.to_string(),
            (
                id.to_string(),
                publications.iter().map(|p| p.to_string()).collect(),
            ),
        );
        self
    }

    fn paper(mut self, id: &str, title: &str, authors: &[&str]) -> Self {
        self.papers.insert(
            id.to_string(),
            (
                title.to_string(),
                authors.iter().map(|a| a.to_string()).collect(),
            ),
        );
        self
    }

    fn cited_by(mut self, id: &str, citing: Vec<Citing>) -> Self {
        self.citations.insert(id.to_string(), citing);
        self
    }

    fn failing_citations_for(mut self, id: &str) -> Self {
        self.fail_citations_for = Some(id.to_string());
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    fn citation_calls_for(&self, id: &str) -> Vec<usize> {
        self.citation_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == id)
            .map(|(_, offset)| *offset)
            .collect()
    }
}

#[async_trait]
impl FetchGateway for ScriptedGateway {
    async fn search_authors(&self, name: &str, offset: usize) -> FetchResult<Page<Author>> {
        let items = match (offset, self.authors.get(name)) {
            (0, Some((id, _))) => vec![Author::candidate(id.clone(), name)],
            _ => vec![],
        };
        Ok(Page::last(items))
    }

    async fn enrich_author(&self, mut author: Author) -> FetchResult<Author> {
        if let Some((_, publications)) = self.authors.get(&author.name) {
            author.interests = vec!["Citation Analysis".to_string()];
            author.publications = publications
                .iter()
                .map(|id| Publication::Stub(PublicationStub::with_id(id.clone())))
                .collect();
        }
        Ok(author)
    }

    async fn enrich_publication(&self, publication: Publication) -> FetchResult<Publication> {
        let stub = match publication {
            Publication::Stub(stub) => stub,
            filled => return Ok(filled),
        };
        let known = stub
            .id
            .as_ref()
            .and_then(|id| self.papers.get(id.as_str()).map(|paper| (id.clone(), paper)));

        Ok(match known {
            Some((id, (title, authors))) => Publication::Filled(FilledPublication {
                id,
                bib: Bibliography {
                    title: title.clone(),
                    authors: authors.clone(),
                    ..Bibliography::default()
                },
                author: stub.author,
                cited_in: stub.cited_in,
            }),
            None => Publication::Stub(stub),
        })
    }

    async fn citing_works(&self, id: &PublicationId, offset: usize) -> FetchResult<Page<Publication>> {
        self.citation_calls
            .lock()
            .unwrap()
            .push((id.as_str().to_string(), offset));

        if self.failing.load(Ordering::SeqCst)
            && self.fail_citations_for.as_deref() == Some(id.as_str())
        {
            return Err(FetchError::Status {
                url: format!("scripted://paper/{}/citations", id),
                status: 500,
            });
        }

        let all = self.citations.get(id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let items: Vec<Publication> = all
            .iter()
            .skip(offset)
            .take(PAGE_SIZE)
            .map(|citing| match citing {
                Citing::Id(id) => Publication::Stub(PublicationStub::with_id(*id)),
                Citing::Untitled(title) => Publication::Stub(PublicationStub::titled(*title)),
            })
            .collect();

        let end = offset + items.len();
        let next_offset = if end < all.len() { Some(end) } else { None };
        Ok(Page::new(items, next_offset))
    }
}

/// The two-layer graph with a cycle: A owns P1, P1 <- {C1, C2}, C1 <- {P1}
fn cycle_gateway() -> ScriptedGateway {
    ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .author("Bo Citer", "a2", &[])
        .paper("P1", "Seed Paper", &["Ada Author"])
        .paper("C1", "First Citer", &["Bo Citer"])
        .paper("C2", "Second Citer", &["Nobody Known"])
        .cited_by("P1", vec![Citing::Id("C1"), Citing::Id("C2")])
        .cited_by("C1", vec![Citing::Id("P1")])
}

fn create_test_crawler(
    dir: &TempDir,
    gateway: ScriptedGateway,
    limit: usize,
) -> Crawler<ScriptedGateway, FileStore> {
    Crawler::new(
        gateway,
        FileStore::new(dir.path().join("authors"), dir.path().join("publications")),
        FrontierCheckpoint::new(dir.path().join("pending_citations.json")),
        CrawlerSettings {
            citations_per_publication_limit: limit,
        },
    )
}

fn stored_publication(store: &FileStore, id: &str) -> Publication {
    store
        .get::<Publication>(id)
        .unwrap()
        .unwrap_or_else(|| panic!("publication {} not stored", id))
}

fn cited_in(publication: &Publication) -> Vec<&str> {
    let edges = match publication {
        Publication::Stub(stub) => &stub.cited_in,
        Publication::Filled(filled) => &filled.cited_in,
    };
    edges.iter().map(|id| id.as_str()).collect()
}

#[tokio::test]
async fn test_cycle_terminates_and_persists_each_once() {
    let dir = TempDir::new().unwrap();
    let crawler = create_test_crawler(&dir, cycle_gateway(), 100);

    let summary = crawler.run("Ada Author").await.unwrap();

    let store = crawler.store();
    assert_eq!(
        store.ids(EntityKind::Publication).unwrap(),
        vec!["C1", "C2", "P1"]
    );
    assert_eq!(store.ids(EntityKind::Author).unwrap(), vec!["a1", "a2"]);

    assert_eq!(cited_in(&stored_publication(store, "P1")), vec!["C1", "C2"]);
    assert_eq!(cited_in(&stored_publication(store, "C1")), vec!["P1"]);

    // P1 comes back around through C1 and is recognized as known
    assert_eq!(summary.layers, 3);
    assert_eq!(summary.expanded, 3);
    assert_eq!(summary.already_known, 1);
    assert_eq!(summary.enqueued, 3);
    assert_eq!(crawler.gateway().citation_calls_for("P1"), vec![0]);

    assert!(!crawler.checkpoint().exists().unwrap());
}

#[tokio::test]
async fn test_sanitized_records_link_owning_authors() {
    let dir = TempDir::new().unwrap();
    let crawler = create_test_crawler(&dir, cycle_gateway(), 100);
    crawler.run("Ada Author").await.unwrap();

    let store = crawler.store();
    let seed = stored_publication(store, "P1");
    assert!(!seed.is_filled());
    assert_eq!(seed.title(), None);
    assert_eq!(seed.author().map(|id| id.as_str()), Some("a1"));

    // C1's first bibliographic author resolves by name; C2's does not
    let resolved = stored_publication(store, "C1");
    assert_eq!(resolved.author().map(|id| id.as_str()), Some("a2"));
    assert!(stored_publication(store, "C2").author().is_none());

    let author: Author = store.get("a1").unwrap().unwrap();
    assert_eq!(author.name, "Ada Author");
    assert_eq!(author.interests, vec!["Citation Analysis".to_string()]);
    assert!(author.publications.is_empty());
}

#[tokio::test]
async fn test_rerun_over_complete_store_is_write_once_noop() {
    let dir = TempDir::new().unwrap();

    let first = create_test_crawler(&dir, cycle_gateway(), 100);
    first.run("Ada Author").await.unwrap();
    let before = std::fs::read(first.store().record_path(EntityKind::Publication, "P1")).unwrap();

    let second = create_test_crawler(&dir, cycle_gateway(), 100);
    let summary = second.run("Ada Author").await.unwrap();

    assert_eq!(summary.expanded, 0);
    assert_eq!(summary.already_known, 1);
    assert_eq!(summary.authors_written, 0);
    assert!(second.gateway().citation_calls_for("P1").is_empty());

    let after = std::fs::read(second.store().record_path(EntityKind::Publication, "P1")).unwrap();
    assert_eq!(before, after);
    assert_eq!(second.store().count(EntityKind::Publication).unwrap(), 3);
}

#[tokio::test]
async fn test_fan_out_bounded_by_limit_in_listing_order() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .paper("P1", "Popular Paper", &["Ada Author"])
        .paper("C1", "One", &[])
        .paper("C2", "Two", &[])
        .paper("C3", "Three", &[])
        .paper("C4", "Four", &[])
        .paper("C5", "Five", &[])
        .cited_by(
            "P1",
            vec![
                Citing::Id("C1"),
                Citing::Id("C2"),
                Citing::Id("C3"),
                Citing::Id("C4"),
                Citing::Id("C5"),
            ],
        );
    let crawler = create_test_crawler(&dir, gateway, 3);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.enqueued, 3);
    assert_eq!(
        cited_in(&stored_publication(crawler.store(), "P1")),
        vec!["C1", "C2", "C3"]
    );
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["C1", "C2", "C3", "P1"]
    );
    // Third item comes from the second page; the third page is never requested
    assert_eq!(crawler.gateway().citation_calls_for("P1"), vec![0, 2]);
}

#[tokio::test]
async fn test_zero_limit_follows_every_citing_work() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .paper("P1", "Popular Paper", &[])
        .paper("C1", "One", &[])
        .paper("C2", "Two", &[])
        .paper("C3", "Three", &[])
        .cited_by(
            "P1",
            vec![Citing::Id("C1"), Citing::Id("C2"), Citing::Id("C3")],
        );
    let crawler = create_test_crawler(&dir, gateway, 0);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.enqueued, 3);
    assert_eq!(crawler.store().count(EntityKind::Publication).unwrap(), 4);
}

#[tokio::test]
async fn test_unidentified_citing_works_are_not_enqueued() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .paper("P1", "Seed Paper", &[])
        .paper("C1", "Identified", &[])
        .cited_by(
            "P1",
            vec![Citing::Untitled("Anonymous preprint"), Citing::Id("C1")],
        );
    let crawler = create_test_crawler(&dir, gateway, 100);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.enqueued, 1);
    assert_eq!(cited_in(&stored_publication(crawler.store(), "P1")), vec!["C1"]);
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["C1", "P1"]
    );
}

#[tokio::test]
async fn test_unidentified_citing_work_counts_toward_limit() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .paper("P1", "Seed Paper", &[])
        .paper("C1", "Identified", &[])
        .cited_by(
            "P1",
            vec![Citing::Untitled("Anonymous preprint"), Citing::Id("C1")],
        );
    let crawler = create_test_crawler(&dir, gateway, 1);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.enqueued, 0);
    assert!(cited_in(&stored_publication(crawler.store(), "P1")).is_empty());
}

#[tokio::test]
async fn test_seed_without_stable_identifier_is_dropped() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1", "GHOST"])
        .paper("P1", "Seed Paper", &[]);
    let crawler = create_test_crawler(&dir, gateway, 100);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.unidentified, 1);
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["P1"]
    );
}

#[tokio::test]
async fn test_unknown_author_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let crawler = create_test_crawler(&dir, cycle_gateway(), 100);

    let result = crawler.run("Someone Else").await;

    match result {
        Err(CiteError::AuthorNotFound { name }) => assert_eq!(name, "Someone Else"),
        other => panic!("expected AuthorNotFound, got {:?}", other.map(|_| ())),
    }
    assert_eq!(crawler.store().count(EntityKind::Author).unwrap(), 0);
    assert_eq!(crawler.store().count(EntityKind::Publication).unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_failure_keeps_checkpoint_and_rerun_resumes() {
    let dir = TempDir::new().unwrap();
    let crawler = create_test_crawler(&dir, cycle_gateway().failing_citations_for("C1"), 100);

    let result = crawler.run("Ada Author").await;
    assert!(matches!(result, Err(CiteError::Fetch(_))));

    // P1 completed; its citing works are pending, C1 was never persisted
    assert!(crawler.store().exists(EntityKind::Publication, "P1").unwrap());
    assert!(!crawler.store().exists(EntityKind::Publication, "C1").unwrap());
    let pending: Vec<String> = crawler
        .checkpoint()
        .load()
        .unwrap()
        .iter()
        .filter_map(|p| p.id().map(|id| id.to_string()))
        .collect();
    assert_eq!(pending, vec!["C1", "C2"]);

    crawler.gateway().recover();
    let summary = crawler.run("Ada Author").await.unwrap();

    assert!(summary.expanded >= 2);
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["C1", "C2", "P1"]
    );
    assert!(!crawler.checkpoint().exists().unwrap());
}

#[tokio::test]
async fn test_resume_expands_checkpointed_frontier() {
    let dir = TempDir::new().unwrap();
    let gateway = cycle_gateway().paper("X1", "Left Over", &[]);
    let crawler = create_test_crawler(&dir, gateway, 100);

    let pending = vec![Publication::Stub(PublicationStub::with_id("X1"))];
    crawler.checkpoint().save(&pending).unwrap();

    crawler.run("Ada Author").await.unwrap();

    // Everything reachable from the seed plus everything that was pending
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["C1", "C2", "P1", "X1"]
    );
    assert!(!crawler.checkpoint().exists().unwrap());
}

#[tokio::test]
async fn test_interrupted_item_already_persisted_is_not_expanded_again() {
    let dir = TempDir::new().unwrap();
    let crawler = create_test_crawler(&dir, cycle_gateway(), 100);

    // State left by a crash after C1 was persisted but before the checkpoint
    // was rewritten without it
    crawler
        .store()
        .put(Publication::Stub(PublicationStub::with_id("C1")))
        .unwrap();
    let pending = vec![Publication::Stub(PublicationStub::with_id("C1"))];
    crawler.checkpoint().save(&pending).unwrap();

    let summary = crawler.run("Ada Author").await.unwrap();

    assert!(crawler.gateway().citation_calls_for("C1").is_empty());
    assert!(summary.already_known >= 2);
    // C1's record is whatever was written first
    assert!(cited_in(&stored_publication(crawler.store(), "C1")).is_empty());
    assert!(crawler.store().exists(EntityKind::Publication, "C2").unwrap());
}

#[tokio::test]
async fn test_self_citing_unstorable_id_terminates() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["DOI:10.1/x"])
        .paper("DOI:10.1/x", "Loops Forever", &[])
        .cited_by("DOI:10.1/x", vec![Citing::Id("DOI:10.1/x")]);
    let crawler = create_test_crawler(&dir, gateway, 100);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.unidentified, 1);
    assert_eq!(summary.expanded, 0);
    assert!(crawler.gateway().citation_calls_for("DOI:10.1/x").is_empty());
    assert_eq!(crawler.store().count(EntityKind::Publication).unwrap(), 0);
    assert!(!crawler.checkpoint().exists().unwrap());
}

#[tokio::test]
async fn test_citing_works_with_unstorable_ids_are_not_enqueued() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .author("Ada Author", "a1", &["P1"])
        .paper("P1", "Seed Paper", &[])
        .paper("C1", "Identified", &[])
        .paper("DOI:10.1/y", "Slashed", &[])
        .cited_by("P1", vec![Citing::Id("DOI:10.1/y"), Citing::Id("C1")]);
    let crawler = create_test_crawler(&dir, gateway, 100);

    let summary = crawler.run("Ada Author").await.unwrap();

    assert_eq!(summary.enqueued, 1);
    assert_eq!(cited_in(&stored_publication(crawler.store(), "P1")), vec!["C1"]);
    assert_eq!(
        crawler.store().ids(EntityKind::Publication).unwrap(),
        vec!["C1", "P1"]
    );
}

#[tokio::test]
async fn test_skipped_items_do_not_rewrite_checkpoint() {
    let dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::default()
        .paper("F1", "Fails To List", &[])
        .failing_citations_for("F1");
    let crawler = create_test_crawler(&dir, gateway, 100);

    for id in ["K1", "K2"] {
        crawler
            .store()
            .put(Publication::Stub(PublicationStub::with_id(id)))
            .unwrap();
    }
    let pending: Vec<Publication> = ["K1", "K2", "F1"]
        .iter()
        .map(|id| Publication::Stub(PublicationStub::with_id(*id)))
        .collect();
    crawler.checkpoint().save(&pending).unwrap();
    let saved = std::fs::read(crawler.checkpoint().path()).unwrap();

    let result = crawler.crawl_frontier(vec![]).await;
    assert!(matches!(result, Err(CiteError::Fetch(_))));

    // Both stored items were skipped without touching the checkpoint
    let after = std::fs::read(crawler.checkpoint().path()).unwrap();
    assert_eq!(saved, after);
}
