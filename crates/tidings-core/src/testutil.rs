//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::{ParsedArticle, SentimentScore};
use crate::traits::{BlobStore, EventConsumer, Fetcher, PageParser, Scheduled, SentimentScorer};
use crate::trigger::{TriggerEvent, TriggerReporter};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that serves per-URL pages or a queue of responses.
#[derive(Clone)]
pub struct MockFetcher {
    /// Fixed pages by URL. `Err` holds the message of a `FetchError`.
    pages: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    /// Queue of responses for URLs without a fixed page. Each call pops the
    /// first element. If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn with_failing_page(self, url: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(format!("HTTP 404 for {url}")));
        self
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(page) = self.pages.lock().unwrap().get(url) {
            return page.clone().map_err(AppError::FetchError);
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockParser
// ---------------------------------------------------------------------------

/// Mock parser returning configured links and articles keyed by HTML.
#[derive(Clone, Default)]
pub struct MockParser {
    links: Arc<Mutex<Vec<String>>>,
    pages: Arc<Mutex<HashMap<String, ParsedArticle>>>,
    fallback: Arc<Mutex<ParsedArticle>>,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(self, links: &[&str]) -> Self {
        *self.links.lock().unwrap() = links.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Article returned for any HTML without a specific entry.
    pub fn with_article(self, title: &str, paragraphs: &[&str]) -> Self {
        *self.fallback.lock().unwrap() = parsed(title, paragraphs);
        self
    }

    /// Article returned when the parsed HTML equals `html`.
    pub fn with_page_article(self, html: &str, title: &str, paragraphs: &[&str]) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(html.to_string(), parsed(title, paragraphs));
        self
    }
}

fn parsed(title: &str, paragraphs: &[&str]) -> ParsedArticle {
    ParsedArticle {
        title: Some(title.to_string()),
        paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
    }
}

impl PageParser for MockParser {
    fn links(&self, _html: &str) -> Vec<String> {
        self.links.lock().unwrap().clone()
    }

    fn article(&self, html: &str) -> ParsedArticle {
        self.pages
            .lock()
            .unwrap()
            .get(html)
            .cloned()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockScorer
// ---------------------------------------------------------------------------

/// Mock scorer that returns a fixed score and records the scored texts.
#[derive(Clone)]
pub struct MockScorer {
    score: SentimentScore,
    scored: Arc<Mutex<Vec<String>>>,
}

impl MockScorer {
    pub fn new(score: SentimentScore) -> Self {
        Self {
            score,
            scored: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn scored(&self) -> Vec<String> {
        self.scored.lock().unwrap().clone()
    }
}

impl SentimentScorer for MockScorer {
    fn score(&self, text: &str) -> SentimentScore {
        self.scored.lock().unwrap().push(text.to_string());
        self.score
    }
}

// ---------------------------------------------------------------------------
// MockBlobStore
// ---------------------------------------------------------------------------

/// In-memory blob store that records writes and can fail chosen puts.
#[derive(Clone, Default)]
pub struct MockBlobStore {
    containers: Arc<Mutex<BTreeSet<String>>>,
    created: Arc<Mutex<Vec<String>>>,
    blobs: Arc<Mutex<BTreeMap<(String, String), Vec<u8>>>>,
    put_failures: Arc<Mutex<HashSet<String>>>,
    puts: Arc<AtomicUsize>,
    list_failures: Arc<AtomicUsize>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `put` of a blob with this name fails with a `StorageError`.
    pub fn with_put_failure(self, name: &str) -> Self {
        self.put_failures.lock().unwrap().insert(name.to_string());
        self
    }

    /// The next `count` calls to `list` fail with a `StorageError`.
    pub fn with_list_failures(self, count: usize) -> Self {
        self.list_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Insert a blob directly, creating its container.
    pub fn insert(&self, container: &str, name: &str, content: &[u8]) {
        self.containers.lock().unwrap().insert(container.to_string());
        self.blobs
            .lock()
            .unwrap()
            .insert((container.to_string(), name.to_string()), content.to_vec());
    }

    pub fn blob(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(container.to_string(), name.to_string()))
            .cloned()
    }

    pub fn names(&self, container: &str) -> Vec<String> {
        self.blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, n)| n.clone())
            .collect()
    }

    /// Whether `create_container` was called for `container`.
    pub fn container_created(&self, container: &str) -> bool {
        self.created.lock().unwrap().iter().any(|c| c == container)
    }

    /// Number of `put` calls, including failed ones.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl BlobStore for MockBlobStore {
    async fn container_exists(&self, container: &str) -> Result<bool, AppError> {
        Ok(self.containers.lock().unwrap().contains(container))
    }

    async fn create_container(&self, container: &str) -> Result<(), AppError> {
        self.containers.lock().unwrap().insert(container.to_string());
        self.created.lock().unwrap().push(container.to_string());
        Ok(())
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<(), AppError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.put_failures.lock().unwrap().contains(name) {
            return Err(AppError::StorageError(format!("injected failure for {name}")));
        }
        if !self.containers.lock().unwrap().contains(container) {
            return Err(AppError::StorageError(format!(
                "container {container} not found"
            )));
        }
        let key = (container.to_string(), name.to_string());
        let mut blobs = self.blobs.lock().unwrap();
        if !overwrite && blobs.contains_key(&key) {
            return Err(AppError::StorageError(format!("blob {name} already exists")));
        }
        blobs.insert(key, content);
        Ok(())
    }

    async fn get(&self, container: &str, name: &str) -> Result<Vec<u8>, AppError> {
        self.blob(container, name)
            .ok_or_else(|| AppError::StorageError(format!("blob {container}/{name} not found")))
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, AppError> {
        let failing = self
            .list_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::StorageError(format!(
                "injected list failure for {container}"
            )));
        }
        Ok(self.names(container))
    }
}

// ---------------------------------------------------------------------------
// MockScheduled
// ---------------------------------------------------------------------------

/// Mock job that counts runs and tracks peak concurrency.
#[derive(Clone, Default)]
pub struct MockScheduled {
    runs: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    duration: Duration,
    fail: bool,
}

impl MockScheduled {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Make every run take `duration`.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl Scheduled for MockScheduled {
    async fn run(&self) -> Result<(), AppError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.fail {
            Err(AppError::FetchError("HTTP 503 for homepage".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// MockConsumer
// ---------------------------------------------------------------------------

/// Mock consumer that records every arrival.
#[derive(Clone, Default)]
pub struct MockConsumer {
    received: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail: bool,
}

impl MockConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn received(&self) -> Vec<(String, Vec<u8>)> {
        self.received.lock().unwrap().clone()
    }
}

impl EventConsumer for MockConsumer {
    async fn on_arrival(&self, content: Vec<u8>, name: &str) -> Result<(), AppError> {
        self.received
            .lock()
            .unwrap()
            .push((name.to_string(), content));
        if self.fail {
            Err(AppError::EmptyContent(name.to_string()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records events as `kind:subject` strings.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl TriggerReporter for RecordingReporter {
    fn report(&self, event: TriggerEvent<'_>) {
        let line = match event {
            TriggerEvent::Started { trigger } => format!("started:{trigger}"),
            TriggerEvent::Fired { trigger, .. } => format!("fired:{trigger}"),
            TriggerEvent::Arrived { name, .. } => format!("arrived:{name}"),
            TriggerEvent::Completed { trigger, .. } => format!("completed:{trigger}"),
            TriggerEvent::Failed { trigger, .. } => format!("failed:{trigger}"),
            TriggerEvent::PollFailed { trigger, .. } => format!("poll_failed:{trigger}"),
            TriggerEvent::Stopped { trigger } => format!("stopped:{trigger}"),
        };
        self.events.lock().unwrap().push(line);
    }
}
