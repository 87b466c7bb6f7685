use std::future::Future;

use crate::error::AppError;
use crate::models::{ParsedArticle, SentimentScore};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    /// Performs exactly one request. Non-success statuses are errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Pulls links and article text out of raw HTML.
pub trait PageParser: Send + Sync + Clone {
    /// Every anchor `href` in document order, unresolved.
    fn links(&self, html: &str) -> Vec<String>;

    /// First heading and the paragraph texts of the article container.
    fn article(&self, html: &str) -> ParsedArticle;
}

/// Scores the sentiment of a block of text.
pub trait SentimentScorer: Send + Sync + Clone {
    fn score(&self, text: &str) -> SentimentScore;
}

/// Durable key-value blob store partitioned into named containers.
pub trait BlobStore: Send + Sync + Clone {
    fn container_exists(
        &self,
        container: &str,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Create a container. Creating one that already exists is not an error.
    fn create_container(&self, container: &str)
    -> impl Future<Output = Result<(), AppError>> + Send;

    /// Write a blob. With `overwrite = false` an existing blob is an error;
    /// with `overwrite = true` the last writer wins.
    fn put(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get(
        &self,
        container: &str,
        name: &str,
    ) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;

    /// Blob names in a container, sorted.
    fn list(&self, container: &str) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;
}

/// Create `container` if it does not exist yet.
///
/// Check-then-create is not atomic; a concurrent creator is harmless because
/// `create_container` tolerates existing containers.
pub async fn ensure_container<B: BlobStore>(store: &B, container: &str) -> Result<(), AppError> {
    if !store.container_exists(container).await? {
        tracing::info!(%container, "Creating container");
        store.create_container(container).await?;
    }
    Ok(())
}

/// A unit of work invoked by a timer.
pub trait Scheduled: Send + Sync {
    fn run(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A handler invoked once per object arriving in a watched container.
pub trait EventConsumer: Send + Sync {
    fn on_arrival(
        &self,
        content: Vec<u8>,
        name: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
