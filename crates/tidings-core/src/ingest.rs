use std::time::Instant;

use futures::future::join_all;

use crate::error::AppError;
use crate::fetch::ArticleFetcher;
use crate::models::ArticleRecord;
use crate::traits::{BlobStore, Fetcher, PageParser, Scheduled, ensure_container};

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub discovered: usize,
    /// Blob names written, in discovery order.
    pub written: Vec<String>,
    /// Articles that could not be fetched or had no content.
    pub skipped: usize,
    /// Articles whose write to storage failed.
    pub failed: usize,
}

enum Outcome {
    Written(String),
    Skipped,
    Failed,
}

/// Ingestion stage: discover articles, extract them, write raw records.
pub struct IngestionService<F, P, B>
where
    F: Fetcher,
    P: PageParser,
    B: BlobStore,
{
    articles: ArticleFetcher<F, P>,
    store: B,
    container: String,
}

impl<F, P, B> IngestionService<F, P, B>
where
    F: Fetcher,
    P: PageParser,
    B: BlobStore,
{
    pub fn new(articles: ArticleFetcher<F, P>, store: B, container: impl Into<String>) -> Self {
        Self {
            articles,
            store,
            container: container.into(),
        }
    }

    /// Run one ingestion cycle.
    ///
    /// Only a homepage failure is returned as an error. Per-article fetch,
    /// extraction and storage failures are logged and counted in the report.
    pub async fn ingest(&self) -> Result<IngestReport, AppError> {
        let urls = self.articles.discover().await?;

        let outcomes = join_all(urls.iter().map(|url| self.ingest_one(url))).await;

        let mut report = IngestReport {
            discovered: urls.len(),
            ..IngestReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Written(name) => report.written.push(name),
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }
        Ok(report)
    }

    async fn ingest_one(&self, url: &str) -> Outcome {
        let Some(record) = self.articles.extract(url).await else {
            return Outcome::Skipped;
        };
        match self.save(&record).await {
            Ok(name) => Outcome::Written(name),
            Err(e) => {
                tracing::error!(%url, error = %e, "Error uploading article to blob storage");
                Outcome::Failed
            }
        }
    }

    /// Write a record under its derived blob name, replacing any previous
    /// blob of that name. Returns the name.
    pub async fn save(&self, record: &ArticleRecord) -> Result<String, AppError> {
        let name = record.blob_name();
        let content = record.to_json()?;

        ensure_container(&self.store, &self.container).await?;
        self.store
            .put(&self.container, &name, content, true)
            .await?;

        tracing::info!(blob = %name, container = %self.container, "Uploaded article");
        Ok(name)
    }
}

impl<F, P, B> Scheduled for IngestionService<F, P, B>
where
    F: Fetcher,
    P: PageParser,
    B: BlobStore,
{
    async fn run(&self) -> Result<(), AppError> {
        let started = Instant::now();
        let report = self.ingest().await?;
        tracing::info!(
            discovered = report.discovered,
            written = report.written.len(),
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ingestion run finished"
        );
        Ok(())
    }
}
