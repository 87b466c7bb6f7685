//! Wiring of the ingestion timer and the enrichment watcher.

use std::collections::HashSet;
use std::sync::Arc;

use tidings_core::traits::{BlobStore, PageParser, SentimentScorer};
use tidings_core::{
    AppError, ArrivalWatcher, EnrichmentService, Fetcher, IngestionService, IntervalTrigger,
    PipelineConfig, TracingTriggerReporter,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Raw blobs that already have an enriched counterpart.
///
/// Enriched outputs double as durable receipts: a restarted host treats
/// these as observed so they are not scored again.
pub async fn completed_receipts<S, B>(
    store: &B,
    enrichment: &EnrichmentService<S, B>,
    raw_container: &str,
) -> Result<HashSet<String>, AppError>
where
    S: SentimentScorer,
    B: BlobStore,
{
    if !store.container_exists(raw_container).await? {
        return Ok(HashSet::new());
    }
    let raw_names = store.list(raw_container).await?;
    enrichment.processed_names(&raw_names).await
}

/// Handles to the running triggers. Each resolves once its trigger has
/// stopped and every run it spawned has finished.
pub struct PipelineHandles {
    pub ingest: JoinHandle<()>,
    pub enrich: JoinHandle<()>,
}

impl PipelineHandles {
    pub async fn join(self) {
        for (name, handle) in [("ingest", self.ingest), ("enrich", self.enrich)] {
            if let Err(e) = handle.await {
                tracing::error!(trigger = name, error = %e, "Trigger task panicked");
            }
        }
    }
}

/// Start the hourly ingestion timer and the raw-container watcher.
pub async fn spawn<F, P, S, B>(
    config: &PipelineConfig,
    store: B,
    ingestion: IngestionService<F, P, B>,
    enrichment: EnrichmentService<S, B>,
    cancel_token: CancellationToken,
) -> PipelineHandles
where
    F: Fetcher + 'static,
    P: PageParser + 'static,
    S: SentimentScorer + 'static,
    B: BlobStore + 'static,
{
    let baseline = match completed_receipts(&store, &enrichment, &config.raw_container).await {
        Ok(names) => {
            tracing::info!(count = names.len(), "Loaded enrichment receipts");
            names
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not load enrichment receipts, starting empty");
            HashSet::new()
        }
    };

    let reporter = Arc::new(TracingTriggerReporter);

    let timer = IntervalTrigger::new("ingest", config.ingest_interval)
        .run_on_startup(config.run_on_startup);
    let ingest = tokio::spawn({
        let reporter = Arc::clone(&reporter);
        let cancel_token = cancel_token.clone();
        let job = Arc::new(ingestion);
        async move {
            timer.run(job, reporter, cancel_token).await;
            timer.tracker().wait().await;
        }
    });

    let mut watcher = ArrivalWatcher::new(
        "enrich",
        store,
        config.raw_container.clone(),
        config.poll_interval,
    )
    .with_baseline(baseline);
    let enrich = tokio::spawn({
        let consumer = Arc::new(enrichment);
        async move {
            watcher.run(consumer, reporter, cancel_token).await;
            watcher.tracker().wait().await;
        }
    });

    PipelineHandles { ingest, enrich }
}
