pub mod config;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod seed;
pub mod traits;
pub mod trigger;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::{PipelineConfig, SourceConfig};
pub use enrich::EnrichmentService;
pub use error::AppError;
pub use fetch::ArticleFetcher;
pub use ingest::{IngestReport, IngestionService};
pub use models::{ArticleRecord, EnrichedRecord, Overall, ParsedArticle, Sentiment, SentimentScore};
pub use traits::{BlobStore, EventConsumer, Fetcher, PageParser, Scheduled, SentimentScorer};
pub use trigger::{ArrivalWatcher, IntervalTrigger, TracingTriggerReporter, TriggerReporter};
