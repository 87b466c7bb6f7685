use std::collections::HashSet;
use std::time::Instant;

use crate::error::AppError;
use crate::models::{EnrichedRecord, enriched_blob_name};
use crate::traits::{BlobStore, EventConsumer, SentimentScorer, ensure_container};

/// Enrichment stage: score a raw record and write its enriched copy.
pub struct EnrichmentService<S, B>
where
    S: SentimentScorer,
    B: BlobStore,
{
    scorer: S,
    store: B,
    container: String,
}

impl<S, B> EnrichmentService<S, B>
where
    S: SentimentScorer,
    B: BlobStore,
{
    pub fn new(scorer: S, store: B, container: impl Into<String>) -> Self {
        Self {
            scorer,
            store,
            container: container.into(),
        }
    }

    /// Parse, score and persist one raw record.
    ///
    /// Malformed JSON and empty content are errors and nothing is written.
    /// `title` and `url` must be present; a missing `content` reads as empty.
    /// Any other fields of the raw record are copied into the output.
    pub async fn enrich(
        &self,
        content: &[u8],
        source_name: &str,
    ) -> Result<EnrichedRecord, AppError> {
        let (article, extra) = EnrichedRecord::parse_raw(content)?;
        if article.content.is_empty() {
            return Err(AppError::EmptyContent(source_name.to_string()));
        }

        let score = self.scorer.score(&article.content);
        let enriched = EnrichedRecord {
            article,
            extra,
            sentiment: score.into(),
        };
        tracing::debug!(
            blob = %source_name,
            polarity = enriched.sentiment.polarity,
            subjectivity = enriched.sentiment.subjectivity,
            overall = enriched.sentiment.overall.as_str(),
            "Scored article"
        );

        let name = enriched_blob_name(source_name);
        ensure_container(&self.store, &self.container).await?;
        self.store
            .put(&self.container, &name, enriched.to_json()?, true)
            .await?;

        tracing::info!(blob = %name, container = %self.container, "Uploaded sentiment record");
        Ok(enriched)
    }

    /// Which of `raw_names` already have an enriched counterpart.
    ///
    /// A missing sentiment container means nothing has been processed.
    pub async fn processed_names(
        &self,
        raw_names: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if !self.store.container_exists(&self.container).await? {
            return Ok(HashSet::new());
        }
        let enriched: HashSet<String> = self.store.list(&self.container).await?.into_iter().collect();
        Ok(raw_names
            .iter()
            .filter(|name| enriched.contains(&enriched_blob_name(name)))
            .cloned()
            .collect())
    }
}

impl<S, B> EventConsumer for EnrichmentService<S, B>
where
    S: SentimentScorer,
    B: BlobStore,
{
    async fn on_arrival(&self, content: Vec<u8>, name: &str) -> Result<(), AppError> {
        let started = Instant::now();
        tracing::info!(blob = %name, bytes = content.len(), "Processing new blob");
        self.enrich(&content, name).await?;
        tracing::info!(
            blob = %name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Finished processing blob"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedRecord, Overall, SentimentScore};
    use crate::testutil::*;

    const SENTIMENT: &str = "articles-sentiment";

    fn service(score: SentimentScore, store: MockBlobStore) -> EnrichmentService<MockScorer, MockBlobStore> {
        EnrichmentService::new(MockScorer::new(score), store, SENTIMENT)
    }

    #[tokio::test]
    async fn positive_article_is_enriched_and_written() {
        let store = MockBlobStore::new();
        let svc = service(
            SentimentScore {
                polarity: 0.8,
                subjectivity: 0.6,
            },
            store.clone(),
        );

        let raw = br#"{"title":"X","content":"I love this.","url":"u"}"#;
        let enriched = svc.enrich(raw, "article-X.json").await.unwrap();

        assert_eq!(enriched.sentiment.overall, Overall::Positive);
        let stored = store.blob(SENTIMENT, "sentiment-article-X.json").unwrap();
        let parsed = EnrichedRecord::from_json(&stored).unwrap();
        assert_eq!(parsed.article.title, "X");
        assert_eq!(parsed.article.content, "I love this.");
        assert_eq!(parsed.article.url, "u");
        assert_eq!(parsed.sentiment.polarity, 0.8);
        assert_eq!(parsed.sentiment.subjectivity, 0.6);
        assert_eq!(parsed.sentiment.overall, Overall::Positive);
        assert!(store.container_created(SENTIMENT));
    }

    #[tokio::test]
    async fn unknown_raw_fields_survive_enrichment() {
        let store = MockBlobStore::new();
        let svc = service(
            SentimentScore {
                polarity: 0.3,
                subjectivity: 0.1,
            },
            store.clone(),
        );

        let raw = br#"{"title":"X","content":"Fine.","url":"u","author":"Jane","published":"2024-01-01"}"#;
        svc.enrich(raw, "article-X.json").await.unwrap();

        let stored = store.blob(SENTIMENT, "sentiment-article-X.json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value["author"], "Jane");
        assert_eq!(value["published"], "2024-01-01");
        assert_eq!(value["sentiment"]["overall"], "positive");
    }

    #[tokio::test]
    async fn zero_polarity_is_negative() {
        let store = MockBlobStore::new();
        let svc = service(
            SentimentScore {
                polarity: 0.0,
                subjectivity: 0.0,
            },
            store,
        );

        let raw = br#"{"title":"Flat","content":"The meeting is at noon.","url":"u"}"#;
        let enriched = svc.enrich(raw, "article-Flat.json").await.unwrap();

        assert_eq!(enriched.sentiment.overall, Overall::Negative);
    }

    #[tokio::test]
    async fn empty_content_writes_nothing() {
        let store = MockBlobStore::new();
        let scorer = MockScorer::new(SentimentScore {
            polarity: 0.5,
            subjectivity: 0.5,
        });
        let svc = EnrichmentService::new(scorer.clone(), store.clone(), SENTIMENT);

        let err = svc
            .on_arrival(br#"{"title":"X","content":"","url":"u"}"#.to_vec(), "article-X.json")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmptyContent(_)));
        assert_eq!(store.put_count(), 0);
        assert!(scorer.scored().is_empty());
    }

    #[tokio::test]
    async fn malformed_record_is_parse_error() {
        let store = MockBlobStore::new();
        let svc = service(
            SentimentScore {
                polarity: 0.5,
                subjectivity: 0.5,
            },
            store.clone(),
        );

        let err = svc.enrich(b"not json", "article-X.json").await.unwrap_err();

        assert!(matches!(err, AppError::SerializationError(_)));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn storage_failure_is_returned() {
        let store = MockBlobStore::new().with_put_failure("sentiment-article-X.json");
        let svc = service(
            SentimentScore {
                polarity: 0.1,
                subjectivity: 0.1,
            },
            store,
        );

        let err = svc
            .enrich(br#"{"title":"X","content":"ok","url":"u"}"#, "article-X.json")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[tokio::test]
    async fn processed_names_matches_enriched_counterparts() {
        let store = MockBlobStore::new();
        let svc = service(
            SentimentScore {
                polarity: 0.1,
                subjectivity: 0.1,
            },
            store,
        );
        let raw_names = vec!["article-A.json".to_string(), "article-B.json".to_string()];

        assert!(svc.processed_names(&raw_names).await.unwrap().is_empty());

        svc.enrich(br#"{"title":"A","content":"ok","url":"u"}"#, "article-A.json")
            .await
            .unwrap();

        let processed = svc.processed_names(&raw_names).await.unwrap();
        assert_eq!(processed.len(), 1);
        assert!(processed.contains("article-A.json"));
    }
}
