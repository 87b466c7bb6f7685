//! Article discovery and extraction.
//!
//! [`ArticleFetcher`] turns a homepage into a bounded list of article URLs and
//! each article URL into an [`ArticleRecord`]. Network access goes through a
//! [`Fetcher`], HTML handling through a [`PageParser`].

use std::collections::HashSet;

use url::Url;

use crate::config::SourceConfig;
use crate::error::AppError;
use crate::models::{ArticleRecord, NO_TITLE, ParsedArticle};
use crate::traits::{Fetcher, PageParser};

#[derive(Clone)]
pub struct ArticleFetcher<F, P>
where
    F: Fetcher,
    P: PageParser,
{
    fetcher: F,
    parser: P,
    source: SourceConfig,
}

impl<F, P> ArticleFetcher<F, P>
where
    F: Fetcher,
    P: PageParser,
{
    pub fn new(fetcher: F, parser: P, source: SourceConfig) -> Self {
        Self {
            fetcher,
            parser,
            source,
        }
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Fetch the homepage and return up to `max_articles` article URLs.
    ///
    /// A failed homepage fetch is returned as-is; the caller abandons the
    /// whole cycle.
    pub async fn discover(&self) -> Result<Vec<String>, AppError> {
        let homepage = self.source.homepage.as_str();
        let html = self.fetcher.fetch(homepage).await?;
        let hrefs = self.parser.links(&html);
        let urls = select_article_links(
            &self.source.homepage,
            &hrefs,
            &self.source.article_prefix,
            self.source.max_articles,
        );
        tracing::info!(
            %homepage,
            anchors = hrefs.len(),
            articles = urls.len(),
            "Discovered article links"
        );
        Ok(urls)
    }

    /// Fetch and extract one article.
    ///
    /// Fails with `FetchError` when the page cannot be retrieved and with
    /// `EmptyContent` when the article container holds no paragraph text.
    pub async fn try_extract(&self, url: &str) -> Result<ArticleRecord, AppError> {
        let html = self.fetcher.fetch(url).await?;
        build_record(url, self.parser.article(&html))
    }

    /// Like [`try_extract`](Self::try_extract) but logs the failure and
    /// yields `None`, so one bad article never affects the rest of a batch.
    pub async fn extract(&self, url: &str) -> Option<ArticleRecord> {
        match self.try_extract(url).await {
            Ok(record) => Some(record),
            Err(e) if e.is_warning() => {
                tracing::warn!(%url, "No content found for article");
                None
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "Error fetching article");
                None
            }
        }
    }
}

/// Resolve, filter, deduplicate and cap anchor targets.
///
/// Keeps targets on the homepage's host whose path starts with `prefix`,
/// in first-seen order, at most `max` of them.
pub fn select_article_links(base: &Url, hrefs: &[String], prefix: &str, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for href in hrefs {
        if selected.len() >= max {
            break;
        }
        let Ok(resolved) = base.join(href.trim()) else {
            continue;
        };
        if resolved.host_str() != base.host_str() || !resolved.path().starts_with(prefix) {
            continue;
        }
        let absolute = resolved.to_string();
        if seen.insert(absolute.clone()) {
            selected.push(absolute);
        }
    }

    selected
}

/// Assemble a record from parsed page parts.
pub fn build_record(url: &str, parsed: ParsedArticle) -> Result<ArticleRecord, AppError> {
    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let content = parsed
        .paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if content.is_empty() {
        return Err(AppError::EmptyContent(url.to_string()));
    }

    Ok(ArticleRecord {
        title,
        content,
        url: url.to_string(),
    })
}
