//! Synthetic articles for exercising the enrichment stage without scraping.

use crate::error::AppError;
use crate::models::ArticleRecord;
use crate::traits::{BlobStore, ensure_container};

/// Number of fake articles written per seed request.
pub const FAKE_ARTICLE_COUNT: usize = 10;

const FAKE_CONTENT: &str = "This is a generated fake article for scalability testing purposes.";

/// The `index`-th fake article (1-based).
pub fn fake_article(index: usize) -> ArticleRecord {
    ArticleRecord {
        title: format!("Fake Article {index}"),
        content: FAKE_CONTENT.to_string(),
        url: format!("https://fakeurl.com/article-{index}"),
    }
}

pub fn fake_blob_name(index: usize) -> String {
    format!("fake-article-{index}.json")
}

/// Write `fake-article-1.json` .. `fake-article-<count>.json` as compact JSON,
/// overwriting earlier seeds. Returns the names written.
pub async fn seed_fake_articles<B: BlobStore>(
    store: &B,
    container: &str,
    count: usize,
) -> Result<Vec<String>, AppError> {
    ensure_container(store, container).await?;

    let mut names = Vec::with_capacity(count);
    for index in 1..=count {
        let name = fake_blob_name(index);
        let content = serde_json::to_vec(&fake_article(index))?;
        store.put(container, &name, content, true).await?;
        names.push(name);
    }

    tracing::info!(count, %container, "Generated and uploaded fake articles");
    Ok(names)
}
