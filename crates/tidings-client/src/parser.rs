use scraper::{ElementRef, Html, Selector};
use tidings_core::models::ParsedArticle;
use tidings_core::traits::PageParser;

/// HTML parser built on `scraper`.
///
/// Links are the `href` of every anchor. The article title is the first
/// `<h1>` anywhere on the page; the body is every `<p>` inside the first
/// `<article>` element.
#[derive(Clone)]
pub struct ScraperParser {
    anchor: Selector,
    heading: Selector,
    article: Selector,
    paragraph: Selector,
}

impl ScraperParser {
    pub fn new() -> Self {
        Self {
            anchor: selector("a[href]"),
            heading: selector("h1"),
            article: selector("article"),
            paragraph: selector("p"),
        }
    }
}

impl Default for ScraperParser {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl PageParser for ScraperParser {
    fn links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    fn article(&self, html: &str) -> ParsedArticle {
        let document = Html::parse_document(html);

        let title = document.select(&self.heading).next().map(text_of);

        let paragraphs = match document.select(&self.article).next() {
            Some(article) => article.select(&self.paragraph).map(text_of).collect(),
            None => Vec::new(),
        };

        ParsedArticle { title, paragraphs }
    }
}

#[cfg(test)]
mod tests {
    use tidings_core::SourceConfig;
    use tidings_core::error::AppError;
    use tidings_core::fetch::ArticleFetcher;
    use tidings_core::testutil::MockFetcher;

    use super::*;

    #[test]
    fn test_links_in_document_order() {
        let html = r#"
            <nav><a href="/news">Home</a></nav>
            <a href="/news/articles/c1">One</a>
            <a>No target</a>
            <div><a href="https://www.bbc.com/news/articles/c2">Two</a></div>
        "#;
        assert_eq!(
            ScraperParser::new().links(html),
            vec!["/news", "/news/articles/c1", "https://www.bbc.com/news/articles/c2"]
        );
    }

    #[test]
    fn test_article_title_and_paragraphs() {
        let html = r#"
            <html><body>
              <header><p>Site banner</p></header>
              <h1> Storm <b>hits</b> coast </h1>
              <h1>Second heading</h1>
              <article>
                <p>Winds rose overnight.</p>
                <div><p>  Roofs were damaged.  </p></div>
              </article>
              <article><p>Related story</p></article>
            </body></html>
        "#;
        let parsed = ScraperParser::new().article(html);
        assert_eq!(parsed.title.as_deref(), Some("Storm hits coast"));
        assert_eq!(
            parsed.paragraphs,
            vec!["Winds rose overnight.", "Roofs were damaged."]
        );
    }

    #[test]
    fn test_article_without_container_has_no_paragraphs() {
        let parsed = ScraperParser::new().article("<h1>Title</h1><p>Outside</p>");
        assert_eq!(parsed.title.as_deref(), Some("Title"));
        assert!(parsed.paragraphs.is_empty());
    }

    #[test]
    fn test_article_without_heading() {
        let parsed = ScraperParser::new().article("<article><p>Body</p></article>");
        assert!(parsed.title.is_none());
    }

    #[tokio::test]
    async fn test_discover_fifteen_anchors_returns_first_ten() {
        let anchors: String = (1..=15)
            .map(|i| format!(r#"<a href="/news/articles/story-{i}">Story {i}</a>"#))
            .collect();
        let html = format!("<html><body>{anchors}</body></html>");
        let articles = ArticleFetcher::new(
            MockFetcher::new(&html),
            ScraperParser::new(),
            SourceConfig::default(),
        );

        let urls = articles.discover().await.unwrap();

        assert_eq!(urls.len(), 10);
        assert_eq!(urls[0], "https://www.bbc.com/news/articles/story-1");
        assert_eq!(urls[9], "https://www.bbc.com/news/articles/story-10");
    }

    #[tokio::test]
    async fn test_extract_from_html() {
        let html = "<h1>Café reopens</h1><article><p>Good news.</p><p>Très bien.</p></article>";
        let articles = ArticleFetcher::new(
            MockFetcher::new(html),
            ScraperParser::new(),
            SourceConfig::default(),
        );

        let record = articles.try_extract("https://www.bbc.com/news/articles/x").await.unwrap();

        assert_eq!(record.title, "Café reopens");
        assert_eq!(record.content, "Good news. Très bien.");
        assert_eq!(record.blob_name(), "article-Café_reopens.json");
    }

    #[tokio::test]
    async fn test_extract_empty_article_is_not_found() {
        let html = "<h1>Live page</h1><article><p> </p><figure>img</figure></article>";
        let articles = ArticleFetcher::new(
            MockFetcher::new(html),
            ScraperParser::new(),
            SourceConfig::default(),
        );

        let err = articles.try_extract("https://www.bbc.com/news/articles/x").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyContent(_)));
    }
}
