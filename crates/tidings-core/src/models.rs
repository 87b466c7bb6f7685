use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Title used when an article page has no first-level heading.
pub const NO_TITLE: &str = "No Title Found";

/// A scraped article as stored in the raw articles container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Body text. A missing field reads as empty so it is rejected as
    /// empty content rather than as malformed JSON.
    #[serde(default)]
    pub content: String,
    pub url: String,
}

impl ArticleRecord {
    /// Blob name for this record: `article-<title with spaces as underscores>.json`.
    ///
    /// Only spaces are rewritten. Identical titles map to the same name and
    /// overwrite each other.
    pub fn blob_name(&self) -> String {
        format!("article-{}.json", self.title.replace(' ', "_"))
    }

    /// Pretty-printed JSON with non-ASCII characters kept literally.
    pub fn to_json(&self) -> Result<Vec<u8>, AppError> {
        to_pretty_json(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Overall sentiment class derived from polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overall {
    Positive,
    Negative,
}

impl Overall {
    /// `Positive` iff `polarity > 0.0`. Zero polarity is `Negative`.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Overall::Positive
        } else {
            Overall::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Overall::Positive => "positive",
            Overall::Negative => "negative",
        }
    }
}

/// Raw output of a sentiment scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    /// In `[-1.0, 1.0]`.
    pub polarity: f64,
    /// In `[0.0, 1.0]`.
    pub subjectivity: f64,
}

/// Sentiment block appended to an enriched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
    pub overall: Overall,
}

impl From<SentimentScore> for Sentiment {
    fn from(score: SentimentScore) -> Self {
        Self {
            polarity: score.polarity,
            subjectivity: score.subjectivity,
            overall: Overall::from_polarity(score.polarity),
        }
    }
}

/// Extra top-level fields of a stored record, kept as-is.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// An [`ArticleRecord`] with its sentiment appended.
///
/// Fields of the raw record other than `title`, `content` and `url` are
/// carried through unchanged in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub article: ArticleRecord,
    #[serde(flatten)]
    pub extra: ExtraFields,
    pub sentiment: Sentiment,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(flatten)]
    article: ArticleRecord,
    #[serde(flatten)]
    extra: ExtraFields,
}

impl EnrichedRecord {
    /// Parse a raw record, keeping unknown fields. A `sentiment` field in the
    /// raw record is dropped since it is replaced on enrichment.
    pub fn parse_raw(bytes: &[u8]) -> Result<(ArticleRecord, ExtraFields), AppError> {
        let RawRecord { article, mut extra } = serde_json::from_slice(bytes)?;
        extra.remove("sentiment");
        Ok((article, extra))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, AppError> {
        to_pretty_json(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Name of the enriched counterpart of a raw blob.
pub fn enriched_blob_name(source_name: &str) -> String {
    format!("sentiment-{source_name}")
}

/// Title and paragraph texts pulled out of an article page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArticle {
    /// Text of the first `<h1>`, if any.
    pub title: Option<String>,
    /// Text of each paragraph inside the article container, in order.
    pub paragraphs: Vec<String>,
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
