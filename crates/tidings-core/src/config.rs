use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::AppError;

pub const DEFAULT_HOMEPAGE_URL: &str = "https://www.bbc.com/news";
pub const DEFAULT_ARTICLE_PREFIX: &str = "/news/articles";
pub const DEFAULT_MAX_ARTICLES: usize = 10;
pub const DEFAULT_RAW_CONTAINER: &str = "articles-data";
pub const DEFAULT_SENTIMENT_CONTAINER: &str = "articles-sentiment";
pub const DEFAULT_INGEST_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound for the ingestion and poll intervals.
pub const MAX_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Where articles are discovered.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub homepage: Url,
    /// Path prefix identifying article pages.
    pub article_prefix: String,
    /// Cap on article URLs taken from one homepage fetch.
    pub max_articles: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            homepage: Url::parse(DEFAULT_HOMEPAGE_URL).expect("default homepage URL is valid"),
            article_prefix: DEFAULT_ARTICLE_PREFIX.to_string(),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }
}

/// Settings shared by both pipeline stages and the trigger layer.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub raw_container: String,
    pub sentiment_container: String,
    /// Wall-clock period between ingestion runs.
    pub ingest_interval: Duration,
    /// Run ingestion once as soon as the host starts.
    pub run_on_startup: bool,
    /// How often the raw container is listed for new blobs.
    pub poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            raw_container: DEFAULT_RAW_CONTAINER.to_string(),
            sentiment_container: DEFAULT_SENTIMENT_CONTAINER.to_string(),
            ingest_interval: DEFAULT_INGEST_INTERVAL,
            run_on_startup: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PipelineConfig {
    /// Read configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `TIDINGS_HOMEPAGE_URL` (defaults to the BBC News homepage)
    /// - `TIDINGS_ARTICLE_PREFIX` (defaults to `/news/articles`)
    /// - `TIDINGS_MAX_ARTICLES` (defaults to 10)
    /// - `TIDINGS_RAW_CONTAINER` / `TIDINGS_SENTIMENT_CONTAINER`
    /// - `TIDINGS_INGEST_INTERVAL_SECS` (defaults to 3600)
    /// - `TIDINGS_RUN_ON_STARTUP` (defaults to true)
    /// - `TIDINGS_POLL_INTERVAL_SECS` (defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("TIDINGS_HOMEPAGE_URL") {
            config.source.homepage = Url::parse(&raw).map_err(|e| {
                AppError::ConfigError(format!("Invalid TIDINGS_HOMEPAGE_URL '{raw}': {e}"))
            })?;
        }
        if let Some(prefix) = lookup("TIDINGS_ARTICLE_PREFIX") {
            if !prefix.starts_with('/') {
                return Err(AppError::ConfigError(format!(
                    "TIDINGS_ARTICLE_PREFIX '{prefix}' must start with '/'"
                )));
            }
            config.source.article_prefix = prefix;
        }
        if let Some(max) = parse_positive::<usize>(&lookup, "TIDINGS_MAX_ARTICLES")? {
            config.source.max_articles = max;
        }
        if let Some(name) = lookup("TIDINGS_RAW_CONTAINER") {
            config.raw_container = name;
        }
        if let Some(name) = lookup("TIDINGS_SENTIMENT_CONTAINER") {
            config.sentiment_container = name;
        }
        if let Some(interval) = parse_interval(&lookup, "TIDINGS_INGEST_INTERVAL_SECS")? {
            config.ingest_interval = interval;
        }
        if let Some(raw) = lookup("TIDINGS_RUN_ON_STARTUP") {
            config.run_on_startup = match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid TIDINGS_RUN_ON_STARTUP '{raw}': expected true or false"
                    )));
                }
            };
        }
        if let Some(interval) = parse_interval(&lookup, "TIDINGS_POLL_INTERVAL_SECS")? {
            config.poll_interval = interval;
        }

        if config.raw_container == config.sentiment_container {
            return Err(AppError::ConfigError(
                "Raw and sentiment containers must differ".into(),
            ));
        }

        Ok(config)
    }
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(Some(value)),
        _ => Err(AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a positive integer"
        ))),
    }
}

fn parse_interval(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>, AppError> {
    let Some(secs) = parse_positive::<u64>(lookup, key)? else {
        return Ok(None);
    };
    let interval = Duration::from_secs(secs);
    if interval > MAX_INTERVAL {
        return Err(AppError::ConfigError(format!(
            "{key} {secs} exceeds the maximum of {} seconds",
            MAX_INTERVAL.as_secs()
        )));
    }
    Ok(Some(interval))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.source.homepage.as_str(), "https://www.bbc.com/news");
        assert_eq!(config.source.article_prefix, "/news/articles");
        assert_eq!(config.source.max_articles, 10);
        assert_eq!(config.raw_container, "articles-data");
        assert_eq!(config.sentiment_container, "articles-sentiment");
        assert_eq!(config.ingest_interval, Duration::from_secs(3600));
        assert!(config.run_on_startup);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("TIDINGS_HOMEPAGE_URL", "https://news.example.com/"),
            ("TIDINGS_MAX_ARTICLES", "3"),
            ("TIDINGS_INGEST_INTERVAL_SECS", "600"),
            ("TIDINGS_RUN_ON_STARTUP", "false"),
        ]))
        .unwrap();
        assert_eq!(config.source.homepage.host_str(), Some("news.example.com"));
        assert_eq!(config.source.max_articles, 3);
        assert_eq!(config.ingest_interval, Duration::from_secs(600));
        assert!(!config.run_on_startup);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for pairs in [
            [("TIDINGS_MAX_ARTICLES", "0")],
            [("TIDINGS_MAX_ARTICLES", "ten")],
            [("TIDINGS_HOMEPAGE_URL", "not a url")],
            [("TIDINGS_ARTICLE_PREFIX", "news")],
            [("TIDINGS_RUN_ON_STARTUP", "maybe")],
            [("TIDINGS_SENTIMENT_CONTAINER", "articles-data")],
            [("TIDINGS_INGEST_INTERVAL_SECS", "10000000000000")],
            [("TIDINGS_POLL_INTERVAL_SECS", "31708800")],
        ] {
            let err = PipelineConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "{pairs:?}");
        }
    }

    #[test]
    fn test_interval_upper_bound() {
        let config = PipelineConfig::from_lookup(lookup(&[(
            "TIDINGS_INGEST_INTERVAL_SECS",
            "31622400",
        )]))
        .unwrap();
        assert_eq!(config.ingest_interval, MAX_INTERVAL);

        let err = PipelineConfig::from_lookup(lookup(&[(
            "TIDINGS_INGEST_INTERVAL_SECS",
            "31622401",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("TIDINGS_INGEST_INTERVAL_SECS"));
    }
}
