use std::time::Duration;

use reqwest::Client;
use tidings_core::error::AppError;
use tidings_core::traits::Fetcher;

/// Desktop browser User-Agent sent with every request, so basic bot filters
/// serve the regular page.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// HTTP fetcher using reqwest.
///
/// One GET per call, no retries and no caching. Without
/// [`with_timeout`](Self::with_timeout) the client's defaults apply.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::build(Client::builder())
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Self::build(Client::builder().timeout(timeout))
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, AppError> {
        let client = builder
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| AppError::FetchError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!(%url, "Fetching page");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::FetchError(format!("Request to {url} timed out: {e}"))
            } else if e.is_connect() {
                AppError::FetchError(format!("Connection failed for {url}: {e}"))
            } else {
                AppError::FetchError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::FetchError(format!("Failed to read response body: {e}")))?;
        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
