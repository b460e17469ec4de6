use crate::types::{AggregatorError, FetchConfig, Result, Source};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Single-attempt HTTP GETs for feeds and article pages.
///
/// Every call carries the client's timeout. Failures come back as
/// `AggregatorError` values so callers can drop one resource and keep going.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch raw bytes from `url`.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        self.read_limited(url, response).await
    }

    /// Fetch a source's feed document.
    pub async fn fetch_feed(&self, source: &Source) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        match self.fetch(&source.feed_url).await {
            Ok(body) => {
                debug!(
                    "Fetched feed for {} ({} bytes in {:?})",
                    source.name,
                    body.len(),
                    start_time.elapsed()
                );
                Ok(body)
            }
            Err(e) => {
                warn!("Failed to fetch feed for {}: {}", source.name, e);
                Err(e)
            }
        }
    }

    /// Fetch an article page as text. Invalid UTF-8 is replaced, not rejected.
    pub async fn fetch_article(&self, url: &str) -> Result<String> {
        debug!("Fetching article content from: {}", url);

        match self.fetch(url).await {
            Ok(body) => Ok(String::from_utf8_lossy(&body).into_owned()),
            Err(e) => {
                warn!("Failed to fetch article content {}: {}", url, e);
                Err(e)
            }
        }
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let parsed = Url::parse(url)?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Reject early when the declared length is already over the limit
        if let Some(content_length) = response.content_length() {
            if content_length > self.body_limit() {
                return Err(self.too_large(url));
            }
        }

        Ok(response)
    }

    /// Read the body chunk by chunk, failing once it passes the size limit.
    async fn read_limited(&self, url: &str, mut response: Response) -> Result<Vec<u8>> {
        let limit = self.body_limit();
        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn body_limit(&self) -> u64 {
        self.config.max_body_size_mb as u64 * 1024 * 1024
    }

    fn too_large(&self, url: &str) -> AggregatorError {
        AggregatorError::BodyTooLarge {
            url: url.to_string(),
            limit_mb: self.config.max_body_size_mb,
        }
    }
}
