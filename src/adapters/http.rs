use crate::config::toml_config::FetchConfig;
use crate::core::Fetcher;
use crate::utils::error::{HeatError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Fetches listicle pages over HTTP, retrying timeouts and connection
/// failures with exponential backoff. Any non-2xx status is final.
pub struct HttpFetcher {
    client: Client,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_seconds),
        })
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("GET {} -> {}", url, response.status());
        response.error_for_status()?.text().await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.retry_attempts => {
                    let delay = backoff(self.retry_delay, attempt);
                    tracing::warn!(
                        "Fetch failed ({}/{}) for {}: {}. Retrying in {:?}",
                        attempt,
                        self.retry_attempts,
                        url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(HeatError::TransportError {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
