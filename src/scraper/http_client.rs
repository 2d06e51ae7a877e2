use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

#[derive(Debug, Error)]
enum FetchError {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
}

impl FetchError {
    /// Transport errors, 429 and 5xx are worth another attempt; other 4xx are not.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status(s) => *s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error(),
        }
    }
}

pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid accept_language header value")?,
        );
        // always ask for the live seat map
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Fetch a URL as text with rate-limiting and retry.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.polite_delay().await;

        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.config.max_retries as usize);

        RetryIf::start(strategy, || self.get_once(url), |e: &FetchError| {
            let retry = e.is_retryable();
            if retry {
                warn!("GET {} failed ({}), retrying", url, e);
            }
            retry
        })
        .await
        .with_context(|| format!("All retries exhausted for {}", url))
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let resp = self.inner.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        let jitter = if self.config.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.config.jitter_ms)
        };
        let total = self.config.request_delay_ms + jitter;
        if total > 0 {
            sleep(Duration::from_millis(total)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_retries: u32) -> HttpClient {
        HttpClient::new(&ScraperConfig {
            timeout_secs: 5,
            request_delay_ms: 0,
            jitter_ms: 0,
            max_retries,
            ..ScraperConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_text_sends_browser_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ticket/area/1")
            .match_header("user-agent", "Mozilla/5.0")
            .match_header("accept-language", "zh-TW,zh;q=0.9")
            .match_header("cache-control", "no-cache")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<p>6880站區</p>")
            .create_async()
            .await;

        let body = client(0)
            .get_text(&format!("{}/ticket/area/1", server.url()))
            .await
            .unwrap();
        assert_eq!(body, "<p>6880站區</p>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/busy")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = client(2).get_text(&format!("{}/busy", server.url())).await;
        assert!(result.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_fails_fast() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let result = client(3).get_text(&format!("{}/gone", server.url())).await;
        assert!(result.is_err());
        mock.assert_async().await;
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!FetchError::Status(StatusCode::FORBIDDEN).is_retryable());
    }
}
