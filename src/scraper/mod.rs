pub mod extract;
pub mod http_client;

use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use self::extract::extract_text;
use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source: yields the visible text of a page, not yet normalized.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

// ── Ticket page scraper ───────────────────────────────────────────────────────

pub struct TicketPageScraper {
    client: HttpClient,
}

impl TicketPageScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl PageSource for TicketPageScraper {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let html = self.client.get_text(url).await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let text = extract_text(&html);
        debug!("{}: {} bytes html, {} chars text", url, html.len(), text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_text_extracts_visible_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ticket/area/26_cxm/21777")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><script>x=1</script><body><li>6880站區 熱賣中</li></body></html>")
            .create_async()
            .await;

        let scraper = TicketPageScraper::new(&ScraperConfig {
            jitter_ms: 0,
            max_retries: 0,
            ..ScraperConfig::default()
        })
        .unwrap();

        let text = scraper
            .fetch_text(&format!("{}/ticket/area/26_cxm/21777", server.url()))
            .await
            .unwrap();
        assert_eq!(text, "6880站區 熱賣中");
    }
}
