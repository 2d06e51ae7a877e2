//! Push notification delivery.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::NotifierConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build notifier client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("notification request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("notification rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the push service.
    Sent,
    /// No credential configured; nothing was sent.
    Disabled,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<Delivery, NotifyError>;
}

// ── LINE Notify ───────────────────────────────────────────────────────────────

/// Bearer-token form POST (`message=<text>`), LINE Notify style.
pub struct LineNotifier {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl LineNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.trim().to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty()
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    async fn send(&self, message: &str) -> Result<Delivery, NotifyError> {
        if !self.is_enabled() {
            warn!("Notifier token is empty, skipping notification");
            return Ok(Delivery::Disabled);
        }

        debug!("POST {} ({} chars)", self.endpoint, message.chars().count());

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .form(&[("message", message)])
            .send()
            .await
            .map_err(NotifyError::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(Delivery::Sent);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(NotifyError::Rejected { status: status.as_u16(), body })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
