//! Test doubles for the I/O seams.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::notifier::{Delivery, Notifier, NotifyError};
use crate::scraper::PageSource;

/// Records every message; answers with a fixed result.
pub struct FakeNotifier {
    sent: Mutex<Vec<String>>,
    respond: fn() -> Result<Delivery, NotifyError>,
}

impl FakeNotifier {
    pub fn new(respond: fn() -> Result<Delivery, NotifyError>) -> Self {
        Self { sent: Mutex::new(Vec::new()), respond }
    }

    pub fn delivering() -> Self {
        Self::new(|| Ok(Delivery::Sent))
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<String> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &str) -> Result<Delivery, NotifyError> {
        self.sent.lock().unwrap().push(message.to_string());
        (self.respond)()
    }
}

/// Serves canned page text per URL; unknown URLs fail like a dead host.
#[derive(Default)]
pub struct FakeSource {
    pages: Mutex<HashMap<String, String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.set_page(url, text);
        self
    }

    pub fn set_page(&self, url: &str, text: &str) {
        self.pages.lock().unwrap().insert(url.to_string(), text.to_string());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}
