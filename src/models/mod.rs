use serde::{Deserialize, Serialize};

// ── Target ────────────────────────────────────────────────────────────────────

/// A ticket page plus the section labels tracked on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoredTarget {
    pub url: String,
    pub keywords: Vec<String>,   // whitespace-free, deduplicated, configured order
}

// ── Probe result ──────────────────────────────────────────────────────────────

/// Sections judged purchasable on one target during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub url: String,
    pub available: Vec<String>,  // sorted, unique
}

impl AvailabilityResult {
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

// ── Digest ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDigest {
    pub message: String,
    pub fingerprint: String,     // lowercase hex SHA-256 of `message`
}

// ── Run outcome ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No target had a purchasable section; state was not touched.
    NothingAvailable,
    /// Same digest as the last notification.
    Skipped,
    /// Sent and the new fingerprint persisted (or the write failed and was logged).
    Notified,
    /// No credential configured; state left as is.
    NotifierDisabled,
    /// Transport or upstream rejection; state left as is so the next run retries.
    SendFailed,
    /// `--dry-run`: message composed, nothing sent or stored.
    DryRun,
}

#[derive(Debug)]
pub struct RunReport {
    pub targets_checked: usize,
    pub targets_failed: usize,
    pub targets_available: usize,
    pub outcome: RunOutcome,
    pub digest: Option<NotificationDigest>,
}
