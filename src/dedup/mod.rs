//! Change-dedup gate.
//!
//! The composed message is fingerprinted with SHA-256 and compared with the
//! fingerprint of the last message that was sent. Equal ⇒ skip. Different
//! (or nothing stored yet) ⇒ notify, and only a confirmed send advances the
//! stored fingerprint, so a failed send is retried on the next run.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::{NotificationDigest, RunOutcome};
use crate::notifier::{Delivery, Notifier};
use crate::storage::StateStore;

/// Lowercase hex SHA-256 of the UTF-8 message.
pub fn fingerprint(message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn digest(message: String) -> NotificationDigest {
    let fingerprint = fingerprint(&message);
    NotificationDigest { message, fingerprint }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorState {
    NoPriorState,
    HasPriorFingerprint(String),
}

impl PriorState {
    pub fn from_slot(slot: Option<String>) -> Self {
        match slot {
            Some(f) if !f.is_empty() => PriorState::HasPriorFingerprint(f),
            _ => PriorState::NoPriorState,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Notify,
}

pub fn decide(prior: &PriorState, current: &str) -> Decision {
    match prior {
        PriorState::HasPriorFingerprint(prev) if prev == current => Decision::Skip,
        _ => Decision::Notify,
    }
}

// ── Gate ──────────────────────────────────────────────────────────────────────

/// Sole owner of the persisted fingerprint.
pub struct ChangeGate {
    store: Arc<dyn StateStore>,
}

impl ChangeGate {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Read failures degrade to `NoPriorState`: the worst case is a duplicate notification.
    pub async fn load_prior(&self) -> PriorState {
        match self.store.load_fingerprint().await {
            Ok(slot) => PriorState::from_slot(slot),
            Err(e) => {
                warn!("{}; treating as no prior state", e);
                PriorState::NoPriorState
            }
        }
    }

    pub async fn dispatch(&self, digest: &NotificationDigest, notifier: &dyn Notifier) -> RunOutcome {
        let prior = self.load_prior().await;

        if decide(&prior, &digest.fingerprint) == Decision::Skip {
            info!("Same availability as last notification ({}), skipping", short(&digest.fingerprint));
            return RunOutcome::Skipped;
        }

        match notifier.send(&digest.message).await {
            Ok(Delivery::Sent) => {
                if let Err(e) = self.store.save_fingerprint(&digest.fingerprint).await {
                    warn!("{}; the next run may notify again", e);
                }
                info!("Notification sent ({})", short(&digest.fingerprint));
                RunOutcome::Notified
            }
            Ok(Delivery::Disabled) => RunOutcome::NotifierDisabled,
            Err(e) => {
                error!("Notification failed: {}", e);
                RunOutcome::SendFailed
            }
        }
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
