//! Pipeline orchestrator: ties page source → detector → summary → dedup gate together.
//!
//! ## One run
//!
//!   1. For each configured target, in order: fetch visible text, normalize,
//!      probe the tracked sections. A failed target is logged and contributes nothing.
//!   2. Nothing purchasable anywhere ⇒ stop. State is neither read nor written.
//!   3. Otherwise compose the message, fingerprint it, and let the change gate
//!      decide whether to notify.
//!
//! Runs are expected to be serialized by the external scheduler (cron / CI).

use crate::config::AppConfig;
use crate::dedup::{self, ChangeGate};
use crate::detector::{normalize, Prober};
use crate::models::{AvailabilityResult, MonitoredTarget, RunOutcome, RunReport};
use crate::notifier::{LineNotifier, Notifier};
use crate::scraper::{PageSource, TicketPageScraper};
use crate::storage::{FileStateStore, StateStore};
use crate::summary::compose;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Pipeline {
    config: AppConfig,
    targets: Vec<MonitoredTarget>,
    prober: Prober,
    source: Arc<dyn PageSource>,
    notifier: Arc<dyn Notifier>,
    gate: ChangeGate,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        source: Arc<dyn PageSource>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self> {
        let targets = config.targets().context("Invalid target configuration")?;
        let prober = Prober::from_config(&config.probe);
        Ok(Self {
            config,
            targets,
            prober,
            source,
            notifier,
            gate: ChangeGate::new(store),
        })
    }

    /// Wire up the HTTP scraper, LINE notifier and file state slot.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let source = Arc::new(
            TicketPageScraper::new(&config.scraper).context("Failed to build scraper")?,
        );
        let notifier = Arc::new(
            LineNotifier::new(&config.notifier).context("Failed to build notifier")?,
        );
        let store = Arc::new(FileStateStore::new(&config.state.path));
        Self::new(config, source, notifier, store)
    }

    /// Probe every target sequentially. Returns non-empty results in target order
    /// plus the number of targets that failed.
    pub async fn probe_all(&self) -> (Vec<AvailabilityResult>, usize) {
        let mut results = Vec::new();
        let mut failed = 0usize;

        for target in &self.targets {
            match self.probe_target(target).await {
                Ok(result) if result.is_empty() => {
                    info!("{}: nothing available", target.url);
                }
                Ok(result) => {
                    info!("{}: available {:?}", target.url, result.available);
                    results.push(result);
                }
                Err(e) => {
                    warn!("{}: {:#}", target.url, e);
                    failed += 1;
                }
            }
        }

        (results, failed)
    }

    async fn probe_target(&self, target: &MonitoredTarget) -> Result<AvailabilityResult> {
        let raw = self.source.fetch_text(&target.url).await?;
        let text = normalize(&raw);
        debug!("{}: {} chars after normalization", target.url, text.chars().count());

        Ok(AvailabilityResult {
            url: target.url.clone(),
            available: self.prober.probe(&text, &target.keywords),
        })
    }

    /// One monitoring pass. Never fails on per-target or notifier errors.
    pub async fn run(&self, dry_run: bool) -> RunReport {
        let (results, failed) = self.probe_all().await;

        let mut report = RunReport {
            targets_checked: self.targets.len(),
            targets_failed: failed,
            targets_available: results.len(),
            outcome: RunOutcome::NothingAvailable,
            digest: None,
        };

        if results.is_empty() {
            info!("No available tickets this round");
            return report;
        }

        let digest = dedup::digest(compose(&results, &self.config.summary));
        debug!("Digest fingerprint {}", digest.fingerprint);

        report.outcome = if dry_run {
            info!("Dry run: not notifying, state untouched");
            RunOutcome::DryRun
        } else {
            self.gate.dispatch(&digest, self.notifier.as_ref()).await
        };
        report.digest = Some(digest);
        report
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
