use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;
use url::Url;

use crate::models::MonitoredTarget;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// One monitored page as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TargetConfig {
    pub url: String,

    /// Overrides `probe.keywords` for this page when present.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// Availability detection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default = "default_targets")]
    pub targets: Vec<TargetConfig>,

    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "default_sold_out_markers")]
    pub sold_out_markers: Vec<String>,

    /// Characters inspected after each keyword occurrence.
    #[serde(default = "default_tail_len")]
    pub tail_len: usize,
}

/// Notification message layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryConfig {
    #[serde(default = "default_headline")]
    pub headline: String,

    #[serde(default = "default_available_label")]
    pub available_label: String,
}

/// Dedup marker persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

/// Push notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notify_endpoint")]
    pub endpoint: String,

    /// Empty means notifications are disabled.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    20
}
fn default_jitter_ms() -> u64 {
    250
}
fn default_max_retries() -> u32 {
    2
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_accept_language() -> String {
    "zh-TW,zh;q=0.9".to_string()
}
fn default_targets() -> Vec<TargetConfig> {
    [
        "https://tixcraft.com/ticket/area/26_cxm/21777",
        "https://tixcraft.com/ticket/area/26_cxm/21671",
        "https://tixcraft.com/ticket/area/26_cxm/21672",
    ]
    .into_iter()
    .map(|url| TargetConfig { url: url.to_string(), keywords: None })
    .collect()
}
fn default_keywords() -> Vec<String> {
    [
        "6880站區",
        "6280站區",
        "6880看台區",
        "6280看台區",
        "5880看台區",
        "4880看台區",
        "3880看台區",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_sold_out_markers() -> Vec<String> {
    ["已售完", "暫無票券", "尚未開賣", "Soldout", "Sold Out", "SOLD OUT"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_tail_len() -> usize {
    80
}
fn default_headline() -> String {
    "🎫 有票啦！".to_string()
}
fn default_available_label() -> String {
    "可買：".to_string()
}
fn default_state_path() -> PathBuf {
    PathBuf::from(".state/last_notified.hash")
}
fn default_notify_endpoint() -> String {
    "https://notify-api.line.me/api/notify".to_string()
}
fn default_notify_timeout_secs() -> u64 {
    15
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            jitter_ms: default_jitter_ms(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            keywords: default_keywords(),
            sold_out_markers: default_sold_out_markers(),
            tail_len: default_tail_len(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            headline: default_headline(),
            available_label: default_available_label(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { path: default_state_path() }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_notify_endpoint(),
            token: String::new(),
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            probe: ProbeConfig::default(),
            summary: SummaryConfig::default(),
            state: StateConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("TIXWATCH").separator("__"))
            .build()?;

        let mut app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Config could not be deserialized ({}), using built-in defaults", e);
            AppConfig::default()
        });

        if app_cfg.notifier.token.trim().is_empty() {
            if let Ok(token) = std::env::var("LINE_TOKEN") {
                app_cfg.notifier.token = token;
            }
        }

        Ok(app_cfg)
    }

    /// Resolve the configured pages into validated targets, in configured order.
    pub fn targets(&self) -> Result<Vec<MonitoredTarget>> {
        self.probe.resolve_targets()
    }
}

impl ProbeConfig {
    pub fn resolve_targets(&self) -> Result<Vec<MonitoredTarget>> {
        if self.targets.is_empty() {
            bail!("No targets configured (probe.targets is empty)");
        }
        if self.tail_len == 0 {
            bail!("probe.tail_len must be at least 1");
        }

        self.targets
            .iter()
            .map(|t| -> Result<MonitoredTarget> {
                let url = Url::parse(t.url.trim())
                    .with_context(|| format!("Invalid target URL {:?}", t.url))?;

                let source = t.keywords.as_ref().unwrap_or(&self.keywords);
                let mut keywords: Vec<String> = Vec::with_capacity(source.len());
                for kw in source {
                    let kw = crate::detector::normalize(kw);
                    if kw.is_empty() {
                        warn!("{}: ignoring empty keyword", url);
                    } else if !keywords.contains(&kw) {
                        keywords.push(kw);
                    }
                }

                if keywords.is_empty() {
                    warn!("{}: no keywords to track", url);
                }

                Ok(MonitoredTarget { url: url.to_string(), keywords })
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
