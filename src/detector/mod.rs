//! Availability detection over normalized page text.
//!
//! A section counts as purchasable when its label appears at least once
//! without a sold-out marker inside the following `tail_len` characters.
//! Labels that never appear are not evaluated at all.

mod normalize;
mod sold_out;

pub use self::normalize::normalize;
pub use self::sold_out::SoldOutClassifier;

use crate::config::ProbeConfig;
use tracing::debug;

pub struct Prober {
    classifier: SoldOutClassifier,
    tail_len: usize,
}

impl Prober {
    pub fn new(classifier: SoldOutClassifier, tail_len: usize) -> Self {
        Self { classifier, tail_len }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        let classifier = SoldOutClassifier::new(&config.sold_out_markers);
        debug!("Sold-out markers: {:?}, tail_len {}", classifier.markers(), config.tail_len);
        Self::new(classifier, config.tail_len)
    }

    /// Returns the purchasable subset of `keywords`, sorted and deduplicated.
    ///
    /// `text` must already be normalized. Keywords are matched literally and
    /// independently, so a keyword contained in another may be reported alongside it.
    pub fn probe<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> Vec<String> {
        let mut available = Vec::new();
        for kw in keywords {
            let kw: &str = kw.as_ref();
            if self.is_purchasable(text, kw) {
                available.push(kw.to_string());
            }
        }

        available.sort();
        available.dedup();
        available
    }

    fn is_purchasable(&self, text: &str, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        text.match_indices(keyword).any(|(start, m)| {
            let window = tail_window(text, start + m.len(), self.tail_len);
            !self.classifier.is_unavailable(window)
        })
    }
}

/// The next `len` characters (not bytes) of `text` starting at byte `from`.
fn tail_window(text: &str, from: usize, len: usize) -> &str {
    let rest = &text[from..];
    match rest.char_indices().nth(len) {
        Some((idx, _)) => &rest[..idx],
        None => rest,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
