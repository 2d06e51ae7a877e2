//! Renders the notification text from per-target probe results.

use crate::config::SummaryConfig;
use crate::models::AvailabilityResult;

/// Build the notification message.
///
/// Targets with nothing available are left out. Order follows `results`,
/// which is the configured target order. The output is the fingerprint input,
/// so it must never carry timestamps or anything else that varies between runs.
pub fn compose(results: &[AvailabilityResult], config: &SummaryConfig) -> String {
    let mut msg = format!("{}\n\n", config.headline);
    for r in results.iter().filter(|r| !r.is_empty()) {
        msg.push_str(&r.url);
        msg.push('\n');
        msg.push_str(&config.available_label);
        msg.push_str(&r.available.join(", "));
        msg.push_str("\n\n");
    }
    msg.trim().to_string()
}
