//! # Observability
//!
//! Pipeline metrics recorded through the `metrics` facade. The engine
//! only records; wiring an exporter (Prometheus or otherwise) is the
//! serving layer's responsibility.

use crate::matcher::MatchTier;
use std::time::Duration;

/// Record per-scan pipeline statistics
pub fn record_scan_metrics(
    duration: Duration,
    lines: usize,
    noise_dropped: usize,
    candidates: usize,
    items: usize,
) {
    metrics::counter!("receipt_scans_total").increment(1);
    metrics::histogram!("receipt_scan_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("receipt_scan_lines").record(lines as f64);
    metrics::histogram!("receipt_scan_noise_dropped").record(noise_dropped as f64);
    metrics::histogram!("receipt_scan_candidates").record(candidates as f64);
    metrics::histogram!("receipt_scan_items").record(items as f64);
}

/// Record a successful match, labeled by the tier that produced it
pub fn record_match_tier(tier: MatchTier) {
    metrics::counter!("receipt_matches_total", "tier" => tier.as_str()).increment(1);
}

/// Record a line dropped by the noise filter, labeled by rule
pub fn record_noise_drop(rule: &'static str) {
    metrics::counter!("receipt_noise_dropped_total", "rule" => rule).increment(1);
}
