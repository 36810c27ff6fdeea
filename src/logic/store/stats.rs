//! Aggregate stats computation
//!
//! Full rescan of the record set on every batch. The set is bounded by the
//! store capacity, so this stays cheap and can never drift.

use std::collections::BTreeMap;

use chrono::Duration;

use super::types::{AggregateStats, StoreSettings};
use crate::logic::record::{ClassificationRecord, RiskLevel};

/// Compute stats from records ordered by arrival rank (oldest first)
pub fn compute(
    records: &[ClassificationRecord],
    high_water: u64,
    settings: &StoreSettings,
) -> AggregateStats {
    let mut stats = AggregateStats {
        total_processed: high_water,
        retained: records.len(),
        ..AggregateStats::default()
    };

    let mut labels = BTreeMap::new();
    for record in records {
        match record.risk {
            RiskLevel::High => stats.high_risk_count += 1,
            RiskLevel::Medium => stats.medium_risk_count += 1,
            RiskLevel::Low => stats.low_risk_count += 1,
            RiskLevel::Unknown => stats.unknown_risk_count += 1,
        }
        let label = record.label.clone().unwrap_or_else(|| "unknown".to_string());
        *labels.entry(label).or_insert(0usize) += 1;
    }
    stats.labels = labels;

    if !records.is_empty() {
        stats.high_risk_ratio = stats.high_risk_count as f64 / records.len() as f64;
    }

    stats.threat_level = threat_level(records, settings.threat_window);
    stats.events_per_minute = events_per_minute(records, settings.rate_window_secs);
    stats
}

/// Worst risk among the last `window` arrivals
pub fn threat_level(records: &[ClassificationRecord], window: usize) -> RiskLevel {
    records
        .iter()
        .rev()
        .take(window.max(1))
        .map(|r| r.risk)
        .max_by_key(|risk| risk.severity_level())
        .unwrap_or(RiskLevel::Unknown)
}

/// Records inside the trailing rate window, scaled to one minute.
///
/// The window ends at the latest backend time in the set when the newest
/// arrival carries one, otherwise at the newest arrival's local time.
pub fn events_per_minute(records: &[ClassificationRecord], window_secs: i64) -> f64 {
    let newest = match records.last() {
        Some(r) => r,
        None => return 0.0,
    };

    let anchor = match newest.observed_at {
        Some(_) => records
            .iter()
            .filter_map(|r| r.observed_at)
            .max()
            .unwrap_or(newest.ingested_at),
        None => newest.ingested_at,
    };

    let window_secs = window_secs.max(1);
    let start = anchor - Duration::seconds(window_secs);
    let count = records
        .iter()
        .filter(|r| r.effective_time() > start)
        .count();

    count as f64 * 60.0 / window_secs as f64
}
