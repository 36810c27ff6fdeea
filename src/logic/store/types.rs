//! Store Types
//!
//! Snapshot, aggregate stats, diagnostics and store settings.
//! Stats are always derived from a record set, never patched in place.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MonitorConfig;
use crate::logic::record::{ClassificationRecord, RiskLevel};

// ============================================================================
// SETTINGS
// ============================================================================

/// Tunables of the live store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    pub capacity: usize,
    pub threat_window: usize,
    pub fresh_window: u64,
    pub rate_window_secs: i64,
}

impl StoreSettings {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..Self::default()
        }
    }

    /// Evicted identities remembered across batches to keep re-delivery
    /// idempotent. A batch that evicts more keeps every identity it evicted.
    pub fn tombstone_limit(&self) -> usize {
        self.capacity.saturating_mul(4)
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for StoreSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            threat_window: config.threat_window.max(1),
            fresh_window: config.fresh_window,
            rate_window_secs: config.rate_window_secs.max(1),
        }
    }
}

/// How known identities are treated by `ingest_with`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Replace content, keep the arrival rank
    #[default]
    Merge,
    /// Treat re-observed identities as fresh arrivals (new rank)
    Renew,
}

// ============================================================================
// AGGREGATE STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Distinct arrivals since the last clear
    pub total_processed: u64,
    /// Records currently held
    pub retained: usize,
    /// Worst risk among the most recent arrivals
    pub threat_level: RiskLevel,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub unknown_risk_count: usize,
    pub high_risk_ratio: f64,
    pub events_per_minute: f64,
    /// Label -> count
    pub labels: BTreeMap<String, usize>,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self {
            total_processed: 0,
            retained: 0,
            threat_level: RiskLevel::Unknown,
            high_risk_count: 0,
            medium_risk_count: 0,
            low_risk_count: 0,
            unknown_risk_count: 0,
            high_risk_ratio: 0.0,
            events_per_minute: 0.0,
            labels: BTreeMap::new(),
        }
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Anomaly counters. Never surfaced as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Payloads that were not objects at all
    pub malformed_skipped: u64,
    /// Payloads ingested with at least one unknown field
    pub degraded_payloads: u64,
    /// Re-deliveries of already evicted records
    pub stale_redeliveries: u64,
    /// Classification events dropped because the inbox was full
    pub dropped_overflow: u64,
    /// Raw-packet events seen and ignored
    pub ignored_raw_packets: u64,
    /// Ingest batches applied
    pub batches: u64,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Immutable view of the store after the last ingest or clear
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Ordered by arrival rank, oldest first
    records: Vec<ClassificationRecord>,
    stats: AggregateStats,
    /// Last arrival rank assigned
    high_water: u64,
    #[serde(skip)]
    fresh_window: u64,
}

impl Snapshot {
    pub(crate) fn new(
        records: Vec<ClassificationRecord>,
        stats: AggregateStats,
        high_water: u64,
        fresh_window: u64,
    ) -> Self {
        Self {
            records,
            stats,
            high_water,
            fresh_window,
        }
    }

    pub fn empty(fresh_window: u64) -> Self {
        Self::new(Vec::new(), AggregateStats::default(), 0, fresh_window)
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Arrived within the last `fresh_window` ranks
    pub fn is_fresh(&self, record: &ClassificationRecord) -> bool {
        self.fresh_window > 0
            && record.arrival_rank > self.high_water.saturating_sub(self.fresh_window)
    }
}
