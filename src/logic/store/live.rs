//! Live Result Store
//!
//! Bounded, deduplicated working set of classification records.
//! Records are keyed by arrival rank (eviction order) with an identity index
//! on the side (dedup). Each ingest rebuilds an immutable `Snapshot` that
//! readers share through an `Arc`.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::stats;
use super::types::{Diagnostics, IngestMode, Snapshot, StoreSettings};
use crate::logic::record::{parse_payload, ClassificationRecord, ParsedPayload, RecordIdentity};

/// Per-batch merge outcome, logged at debug level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub replaced: usize,
    pub renewed: usize,
    pub evicted: usize,
    pub malformed: usize,
    pub stale: usize,
}

pub struct LiveResultStore {
    settings: StoreSettings,
    clock: Arc<dyn Clock>,
    /// arrival_rank -> record
    by_rank: BTreeMap<u64, ClassificationRecord>,
    /// identity -> arrival_rank
    index: HashMap<RecordIdentity, u64>,
    /// Recently evicted identities, oldest first
    tombstones: VecDeque<RecordIdentity>,
    tombstone_set: HashSet<RecordIdentity>,
    /// Last rank assigned (0 = none yet)
    high_water: u64,
    snapshot: Arc<Snapshot>,
    diagnostics: Diagnostics,
    last_report: IngestReport,
}

impl LiveResultStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: StoreSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            by_rank: BTreeMap::new(),
            index: HashMap::new(),
            tombstones: VecDeque::new(),
            tombstone_set: HashSet::new(),
            high_water: 0,
            snapshot: Arc::new(Snapshot::empty(settings.fresh_window)),
            diagnostics: Diagnostics::default(),
            last_report: IngestReport::default(),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Merge a batch of raw payloads, keeping prior ranks of known identities
    pub fn ingest(&mut self, events: &[Value]) -> Arc<Snapshot> {
        self.ingest_with(events, IngestMode::Merge)
    }

    /// Merge a batch of raw payloads
    pub fn ingest_with(&mut self, events: &[Value], mode: IngestMode) -> Arc<Snapshot> {
        let now = self.clock.now();
        let mut report = IngestReport::default();
        let mut seq_by_basis: HashMap<String, u32> = HashMap::new();

        for event in events {
            let parsed = match parse_payload(event) {
                Some(p) => p,
                None => {
                    report.malformed += 1;
                    continue;
                }
            };
            if parsed.is_degraded() {
                self.diagnostics.degraded_payloads += 1;
            }

            let seq = seq_by_basis.entry(parsed.basis.clone()).or_insert(0);
            let identity = RecordIdentity::new(&parsed.basis, *seq);
            *seq += 1;

            match (self.index.get(&identity).copied(), mode) {
                (Some(rank), IngestMode::Merge) => {
                    if let Some(existing) = self.by_rank.get_mut(&rank) {
                        apply_content(existing, parsed);
                    }
                    report.replaced += 1;
                }
                (Some(rank), IngestMode::Renew) => {
                    self.by_rank.remove(&rank);
                    self.insert_new(identity, parsed, now);
                    report.renewed += 1;
                }
                (None, IngestMode::Merge) if self.tombstone_set.contains(&identity) => {
                    report.stale += 1;
                }
                (None, _) => {
                    self.forget_tombstone(&identity);
                    self.insert_new(identity, parsed, now);
                    report.inserted += 1;
                }
            }
        }

        report.evicted = self.evict_over_capacity();

        self.diagnostics.malformed_skipped += report.malformed as u64;
        self.diagnostics.stale_redeliveries += report.stale as u64;
        self.diagnostics.batches += 1;

        if report.malformed > 0 {
            log::warn!("Skipped {} malformed payload(s) in batch", report.malformed);
        }
        log::debug!(
            "Ingest batch: {} new, {} replaced, {} renewed, {} evicted, {} stale (retained {})",
            report.inserted,
            report.replaced,
            report.renewed,
            report.evicted,
            report.stale,
            self.by_rank.len()
        );

        self.last_report = report;
        self.rebuild_snapshot()
    }

    /// Drop every record and restart arrival ranks from zero
    pub fn clear(&mut self) -> Arc<Snapshot> {
        let dropped = self.by_rank.len();
        self.by_rank.clear();
        self.index.clear();
        self.tombstones.clear();
        self.tombstone_set.clear();
        self.high_water = 0;
        self.last_report = IngestReport::default();
        self.snapshot = Arc::new(Snapshot::empty(self.settings.fresh_window));
        log::info!("Live store cleared ({} records dropped)", dropped);
        Arc::clone(&self.snapshot)
    }

    /// Last computed state, no recomputation
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn last_report(&self) -> IngestReport {
        self.last_report
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn insert_new(&mut self, identity: RecordIdentity, parsed: ParsedPayload, now: chrono::DateTime<chrono::Utc>) {
        self.high_water += 1;
        let rank = self.high_water;
        let record = ClassificationRecord {
            identity: identity.clone(),
            flow_id: parsed.flow_id,
            observed_at: parsed.observed_at,
            label: parsed.label,
            confidence: parsed.confidence,
            risk: parsed.risk,
            risk_raw: parsed.risk_raw,
            arrival_rank: rank,
            ingested_at: now,
        };
        self.by_rank.insert(rank, record);
        self.index.insert(identity, rank);
    }

    /// Evict lowest ranks until at or under capacity
    fn evict_over_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.by_rank.len() > self.settings.capacity {
            let Some((_, record)) = self.by_rank.pop_first() else {
                break;
            };
            self.index.remove(&record.identity);
            if self.tombstone_set.insert(record.identity.clone()) {
                self.tombstones.push_back(record.identity);
            }
            evicted += 1;
        }
        // Never forget an identity this batch evicted itself
        self.trim_tombstones(self.settings.tombstone_limit().max(evicted));
        evicted
    }

    fn trim_tombstones(&mut self, keep: usize) {
        while self.tombstones.len() > keep {
            if let Some(old) = self.tombstones.pop_front() {
                self.tombstone_set.remove(&old);
            }
        }
    }

    fn forget_tombstone(&mut self, identity: &RecordIdentity) {
        if self.tombstone_set.remove(identity) {
            self.tombstones.retain(|t| t != identity);
        }
    }

    fn rebuild_snapshot(&mut self) -> Arc<Snapshot> {
        let records: Vec<ClassificationRecord> = self.by_rank.values().cloned().collect();
        let stats = stats::compute(&records, self.high_water, &self.settings);
        self.snapshot = Arc::new(Snapshot::new(
            records,
            stats,
            self.high_water,
            self.settings.fresh_window,
        ));
        Arc::clone(&self.snapshot)
    }
}

/// Replace record content in place; identity, rank and arrival time stay
fn apply_content(record: &mut ClassificationRecord, parsed: ParsedPayload) {
    record.flow_id = parsed.flow_id;
    record.observed_at = parsed.observed_at;
    record.label = parsed.label;
    record.confidence = parsed.confidence;
    record.risk = parsed.risk;
    record.risk_raw = parsed.risk_raw;
}
