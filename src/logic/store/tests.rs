use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use super::*;
use crate::logic::record::RiskLevel;

fn store(capacity: usize) -> LiveResultStore {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    LiveResultStore::with_clock(StoreSettings::with_capacity(capacity), clock)
}

fn flow(id: &str, ts: i64, risk: &str) -> Value {
    json!({ "flow": id, "ts": ts, "risk": risk })
}

fn ranks(snapshot: &Snapshot) -> Vec<u64> {
    snapshot.records().iter().map(|r| r.arrival_rank).collect()
}

#[test]
fn test_two_events_counted() {
    let mut store = store(10);
    let snap = store.ingest(&[flow("f1", 100, "high"), flow("f2", 200, "low")]);

    assert_eq!(snap.len(), 2);
    assert_eq!(snap.stats().high_risk_count, 1);
    assert_eq!(snap.stats().low_risk_count, 1);
    assert_eq!(snap.stats().threat_level, RiskLevel::High);
}

#[test]
fn test_redelivery_keeps_ranks() {
    let mut store = store(10);
    let batch = [flow("f1", 100, "high"), flow("f2", 200, "low")];

    let first = store.ingest(&batch);
    let second = store.ingest(&batch);

    assert_eq!(second.len(), 2);
    assert_eq!(ranks(&first), vec![1, 2]);
    assert_eq!(ranks(&second), vec![1, 2]);
    assert_eq!(*first, *second);
    assert_eq!(store.last_report().replaced, 2);
    assert_eq!(store.last_report().inserted, 0);
}

#[test]
fn test_capacity_evicts_oldest_arrival() {
    let mut store = store(2);
    store.ingest(&[flow("a", 1, "low")]);
    store.ingest(&[flow("b", 2, "low")]);
    let snap = store.ingest(&[flow("c", 3, "low")]);

    let flows: Vec<_> = snap.records().iter().map(|r| r.flow_id.clone().unwrap()).collect();
    assert_eq!(flows, vec!["b", "c"]);
    assert_eq!(ranks(&snap), vec![2, 3]);
    assert_eq!(store.last_report().evicted, 1);
}

#[test]
fn test_capacity_bound_holds_for_every_batch() {
    let mut store = store(5);
    for batch in 0..20 {
        let events: Vec<Value> = (0..(batch % 7))
            .map(|i| flow(&format!("f{}-{}", batch, i), batch * 10 + i, "medium"))
            .collect();
        let snap = store.ingest(&events);
        assert!(snap.len() <= 5);
    }
}

#[test]
fn test_eviction_removes_lowest_ranks() {
    let mut store = store(3);
    store.ingest(&[flow("a", 1, "low"), flow("b", 2, "low"), flow("c", 3, "low")]);
    let before = ranks(&store.snapshot());

    let snap = store.ingest(&[flow("d", 4, "low"), flow("e", 5, "low")]);
    let after = ranks(&snap);

    let removed: Vec<u64> = before.iter().copied().filter(|r| !after.contains(r)).collect();
    assert_eq!(removed, vec![1, 2]);
    assert_eq!(after, vec![3, 4, 5]);
}

#[test]
fn test_oversized_batch_is_idempotent() {
    let mut store = store(2);
    let batch = [flow("a", 1, "low"), flow("b", 2, "high"), flow("c", 3, "low")];

    let first = store.ingest(&batch);
    let second = store.ingest(&batch);

    assert_eq!(*first, *second);
    assert_eq!(store.last_report().stale, 1);
    assert_eq!(store.diagnostics().stale_redeliveries, 1);
}

#[test]
fn test_batches_past_tombstone_limit_are_idempotent() {
    let capacity = 2;
    let limit = StoreSettings::with_capacity(capacity).tombstone_limit();

    for size in [capacity + 1, limit, limit + capacity + 1, 10 * capacity, 30] {
        let mut store = store(capacity);
        let batch: Vec<Value> = (0..size)
            .map(|i| flow(&format!("f{}", i), i as i64, "low"))
            .collect();

        let first = store.ingest(&batch);
        let second = store.ingest(&batch);

        assert_eq!(*first, *second, "batch of {}", size);
        assert_eq!(first.high_water(), size as u64);
        assert_eq!(store.last_report().stale, size - capacity, "batch of {}", size);
        assert_eq!(store.last_report().inserted, 0, "batch of {}", size);
    }
}

#[test]
fn test_idempotent_on_populated_store() {
    let mut store = store(50);
    store.ingest(&[flow("x", 10, "medium"), json!({ "prediction": "Bot" })]);

    let batch = [flow("y", 20, "high"), json!({ "risk": "Élevé" }), flow("x", 10, "low")];
    let once = store.ingest(&batch);
    let twice = store.ingest(&batch);

    assert_eq!(*once, *twice);
}

#[test]
fn test_replacement_updates_content_only() {
    let mut store = store(10);
    store.ingest(&[flow("f1", 100, "low"), flow("f2", 200, "low")]);
    let snap = store.ingest(&[flow("f1", 100, "high")]);

    let f1 = snap.records().iter().find(|r| r.flow_id.as_deref() == Some("f1")).unwrap();
    assert_eq!(f1.risk, RiskLevel::High);
    assert_eq!(f1.arrival_rank, 1);
    assert_eq!(snap.high_water(), 2);
    assert_eq!(snap.stats().total_processed, 2);
}

#[test]
fn test_same_flow_and_time_in_one_batch_are_distinct() {
    let mut store = store(10);
    let snap = store.ingest(&[flow("f1", 100, "low"), flow("f1", 100, "high")]);
    assert_eq!(snap.len(), 2);
    assert_ne!(snap.records()[0].identity, snap.records()[1].identity);
}

#[test]
fn test_renew_assigns_new_rank() {
    let mut store = store(10);
    store.ingest(&[flow("f1", 100, "low"), flow("f2", 200, "low")]);
    let snap = store.ingest_with(&[flow("f1", 100, "low")], IngestMode::Renew);

    assert_eq!(snap.len(), 2);
    let f1 = snap.records().iter().find(|r| r.flow_id.as_deref() == Some("f1")).unwrap();
    assert_eq!(f1.arrival_rank, 3);
    assert_eq!(ranks(&snap), vec![2, 3]);
}

#[test]
fn test_malformed_skipped_and_degraded_kept() {
    let mut store = store(10);
    let snap = store.ingest(&[
        json!("not an object"),
        json!(null),
        json!({ "timestamp": "yesterday", "risk": "purple" }),
    ]);

    assert_eq!(snap.len(), 1);
    let record = &snap.records()[0];
    assert!(record.flow_id.is_none());
    assert!(record.observed_at.is_none());
    assert_eq!(record.risk, RiskLevel::Unknown);
    assert_eq!(record.risk_raw.as_deref(), Some("purple"));
    assert_eq!(store.diagnostics().malformed_skipped, 2);
    assert_eq!(store.diagnostics().degraded_payloads, 1);
}

#[test]
fn test_clear_resets_ranks() {
    let mut store = store(10);
    store.ingest(&[flow("f1", 100, "high")]);
    let cleared = store.clear();
    assert!(cleared.is_empty());
    assert_eq!(cleared.stats().total_processed, 0);

    let snap = store.ingest(&[flow("f9", 900, "low")]);
    assert_eq!(ranks(&snap), vec![1]);
}

#[test]
fn test_snapshot_is_shared_not_recomputed() {
    let mut store = store(10);
    let ingested = store.ingest(&[flow("f1", 100, "high")]);
    let read = store.snapshot();
    assert!(Arc::ptr_eq(&ingested, &read));
}

#[test]
fn test_fresh_window_is_rank_based() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    let settings = StoreSettings {
        fresh_window: 2,
        ..StoreSettings::with_capacity(10)
    };
    let mut store = LiveResultStore::with_clock(settings, clock);
    let snap = store.ingest(&[flow("a", 1, "low"), flow("b", 2, "low"), flow("c", 3, "low")]);

    let fresh: Vec<bool> = snap.records().iter().map(|r| snap.is_fresh(r)).collect();
    assert_eq!(fresh, vec![false, true, true]);

    // re-observing "a" does not make it fresh again
    let snap = store.ingest(&[flow("a", 1, "high")]);
    assert!(!snap.is_fresh(&snap.records()[0]));
}

#[test]
fn test_events_per_minute_uses_arrival_clock_without_timestamps() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let mut store = LiveResultStore::with_clock(StoreSettings::with_capacity(10), clock.clone());

    store.ingest(&[json!({ "flow": "old" })]);
    clock.advance(Duration::seconds(90));
    let snap = store.ingest(&[json!({ "flow": "new-1" }), json!({ "flow": "new-2" })]);

    assert_eq!(snap.stats().events_per_minute, 2.0);
}

#[test]
fn test_events_per_minute_follows_reset_clock() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    let mut store = LiveResultStore::with_clock(StoreSettings::with_capacity(10), clock.clone());

    store.ingest(&[json!({ "flow": "a" }), json!({ "flow": "b" })]);
    clock.set(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap());
    let snap = store.ingest(&[json!({ "flow": "c" })]);

    assert_eq!(snap.stats().events_per_minute, 1.0);
    let newest = snap.records().last().unwrap();
    assert_eq!(newest.ingested_at, Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap());
}
