//! Live Monitor
//!
//! Owns the live store, the current view config and the cached projection,
//! and is handed its event channel at construction. Channel handlers only
//! enqueue into a bounded inbox; `pump()` drains the inbox into one ingest
//! batch, so the store is only ever mutated from the monitor's owner.
//! A full inbox drops its oldest payload, never the newest.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::error::ExportError;
use crate::logic::channel::{events, EventChannel, EventHandler, Subscription};
use crate::logic::store::{Clock, Diagnostics, IngestMode, LiveResultStore, Snapshot, StoreSettings, SystemClock};
use crate::logic::view::{self, Projection, ViewConfig};

// ============================================================================
// INBOX
// ============================================================================

/// Bounded queue between channel handlers and `pump()`
#[derive(Debug)]
struct Inbox {
    queue: Mutex<VecDeque<Value>>,
    limit: usize,
    dropped_overflow: AtomicU64,
    ignored_raw_packets: AtomicU64,
}

impl Inbox {
    fn new(limit: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
            dropped_overflow: AtomicU64::new(0),
            ignored_raw_packets: AtomicU64::new(0),
        }
    }

    /// Enqueue, dropping the oldest queued payloads when full
    fn push(&self, payload: Value) {
        let mut dropped = 0u64;
        {
            let mut queue = self.queue.lock();
            queue.push_back(payload);
            while queue.len() > self.limit {
                queue.pop_front();
                dropped += 1;
            }
        }

        if dropped > 0 {
            let total = self.dropped_overflow.fetch_add(dropped, Ordering::Relaxed) + dropped;
            if total == dropped || total % 100 == 0 {
                log::warn!("Inbox full, {} oldest classification event(s) dropped so far", total);
            }
        }
    }

    fn drain(&self) -> Vec<Value> {
        self.queue.lock().drain(..).collect()
    }
}

pub struct LiveMonitor {
    session_id: String,
    config: MonitorConfig,
    channel: Arc<dyn EventChannel>,
    subscriptions: Vec<Subscription>,
    inbox: Arc<Inbox>,
    store: LiveResultStore,
    view: ViewConfig,
    projection: Projection,
}

impl LiveMonitor {
    pub fn new(channel: Arc<dyn EventChannel>, config: MonitorConfig) -> Self {
        Self::with_clock(channel, config, Arc::new(SystemClock))
    }

    pub fn with_clock(channel: Arc<dyn EventChannel>, config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        let inbox = Arc::new(Inbox::new(config.pending_limit));
        let store = LiveResultStore::with_clock(StoreSettings::from(&config), clock);
        let view = ViewConfig::default().with_max_visible(config.max_visible);

        Self {
            session_id: Uuid::new_v4().to_string(),
            config,
            channel,
            subscriptions: Vec::new(),
            inbox,
            store,
            view,
            projection: Projection::default(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // ========================================================================
    // CHANNEL LIFECYCLE
    // ========================================================================

    /// Subscribe to classification (queued) and raw-packet (counted) events
    pub fn attach(&mut self) {
        if self.is_attached() {
            return;
        }

        let inbox = Arc::clone(&self.inbox);
        let on_classification: EventHandler = Arc::new(move |payload: &Value| {
            inbox.push(payload.clone());
        });

        let inbox = Arc::clone(&self.inbox);
        let on_raw_packet: EventHandler = Arc::new(move |_: &Value| {
            inbox.ignored_raw_packets.fetch_add(1, Ordering::Relaxed);
        });

        self.subscriptions
            .push(self.channel.subscribe(events::CLASSIFICATION, on_classification));
        self.subscriptions
            .push(self.channel.subscribe(events::RAW_PACKET, on_raw_packet));

        log::info!(
            "Live monitor {} attached (channel connected: {})",
            self.session_id,
            self.channel.is_connected()
        );
    }

    /// Revoke all subscriptions; stored records are kept
    pub fn detach(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
        log::info!("Live monitor {} detached", self.session_id);
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    // ========================================================================
    // INGESTION
    // ========================================================================

    /// Drain queued classification events into one ingest batch.
    /// Returns the number of events drained.
    ///
    /// Identity sequence numbers count repeats of the same (flow, time)
    /// within one batch. A duplicate that lands in the same pump as its
    /// original is kept as a second record; one that lands in a later pump
    /// replaces the original. Callers needing strict dedup should pump
    /// once per delivered batch.
    pub fn pump(&mut self) -> usize {
        let batch = self.inbox.drain();
        if batch.is_empty() {
            return 0;
        }
        self.ingest_with(&batch, IngestMode::Merge);
        batch.len()
    }

    /// Ingest payloads directly (bypassing the channel)
    pub fn ingest(&mut self, events: &[Value]) -> Arc<Snapshot> {
        self.ingest_with(events, IngestMode::Merge)
    }

    pub fn ingest_with(&mut self, events: &[Value], mode: IngestMode) -> Arc<Snapshot> {
        let snapshot = self.store.ingest_with(events, mode);
        self.reproject();
        snapshot
    }

    // ========================================================================
    // PRESENTATION API
    // ========================================================================

    pub fn get_snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    pub fn set_view_config(&mut self, config: ViewConfig) {
        self.view = config;
        self.reproject();
    }

    pub fn view_config(&self) -> &ViewConfig {
        &self.view
    }

    /// Projection for the last view config set
    pub fn get_projection(&self) -> &Projection {
        &self.projection
    }

    /// Drop all records and anything still queued
    pub fn clear(&mut self) {
        let discarded = self.inbox.drain().len();
        if discarded > 0 {
            log::debug!("Discarded {} queued event(s) on clear", discarded);
        }
        self.store.clear();
        self.reproject();
    }

    /// CSV of the current projection (not the whole store)
    pub fn export_current_view(&self) -> String {
        view::render_csv(&self.projection.rows)
    }

    /// Write the current view to `<dir>/traffic_<session>_<stamp>.csv`
    pub fn export_to_file(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let filename = format!(
            "traffic_{}_{}.csv",
            &self.session_id[..8],
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        view::write_csv_file(&self.projection.rows, &path)?;
        Ok(path)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            dropped_overflow: self.inbox.dropped_overflow.load(Ordering::Relaxed),
            ignored_raw_packets: self.inbox.ignored_raw_packets.load(Ordering::Relaxed),
            ..self.store.diagnostics().clone()
        }
    }

    fn reproject(&mut self) {
        let snapshot = self.store.snapshot();
        self.projection = view::project_snapshot(&snapshot, &self.view);
    }
}

impl Drop for LiveMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}
