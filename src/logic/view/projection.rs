//! View Projection Engine
//!
//! Pure function of (records, config): filter by risk bucket, filter by
//! search term, sort, truncate. Ties always break on arrival rank
//! (most recent first) so an unchanged input never reorders rows.

use std::cmp::Ordering;

use serde::Serialize;

use super::types::{SortDirection, SortKey, ViewConfig};
use crate::logic::record::ClassificationRecord;
use crate::logic::store::Snapshot;

/// One visible table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRow {
    #[serde(flatten)]
    pub record: ClassificationRecord,
    /// Arrived within the recent highlight window
    pub fresh: bool,
}

/// Visible slice plus the counts shown under the table
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Projection {
    pub rows: Vec<ProjectedRow>,
    /// Rows passing the filters before truncation
    pub matched: usize,
    /// Records held by the store
    pub retained: usize,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered, filtered, capped view of `records`
pub fn project<'a>(
    records: &'a [ClassificationRecord],
    config: &ViewConfig,
) -> Vec<&'a ClassificationRecord> {
    let mut visible = filter(records, config);
    sort(&mut visible, config.sort_key, config.sort_direction);
    visible.truncate(config.max_visible);
    visible
}

/// Project a snapshot, tagging fresh rows and keeping footer counts
pub fn project_snapshot(snapshot: &Snapshot, config: &ViewConfig) -> Projection {
    let mut visible = filter(snapshot.records(), config);
    let matched = visible.len();
    sort(&mut visible, config.sort_key, config.sort_direction);
    visible.truncate(config.max_visible);

    Projection {
        rows: visible
            .into_iter()
            .map(|record| ProjectedRow {
                fresh: snapshot.is_fresh(record),
                record: record.clone(),
            })
            .collect(),
        matched,
        retained: snapshot.len(),
    }
}

fn filter<'a>(records: &'a [ClassificationRecord], config: &ViewConfig) -> Vec<&'a ClassificationRecord> {
    let term = config.search_term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| config.risk_filter.admits(r.risk))
        .filter(|r| term.is_empty() || matches_term(r, &term))
        .collect()
}

/// Case-insensitive substring over flow id or label
fn matches_term(record: &ClassificationRecord, term: &str) -> bool {
    let hit = |field: &Option<String>| {
        field
            .as_deref()
            .map(|s| s.to_lowercase().contains(term))
            .unwrap_or(false)
    };
    hit(&record.flow_id) || hit(&record.label)
}

fn sort(records: &mut [&ClassificationRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let primary = compare_by(a, b, key);
        let primary = match direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| b.arrival_rank.cmp(&a.arrival_rank))
    });
}

/// Ascending comparison on the sort key
fn compare_by(a: &ClassificationRecord, b: &ClassificationRecord, key: SortKey) -> Ordering {
    match key {
        // Unknown time orders before any known time
        SortKey::Time => a.observed_at.cmp(&b.observed_at),
        SortKey::Confidence => a.confidence_or_zero().total_cmp(&b.confidence_or_zero()),
        SortKey::Risk => a.risk.severity_level().cmp(&b.risk.severity_level()),
    }
}
