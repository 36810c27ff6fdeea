use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::logic::record::{ClassificationRecord, RecordIdentity, RiskLevel};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn record(
    rank: u64,
    flow: &str,
    label: &str,
    confidence: Option<f64>,
    risk: &str,
    observed: Option<i64>,
) -> ClassificationRecord {
    ClassificationRecord {
        identity: RecordIdentity::new(&format!("{}|{:?}", flow, observed), 0),
        flow_id: Some(flow.to_string()),
        observed_at: observed.map(at),
        label: Some(label.to_string()),
        confidence,
        risk: RiskLevel::normalize(risk),
        risk_raw: Some(risk.to_string()),
        arrival_rank: rank,
        ingested_at: at(10_000 + rank as i64),
    }
}

fn config(sort_key: SortKey, sort_direction: SortDirection) -> ViewConfig {
    ViewConfig {
        sort_key,
        sort_direction,
        ..ViewConfig::default()
    }
}

fn flows(rows: &[&ClassificationRecord]) -> Vec<String> {
    rows.iter().map(|r| r.flow_id.clone().unwrap()).collect()
}

#[test]
fn test_risk_filter_high_only() {
    let records = vec![
        record(1, "f1", "DDoS", Some(0.9), "High", Some(1)),
        record(2, "f2", "BENIGN", Some(0.8), "Low", Some(2)),
    ];
    let view = ViewConfig {
        risk_filter: RiskFilter::High,
        ..ViewConfig::default()
    };
    assert_eq!(flows(&project(&records, &view)), vec!["f1"]);
}

#[test]
fn test_risk_filter_uses_synonyms() {
    let records = vec![
        record(1, "f1", "DDoS", Some(0.9), "Élevé", Some(1)),
        record(2, "f2", "PortScan", Some(0.7), "Modéré", Some(2)),
        record(3, "f3", "BENIGN", Some(0.99), "Faible", Some(3)),
    ];
    let medium = ViewConfig {
        risk_filter: RiskFilter::Medium,
        ..ViewConfig::default()
    };
    assert_eq!(flows(&project(&records, &medium)), vec!["f2"]);
}

#[test]
fn test_confidence_desc_missing_is_zero() {
    let records = vec![
        record(1, "a", "x", Some(0.9), "low", Some(1)),
        record(2, "b", "x", None, "low", Some(2)),
        record(3, "c", "x", Some(0.5), "low", Some(3)),
    ];
    let rows = project(&records, &config(SortKey::Confidence, SortDirection::Descending));
    let confidences: Vec<Option<f64>> = rows.iter().map(|r| r.confidence).collect();
    assert_eq!(confidences, vec![Some(0.9), Some(0.5), None]);
}

#[test]
fn test_search_matches_flow_or_label_case_insensitive() {
    let records = vec![
        record(1, "10.0.0.1-443", "DDoS", Some(0.9), "high", Some(1)),
        record(2, "10.0.0.2-80", "BENIGN", Some(0.9), "low", Some(2)),
        record(3, "ddos-lab", "Bot", Some(0.9), "high", Some(3)),
    ];
    let view = ViewConfig {
        search_term: "  DDOS ".to_string(),
        ..ViewConfig::default()
    };
    assert_eq!(flows(&project(&records, &view)), vec!["ddos-lab", "10.0.0.1-443"]);
}

#[test]
fn test_time_sort_unknown_is_oldest() {
    let records = vec![
        record(1, "known-old", "x", None, "low", Some(10)),
        record(2, "unknown-a", "x", None, "low", None),
        record(3, "known-new", "x", None, "low", Some(20)),
        record(4, "unknown-b", "x", None, "low", None),
    ];

    let desc = project(&records, &config(SortKey::Time, SortDirection::Descending));
    assert_eq!(flows(&desc), vec!["known-new", "known-old", "unknown-b", "unknown-a"]);

    let asc = project(&records, &config(SortKey::Time, SortDirection::Ascending));
    assert_eq!(flows(&asc), vec!["unknown-b", "unknown-a", "known-old", "known-new"]);
}

#[test]
fn test_risk_sort_severity_and_tie_break() {
    let records = vec![
        record(1, "low", "x", None, "Faible", Some(1)),
        record(2, "high-1", "x", None, "High", Some(2)),
        record(3, "odd", "x", None, "???", Some(3)),
        record(4, "high-2", "x", None, "haut", Some(4)),
        record(5, "med", "x", None, "Moderate", Some(5)),
    ];
    let rows = project(&records, &config(SortKey::Risk, SortDirection::Descending));
    assert_eq!(flows(&rows), vec!["high-2", "high-1", "med", "low", "odd"]);
}

#[test]
fn test_truncates_without_touching_input() {
    let records: Vec<_> = (1..=30)
        .map(|i| record(i, &format!("f{}", i), "x", Some(0.5), "low", Some(i as i64)))
        .collect();
    let view = ViewConfig::default().with_max_visible(10);
    let rows = project(&records, &view);

    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].flow_id.as_deref(), Some("f30"));
    assert_eq!(records.len(), 30);
}

#[test]
fn test_projection_is_deterministic() {
    let records = vec![
        record(1, "a", "x", Some(0.5), "low", Some(1)),
        record(2, "b", "x", Some(0.5), "low", Some(1)),
        record(3, "c", "x", Some(0.5), "low", None),
        record(4, "d", "x", Some(0.5), "low", None),
    ];
    for key in [SortKey::Time, SortKey::Confidence, SortKey::Risk] {
        for dir in [SortDirection::Ascending, SortDirection::Descending] {
            let view = config(key, dir);
            assert_eq!(project(&records, &view), project(&records, &view));
        }
    }
    // full tie -> most recent arrival first
    let rows = project(&records, &config(SortKey::Confidence, SortDirection::Ascending));
    assert_eq!(flows(&rows), vec!["d", "c", "b", "a"]);
}

#[test]
fn test_export_current_view_columns() {
    let records = vec![
        record(7, "f,7", "DDoS", Some(0.934), "High", Some(1)),
        record(8, "f8", "BENIGN", None, "Low", Some(2)),
    ];
    let rows: Vec<ProjectedRow> = project(&records, &config(SortKey::Time, SortDirection::Ascending))
        .into_iter()
        .map(|r| ProjectedRow {
            record: r.clone(),
            fresh: false,
        })
        .collect();

    let csv = render_csv(&rows);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,flow_id,prediction,confidence,risk");
    assert_eq!(lines[1], "7,\"f,7\",DDoS,93.4%,High");
    assert_eq!(lines[2], "8,f8,BENIGN,-,Low");
}
