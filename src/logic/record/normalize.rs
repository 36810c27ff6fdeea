//! Payload Normalization
//!
//! Turns a raw backend payload (JSON object) into typed fields.
//! Nothing here rejects a record-shaped payload: unusable fields degrade
//! to `None` and are counted so the operator can see backend issues.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::types::RiskLevel;

// ============================================================================
// KEYS
// ============================================================================

const FLOW_KEYS: &[&str] = &["flow_id", "flow"];
const TIME_KEYS: &[&str] = &["timestamp", "ts"];
const LABEL_KEYS: &[&str] = &["prediction", "label"];
const CONFIDENCE_KEY: &str = "confidence";
const RISK_KEY: &str = "risk";

/// Backend envelope key (`{"prediction": {...}}`)
const ENVELOPE_KEY: &str = "prediction";

/// Naive formats emitted by the backend (`datetime.isoformat()`), read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

// ============================================================================
// PARSED PAYLOAD
// ============================================================================

/// Typed view of one payload, before identity and rank are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub flow_id: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
    pub confidence: Option<f64>,
    pub risk: RiskLevel,
    pub risk_raw: Option<String>,
    /// Identity basis without the batch sequence number
    pub basis: String,
    /// Number of fields that had to fall back to "unknown"
    pub degraded_fields: u32,
}

impl ParsedPayload {
    pub fn is_degraded(&self) -> bool {
        self.degraded_fields > 0
    }
}

/// Parse a raw payload. Returns `None` when it is not an object at all.
pub fn parse_payload(value: &Value) -> Option<ParsedPayload> {
    let obj = unwrap_envelope(value.as_object()?);
    let mut degraded = 0u32;

    let flow_id = first_present(obj, FLOW_KEYS).and_then(scalar_text);
    if flow_id.is_none() {
        degraded += 1;
    }

    let raw_time = first_present(obj, TIME_KEYS);
    let observed_at = raw_time.and_then(parse_observed_at);
    if observed_at.is_none() {
        degraded += 1;
    }

    let label = first_present(obj, LABEL_KEYS).and_then(scalar_text);
    if label.is_none() {
        degraded += 1;
    }

    let (confidence, confidence_ok) = match obj.get(CONFIDENCE_KEY) {
        None | Some(Value::Null) => (None, true),
        Some(v) => parse_confidence(v),
    };
    if !confidence_ok {
        degraded += 1;
    }

    let risk_raw = obj.get(RISK_KEY).and_then(scalar_text);
    let risk = risk_raw
        .as_deref()
        .map(RiskLevel::normalize)
        .unwrap_or_default();

    let basis = identity_basis(flow_id.as_deref(), observed_at, raw_time, obj);

    Some(ParsedPayload {
        flow_id,
        observed_at,
        label,
        confidence,
        risk,
        risk_raw,
        basis,
        degraded_fields: degraded,
    })
}

/// `{"prediction": {...}}` -> inner object; anything else is left as is
fn unwrap_envelope(obj: &Map<String, Value>) -> &Map<String, Value> {
    match obj.get(ENVELOPE_KEY) {
        Some(Value::Object(inner)) => inner,
        _ => obj,
    }
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Strings, numbers and booleans as trimmed text; empty means absent
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse an event timestamp.
///
/// Numbers are Unix epoch milliseconds. Strings are RFC 3339 or a naive
/// ISO-8601 date-time (assumed UTC). Everything else is unknown time.
pub fn parse_observed_at(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = match n.as_i64() {
                Some(ms) => ms,
                None => {
                    let f = n.as_f64()?;
                    if !f.is_finite() || f.abs() > i64::MAX as f64 {
                        return None;
                    }
                    f.round() as i64
                }
            };
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(s) => parse_time_text(s.trim()),
        _ => None,
    }
}

fn parse_time_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a confidence value. Returns the value and whether it was usable
/// without correction.
pub fn parse_confidence(value: &Value) -> (Option<f64>, bool) {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => (Some(c), true),
        Some(c) if c.is_finite() => (Some(c.clamp(0.0, 1.0)), false),
        _ => (None, false),
    }
}

// ============================================================================
// IDENTITY BASIS
// ============================================================================

/// Flow id + observation time; a content fingerprint when both are missing
fn identity_basis(
    flow_id: Option<&str>,
    observed_at: Option<DateTime<Utc>>,
    raw_time: Option<&Value>,
    obj: &Map<String, Value>,
) -> String {
    let time_part = match (observed_at, raw_time) {
        (Some(ts), _) => Some(ts.timestamp_millis().to_string()),
        (None, Some(raw)) => scalar_text(raw),
        (None, None) => None,
    };

    match (flow_id, time_part) {
        (None, None) => format!("~{}", fingerprint(obj)),
        (flow, time) => format!(
            "{}|{}",
            flow.unwrap_or("-"),
            time.as_deref().unwrap_or("-")
        ),
    }
}

/// Short SHA-256 of the canonical JSON text of the payload
fn fingerprint(obj: &Map<String, Value>) -> String {
    // serde_json::Map is ordered by key without `preserve_order`, so the text is canonical
    let text = serde_json::to_string(obj).unwrap_or_default();
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..8])
}
