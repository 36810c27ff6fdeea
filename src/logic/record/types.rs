//! Record Types
//!
//! Core types for classification records.
//! No merge logic here - only data structures and risk buckets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Normalized risk bucket
///
/// Backends report risk as free text in several locales ("High", "Élevé",
/// "Modéré", "faible", ...). Every comparison in the crate works on this
/// closed set, never on the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unknown => "unknown",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Fixed severity ordering used for sorting: high(3) > medium(2) > low(1) > unknown(0)
    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Unknown => 0,
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    /// Map an arbitrary risk string onto a bucket
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return RiskLevel::Unknown;
        }

        const HIGH: &[&str] = &["high", "élev", "elev", "haut", "crit"];
        const MEDIUM: &[&str] = &["med", "mod"];
        const LOW: &[&str] = &["low", "faible", "bas"];

        if HIGH.iter().any(|k| s.contains(k)) {
            RiskLevel::High
        } else if MEDIUM.iter().any(|k| s.contains(k)) {
            RiskLevel::Medium
        } else if LOW.iter().any(|k| s.contains(k)) {
            RiskLevel::Low
        } else {
            RiskLevel::Unknown
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Unknown
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Deduplication key of a record inside the store
///
/// Rendered as `<basis>#<seq>`, where the basis is `flow|millis` (or a
/// content fingerprint when the payload carries neither) and `seq` counts
/// repeated bases within one ingest batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordIdentity(String);

impl RecordIdentity {
    pub fn new(basis: &str, seq: u32) -> Self {
        Self(format!("{}#{}", basis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CLASSIFICATION RECORD
// ============================================================================

/// One observation of network-traffic classification
///
/// Created only by ingestion. Fields that the backend omitted or sent in an
/// unusable shape are `None` rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub identity: RecordIdentity,
    pub flow_id: Option<String>,
    /// Event time reported by the backend (millisecond precision)
    pub observed_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
    /// Classifier confidence in [0, 1]
    pub confidence: Option<f64>,
    pub risk: RiskLevel,
    /// Risk text as the backend sent it
    pub risk_raw: Option<String>,
    /// Strictly increasing local counter, assigned on first arrival
    pub arrival_rank: u64,
    /// Local wall-clock time of first arrival
    pub ingested_at: DateTime<Utc>,
}

impl ClassificationRecord {
    /// Confidence with the missing value treated as 0
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    /// Time used for rate windows: backend time, else local arrival time
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.observed_at.unwrap_or(self.ingested_at)
    }

    /// Risk text for display: raw value if present, bucket name otherwise
    pub fn risk_display(&self) -> &str {
        self.risk_raw.as_deref().unwrap_or_else(|| self.risk.as_str())
    }
}
