//! View Types
//!
//! ViewConfig and its parts. Parsing is lenient: an unrecognized value
//! falls back to a default instead of failing the render.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_MAX_VISIBLE, MAX_VISIBLE_LIMIT};
use crate::logic::record::RiskLevel;

// ============================================================================
// RISK FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl RiskFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" | "" => Some(RiskFilter::All),
            "high" => Some(RiskFilter::High),
            "medium" => Some(RiskFilter::Medium),
            "low" => Some(RiskFilter::Low),
            _ => None,
        }
    }

    pub fn admits(&self, risk: RiskLevel) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::High => risk == RiskLevel::High,
            RiskFilter::Medium => risk == RiskLevel::Medium,
            RiskFilter::Low => risk == RiskLevel::Low,
        }
    }
}

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Time,
    Confidence,
    Risk,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "time" | "timestamp" => Some(SortKey::Time),
            "confidence" => Some(SortKey::Confidence),
            "risk" => Some(SortKey::Risk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

// ============================================================================
// VIEW CONFIG
// ============================================================================

/// What the table shows. Passed by value into every projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawViewConfig")]
pub struct ViewConfig {
    pub risk_filter: RiskFilter,
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub max_visible: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            risk_filter: RiskFilter::All,
            search_term: String::new(),
            sort_key: SortKey::Time,
            sort_direction: SortDirection::Descending,
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl ViewConfig {
    /// Build from loosely-typed UI values, falling back per field
    pub fn from_params(
        risk_filter: &str,
        search_term: &str,
        sort_key: &str,
        sort_direction: &str,
        max_visible: usize,
    ) -> Self {
        RawViewConfig {
            risk_filter: Some(risk_filter.to_string()),
            search_term: Some(search_term.to_string()),
            sort_key: Some(sort_key.to_string()),
            sort_direction: Some(sort_direction.to_string()),
            max_visible: Some(Value::from(max_visible)),
        }
        .into()
    }

    /// Column header click: same key flips direction, a new key starts descending
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Descending;
        }
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = clamp_visible(max_visible).unwrap_or(self.max_visible);
        self
    }
}

fn clamp_visible(n: usize) -> Option<usize> {
    if n == 0 {
        None
    } else {
        Some(n.min(MAX_VISIBLE_LIMIT))
    }
}

/// Wire shape accepted from the presentation layer (snake or camel case)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawViewConfig {
    #[serde(default, alias = "riskFilter")]
    pub risk_filter: Option<String>,
    #[serde(default, alias = "searchTerm")]
    pub search_term: Option<String>,
    #[serde(default, alias = "sortKey")]
    pub sort_key: Option<String>,
    #[serde(default, alias = "sortDirection")]
    pub sort_direction: Option<String>,
    #[serde(default, alias = "maxVisible")]
    pub max_visible: Option<Value>,
}

impl From<RawViewConfig> for ViewConfig {
    fn from(raw: RawViewConfig) -> Self {
        let defaults = ViewConfig::default();

        let risk_filter = raw
            .risk_filter
            .as_deref()
            .and_then(RiskFilter::parse)
            .unwrap_or(defaults.risk_filter);

        // Unknown sort key resets the whole ordering to the default
        let (sort_key, sort_direction) = match raw.sort_key.as_deref().map(SortKey::parse) {
            Some(None) => (defaults.sort_key, defaults.sort_direction),
            parsed => (
                parsed.flatten().unwrap_or(defaults.sort_key),
                raw.sort_direction
                    .as_deref()
                    .and_then(SortDirection::parse)
                    .unwrap_or(defaults.sort_direction),
            ),
        };

        let max_visible = raw
            .max_visible
            .as_ref()
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            })
            .and_then(|n| clamp_visible(usize::try_from(n).unwrap_or(usize::MAX)))
            .unwrap_or(defaults.max_visible);

        Self {
            risk_filter,
            search_term: raw.search_term.unwrap_or_default(),
            sort_key,
            sort_direction,
            max_visible,
        }
    }
}
