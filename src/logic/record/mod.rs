//! Record Module
//!
//! Classification records and the normalization of raw backend payloads.
//!
//! ## Structure
//! - `types`: ClassificationRecord, RecordIdentity, RiskLevel
//! - `normalize`: payload -> typed fields (timestamps, confidence, risk synonyms)

pub mod types;
pub mod normalize;

pub use types::{ClassificationRecord, RecordIdentity, RiskLevel};
pub use normalize::{parse_payload, parse_observed_at, parse_confidence, ParsedPayload};
