//! Core data types for the rowing conditions service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no I/O, only types, constants and the error enum.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Upstream constants
// ---------------------------------------------------------------------------

/// Environment Agency flood-monitoring measure for the Thames at Reading,
/// 15-minute mean flow in m³/s.
pub const MEASURE_URL: &str =
    "https://environment.data.gov.uk/flood-monitoring/id/measures/2200TH-flow--Mean-15_min-m3_s";

/// Label used when the measure payload carries no usable `label`.
pub const DEFAULT_LABEL: &str = "River Flow";

/// Upper bound on a single upstream request. No retries follow a timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Accepted range for a configured upstream timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 10;

/// How long a fetched reading may be served from cache (15 minutes).
pub fn cache_ttl() -> Duration {
    Duration::milliseconds(900_000)
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single flow measurement from the upstream measure.
///
/// `value` is in cubic metres per second and is always finite and
/// non-negative; the parser rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Safety tiers, in ascending order of restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AdvisoryTier {
    Normal,
    HighFlow,
    VeryHighFlow,
    NoRowing,
}

/// Classifier output: the tier plus the sentence to speak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub tier: AdvisoryTier,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding the current reading.
///
/// Network-side failures (`Timeout`, `Network`, `HttpStatus`) and parse-side
/// failures (`Parse`, `InvalidStructure`) share one type so callers only
/// handle a single error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The upstream did not answer within the configured timeout.
    #[error("timeout")]
    Timeout,
    /// Connection, TLS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx HTTP response from the upstream API.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// The response body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),
    /// Valid JSON, but `items → latestReading` is missing or unusable.
    #[error("invalid response structure: {0}")]
    InvalidStructure(String),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout | FetchError::Network(_) | FetchError::HttpStatus(_)
        )
    }

    pub fn is_parse(&self) -> bool {
        !self.is_network()
    }
}
