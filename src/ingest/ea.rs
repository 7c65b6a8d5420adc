//! Environment Agency flood-monitoring API client.
//!
//! Handles the single blocking GET against a measure resource and the
//! structural parsing of its JSON body:
//!   https://environment.data.gov.uk/flood-monitoring/id/measures/{id}
//!
//! See `fixtures.rs` for annotated examples of the response structure.

use crate::cache::MeasureSource;
use crate::model::{DEFAULT_LABEL, FetchError, MEASURE_URL, Reading};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Serde structures for the measure envelope
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MeasureResponse {
    items: Option<Items>,
}

/// `/id/measures/{id}` returns one object; list queries return an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Items {
    Many(Vec<MeasureItem>),
    One(MeasureItem),
}

#[derive(Deserialize)]
struct MeasureItem {
    label: Option<Label>,
    #[serde(rename = "latestReading")]
    latest_reading: Option<LatestReadingField>,
}

/// Station labels are usually a string but some stations carry several.
#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    List(Vec<String>),
}

/// When a measure has no current reading the API puts a bare URI here.
#[derive(Deserialize)]
#[serde(untagged)]
enum LatestReadingField {
    Reading(LatestReading),
    Link(String),
}

#[derive(Deserialize)]
struct LatestReading {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    value: Option<FlowValue>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlowValue {
    Number(f64),
    Text(String),
}

impl Items {
    /// The measure item: the object itself, or the first array element.
    /// Later elements belong to other measures and are never consulted.
    fn first(&self) -> Option<&MeasureItem> {
        match self {
            Items::One(item) => Some(item),
            Items::Many(items) => {
                debug!(count = items.len(), "measure payload uses array-shaped items");
                items.first()
            }
        }
    }
}

impl MeasureItem {
    fn latest(&self) -> Option<&LatestReading> {
        match &self.latest_reading {
            Some(LatestReadingField::Reading(reading)) => Some(reading),
            Some(LatestReadingField::Link(uri)) => {
                debug!(%uri, "latestReading is a link, not a reading");
                None
            }
            None => None,
        }
    }

    fn label(&self) -> String {
        let text = match &self.label {
            Some(Label::Text(text)) => Some(text.as_str()),
            Some(Label::List(labels)) => labels
                .iter()
                .map(|l| l.as_str())
                .find(|l| !l.trim().is_empty()),
            None => None,
        };

        text.map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LABEL)
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn invalid(msg: &str) -> FetchError {
    FetchError::InvalidStructure(msg.to_string())
}

/// Parses a measure response body into the most recent `Reading`.
///
/// # Errors
/// - `FetchError::Parse` — the body is not JSON at all.
/// - `FetchError::InvalidStructure` — JSON without a usable
///   `items → latestReading` carrying `dateTime` and a finite,
///   non-negative `value`.
pub fn parse_latest_reading(json: &str) -> Result<Reading, FetchError> {
    let raw: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))?;

    let response: MeasureResponse = serde_json::from_value(raw)
        .map_err(|e| FetchError::InvalidStructure(e.to_string()))?;

    let items = response.items.ok_or_else(|| invalid("missing items"))?;

    let item = items.first().ok_or_else(|| invalid("items array is empty"))?;
    let latest = item
        .latest()
        .ok_or_else(|| invalid("first item has no latestReading object"))?;

    let date_time = latest
        .date_time
        .as_deref()
        .ok_or_else(|| invalid("latestReading has no dateTime"))?;

    let timestamp = DateTime::parse_from_rfc3339(date_time)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            FetchError::InvalidStructure(format!("bad dateTime '{}': {}", date_time, e))
        })?;

    let value = match latest.value.as_ref() {
        Some(FlowValue::Number(n)) => *n,
        Some(FlowValue::Text(text)) => text.trim().parse::<f64>().map_err(|e| {
            FetchError::InvalidStructure(format!("non-numeric value '{}': {}", text, e))
        })?,
        None => return Err(invalid("latestReading has no value")),
    };

    if !value.is_finite() || value < 0.0 {
        return Err(FetchError::InvalidStructure(format!(
            "flow value out of range: {}",
            value
        )));
    }

    Ok(Reading {
        label: item.label(),
        timestamp,
        value,
    })
}

// ---------------------------------------------------------------------------
// HTTP fetch
// ---------------------------------------------------------------------------

/// Blocking HTTP source for one measure URL with a single request timeout.
pub struct HttpMeasureSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpMeasureSource {
    /// Source for the Reading flow measure.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_url(MEASURE_URL, timeout)
    }

    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl MeasureSource for HttpMeasureSource {
    fn fetch(&self) -> Result<String, FetchError> {
        fetch_measure_body(&self.client, &self.url)
    }
}

/// Performs one GET and returns the raw body. No retries.
pub fn fetch_measure_body(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<String, FetchError> {
    debug!(%url, "requesting measure");

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(map_request_error)?;

    let status = response.status();
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "measure request rejected");
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    response.text().map_err(map_request_error)
}

fn map_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
