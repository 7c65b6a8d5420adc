//! End-to-end behaviour of the cache → classifier pipeline.
//!
//! The upstream and the clock are both injected, so these run offline and
//! can move time past the 15-minute cache lifetime instantly.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rowcheck_service::cache::ReadingCache;
use rowcheck_service::model::{AdvisoryTier, FetchError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn measure_json(label: &str, date_time: &str, value: &str) -> String {
    format!(
        r#"{{ "items": {{ "label": "{}", "latestReading": {{ "dateTime": "{}", "value": "{}" }} }} }}"#,
        label, date_time, value
    )
}

/// Fake upstream serving a swappable body and counting requests, plus a
/// clock the test can advance.
struct FakeUpstream {
    body: Arc<Mutex<String>>,
    hits: Arc<AtomicUsize>,
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeUpstream {
    fn new(body: String) -> Self {
        Self {
            body: Arc::new(Mutex::new(body)),
            hits: Arc::new(AtomicUsize::new(0)),
            now: Arc::new(Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap())),
        }
    }

    fn cache(
        &self,
    ) -> ReadingCache<impl Fn() -> Result<String, FetchError>, impl Fn() -> DateTime<Utc>> {
        let body = Arc::clone(&self.body);
        let hits = Arc::clone(&self.hits);
        let now = Arc::clone(&self.now);
        ReadingCache::with_clock(
            move || -> Result<String, FetchError> {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(body.lock().unwrap().clone())
            },
            move || *now.lock().unwrap(),
        )
    }

    fn serve(&self, body: String) {
        *self.body.lock().unwrap() = body;
    }

    fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// 1. Classification end to end
// ---------------------------------------------------------------------------

#[test]
fn test_normal_flow_end_to_end() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "42.5"));
    let advisory = upstream.cache().current_advisory().expect("should classify");

    assert_eq!(advisory.tier, AdvisoryTier::Normal);
    assert!(advisory.message.contains("42.5"));
    assert!(advisory.message.contains("Reading"));
}

#[test]
fn test_very_high_flow_end_to_end() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "88"));
    let advisory = upstream.cache().current_advisory().expect("should classify");

    assert_eq!(advisory.tier, AdvisoryTier::VeryHighFlow);
    assert!(advisory.message.contains("singles, doubles, or pairs"));
}

#[test]
fn test_boundary_values_end_to_end() {
    let cases = [
        ("50", AdvisoryTier::Normal),
        ("50.9", AdvisoryTier::HighFlow),
        ("51", AdvisoryTier::HighFlow),
        ("75", AdvisoryTier::HighFlow),
        ("76", AdvisoryTier::VeryHighFlow),
        ("100", AdvisoryTier::VeryHighFlow),
        ("100.1", AdvisoryTier::NoRowing),
        ("101", AdvisoryTier::NoRowing),
    ];

    for (value, expected) in cases {
        let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", value));
        let advisory = upstream.cache().current_advisory().expect("should classify");
        assert_eq!(advisory.tier, expected, "flow {} m3/s", value);
        assert!(advisory.message.contains(&format!(" is {} cubic", value)));
    }
}

// ---------------------------------------------------------------------------
// 2. Cache lifetime
// ---------------------------------------------------------------------------

#[test]
fn test_fresh_process_fetches_exactly_once() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "42.5"));
    let cache = upstream.cache();

    cache.get_reading().expect("first call");
    assert_eq!(upstream.hits(), 1);
    assert!(cache.cached_at().is_some());
}

#[test]
fn test_repeat_within_ttl_is_identical_and_offline() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "42.5"));
    let cache = upstream.cache();

    let first = cache.get_reading().expect("first call");
    upstream.advance(Duration::milliseconds(1));
    // Even if upstream moves on, the cached reading is what is served.
    upstream.serve(measure_json("Reading", "2024-01-01T10:15:00Z", "60"));
    let second = cache.get_reading().expect("second call");

    assert_eq!(upstream.hits(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_expired_entry_triggers_one_new_fetch() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "42.5"));
    let cache = upstream.cache();

    cache.get_reading().expect("first call");
    upstream.advance(Duration::milliseconds(900_000));
    upstream.serve(measure_json("Reading", "2024-01-01T10:15:00Z", "60"));

    let advisory = cache.current_advisory().expect("refetch");
    assert_eq!(upstream.hits(), 2);
    assert_eq!(advisory.tier, AdvisoryTier::HighFlow);

    // And the new entry is itself cached.
    cache.get_reading().expect("cached again");
    assert_eq!(upstream.hits(), 2);
}

#[test]
fn test_malformed_payload_keeps_previous_entry() {
    let upstream = FakeUpstream::new(measure_json("Reading", "2024-01-01T10:00:00Z", "42.5"));
    let cache = upstream.cache();

    cache.get_reading().expect("first call");
    let fetched_at = cache.cached_at();

    upstream.advance(Duration::minutes(30));
    upstream.serve(r#"{ "items": { "label": "Reading" } }"#.to_string());

    let err = cache.get_reading().expect_err("missing latestReading must fail");
    assert!(err.is_parse());
    assert!(err.to_string().starts_with("invalid response structure"));
    assert_eq!(cache.cached_at(), fetched_at);
}
