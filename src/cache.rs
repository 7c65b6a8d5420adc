//! Single-slot reading cache in front of the upstream measure.
//!
//! One `ReadingCache` is shared by every request the process serves. It keeps
//! at most one reading together with the time it was fetched, and answers
//! from that slot while the entry is younger than the TTL (15 minutes).
//!
//! The slot lock is only held to read or replace the entry, never across the
//! network call. Concurrent callers that all see a stale slot each fetch on
//! their own and the last successful write wins; there is no in-flight
//! request sharing.

use crate::advisory;
use crate::ingest::ea::parse_latest_reading;
use crate::model::{Advisory, FetchError, Reading, cache_ttl};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Injection seams
// ---------------------------------------------------------------------------

/// Something that can fetch the raw measure body once.
pub trait MeasureSource {
    fn fetch(&self) -> Result<String, FetchError>;
}

impl<F> MeasureSource for F
where
    F: Fn() -> Result<String, FetchError>,
{
    fn fetch(&self) -> Result<String, FetchError> {
        self()
    }
}

/// Wall-clock source used to age cache entries.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// The cached reading and when it was fetched. Stored as one value so the
/// pair is always replaced together.
#[derive(Debug, Clone)]
struct CacheEntry {
    reading: Reading,
    fetched_at: DateTime<Utc>,
}

pub struct ReadingCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: Duration,
    slot: Mutex<Option<CacheEntry>>,
}

impl<S: MeasureSource> ReadingCache<S, SystemClock> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: MeasureSource, C: Clock> ReadingCache<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            ttl: cache_ttl(),
            slot: Mutex::new(None),
        }
    }

    /// Returns the current reading, fetching it if the cached one is missing
    /// or at least one TTL old.
    ///
    /// # Errors
    /// Any `FetchError` from the source or the parser. The cached entry is
    /// left as it was; stale data is not served on failure.
    pub fn get_reading(&self) -> Result<Reading, FetchError> {
        let now = self.clock.now();

        if let Some(entry) = self.fresh_entry(now) {
            debug!(
                age_ms = (now - entry.fetched_at).num_milliseconds(),
                "serving cached reading"
            );
            return Ok(entry.reading);
        }

        info!("cache miss, fetching latest reading");
        let reading = self
            .source
            .fetch()
            .and_then(|body| parse_latest_reading(&body))
            .inspect_err(|e| warn!(error = %e, "failed to fetch latest reading"))?;

        let fetched_at = self.clock.now();
        *self.lock_slot() = Some(CacheEntry {
            reading: reading.clone(),
            fetched_at,
        });

        info!(
            label = %reading.label,
            value = reading.value,
            timestamp = %reading.timestamp,
            "cached fresh reading"
        );
        Ok(reading)
    }

    /// `get_reading` followed by classification: the one call the
    /// dispatcher needs.
    pub fn current_advisory(&self) -> Result<Advisory, FetchError> {
        self.get_reading().map(|reading| advisory::classify(&reading))
    }

    /// When the cached entry was fetched, if there is one (fresh or stale).
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.lock_slot().as_ref().map(|entry| entry.fetched_at)
    }

    fn fresh_entry(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.lock_slot()
            .as_ref()
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .cloned()
    }

    // The slot is always a complete entry or empty, so a poisoned lock still
    // holds consistent data.
    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<CacheEntry>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
