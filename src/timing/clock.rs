use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// An opaque high-resolution point in time, split into whole seconds and
/// sub-second nanoseconds.
///
/// Timestamps are only meaningful relative to other timestamps from the same
/// clock. They never follow wall-clock adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: u64,
    nanos: u32,
}

impl Timestamp {
    /// Builds a timestamp; `nanos` beyond one second carry into `secs`.
    pub fn new(secs: u64, nanos: u32) -> Self {
        Self::from_duration(Duration::new(secs, nanos))
    }

    pub fn from_duration(d: Duration) -> Self {
        Self {
            secs: d.as_secs(),
            nanos: d.subsec_nanos(),
        }
    }

    pub fn secs(&self) -> u64 {
        self.secs
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Whole milliseconds: seconds and nanoseconds are truncated
    /// independently and then summed.
    pub fn to_millis(&self) -> i64 {
        self.secs as i64 * 1000 + (self.nanos / 1_000_000) as i64
    }
}

/// Source of [`Timestamp`]s for a timing session.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by [`Instant`], measured from a process-wide
/// anchor so timestamps from different clock values are comparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(anchor().elapsed())
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one copy and hand
/// another to a session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Duration) -> Self {
        let clock = Self::new();
        clock.set(start);
        clock
    }

    pub fn set(&self, at: Duration) {
        self.nanos.store(at.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }
}
