//! Time source seam
//!
//! The coordinator never calls `Utc::now()` directly; it takes a clock so
//! tests can drive cache freshness and sync throttling deterministically.

use chrono::{DateTime, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
