//! Time source for token issuance and expiry checks.
//!
//! All timestamps are Unix seconds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Longest accepted token lifetime: ten years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// A token lifetime outside `1..=MAX_TTL_SECS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{name} must be between 1 and {max} seconds, got {value}")]
pub struct TtlError {
    pub name: &'static str,
    pub value: u64,
    pub max: u64,
}

/// Accept `value` as a lifetime in seconds.
pub fn check_ttl(name: &'static str, value: u64) -> Result<u64, TtlError> {
    if (1..=MAX_TTL_SECS).contains(&value) {
        Ok(value)
    } else {
        Err(TtlError {
            name,
            value,
            max: MAX_TTL_SECS,
        })
    }
}

pub trait Clock: Send + Sync {
    /// Current time in Unix seconds.
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // A clock set before 1970 reads as the epoch, which makes every token expired.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
