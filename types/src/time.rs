//! Timestamp type — Unix epoch seconds, integer arithmetic only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in whole seconds (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs` (saturating).
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed from this timestamp until `now`, zero if in the future.
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether `now` is strictly past this timestamp.
    pub fn is_past(&self, now: Timestamp) -> bool {
        now.0 > self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        let t = Timestamp::new(1000);
        assert_eq!(t.elapsed(Timestamp::new(1500)), 500);
        assert_eq!(t.elapsed(Timestamp::new(500)), 0);
    }

    #[test]
    fn is_past_is_strict() {
        let t = Timestamp::new(1000);
        assert!(!t.is_past(Timestamp::new(1000)));
        assert!(t.is_past(Timestamp::new(1001)));
    }

    #[test]
    fn plus_secs_saturates() {
        assert_eq!(Timestamp::new(u64::MAX).plus_secs(10).as_secs(), u64::MAX);
        assert_eq!(Timestamp::new(10).plus_secs(5).as_secs(), 15);
    }
}
