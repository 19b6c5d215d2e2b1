//! System wall clock.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::application::Clock;

/// [`Clock`] backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    /// Seconds since the Unix epoch, or `0` if the system clock is set
    /// before 1970.
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2023() {
        assert!(SystemClock.now_unix() > 1_672_531_200);
    }
}
