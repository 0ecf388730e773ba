//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    fn gen_uuid(&self) -> Uuid;

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn gen_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let upper = i32::try_from(len - 1).unwrap_or(i32::MAX);
        usize::try_from(self.gen_range(0, upper))
            .unwrap_or(0)
            .min(len - 1)
    }
}
