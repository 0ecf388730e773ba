//! Clock and random implementations.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Seeded random - identical seeds yield identical sequences, uuids included.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl RandomPort for SeededRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.with_rng(|rng| rng.gen_range(min..=max))
    }

    fn gen_uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.with_rng(|rng| rng.fill_bytes(&mut bytes));
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed random for testing. Ranges always yield the fixed value, clamped.
#[cfg(test)]
pub struct FixedRandom(pub i32);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let xs: Vec<i32> = (0..8).map(|_| a.gen_range(0, 100)).collect();
        let ys: Vec<i32> = (0..8).map(|_| b.gen_range(0, 100)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.gen_uuid(), b.gen_uuid());
    }

    #[test]
    fn test_seeded_uuids_are_v4() {
        let random = SeededRandom::new(7);
        let id = random.gen_uuid();
        assert_eq!(id.get_version_num(), 4);
        assert_ne!(id, random.gen_uuid());
    }

    #[test]
    fn test_gen_index_stays_in_bounds() {
        let random = SeededRandom::new(1);
        for len in 1..10 {
            for _ in 0..20 {
                assert!(random.gen_index(len) < len);
            }
        }
        assert_eq!(FixedRandom(99).gen_index(3), 2);
        assert_eq!(FixedRandom(0).gen_index(0), 0);
    }
}
