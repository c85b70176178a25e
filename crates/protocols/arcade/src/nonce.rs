//! Offer nonces and wall-clock helpers
//!
//! Nonces are seeded from wall-clock milliseconds but never repeat within a
//! process: each call returns `max(now_ms, last + 1)`.

use std::sync::atomic::{AtomicU64, Ordering};

use lender_core::UnixSeconds;

/// Monotonic nonce source
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next nonce given the current time in milliseconds
    pub fn next_at(&self, now_ms: u64) -> u64 {
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now_ms.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    pub fn next(&self) -> u64 {
        self.next_at(unix_now_millis())
    }
}

static PROCESS_NONCES: NonceGenerator = NonceGenerator::new();

/// Next nonce from the process-wide generator
pub fn next_nonce() -> u64 {
    PROCESS_NONCES.next()
}

pub fn unix_now() -> UnixSeconds {
    chrono::Utc::now().timestamp().max(0) as u64
}

pub fn unix_now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_follows_clock_when_it_advances() {
        let nonces = NonceGenerator::new();
        assert_eq!(nonces.next_at(1_000), 1_000);
        assert_eq!(nonces.next_at(2_000), 2_000);
    }

    #[test]
    fn test_monotonic_when_clock_stalls_or_rewinds() {
        let nonces = NonceGenerator::new();
        assert_eq!(nonces.next_at(5_000), 5_000);
        assert_eq!(nonces.next_at(5_000), 5_001);
        assert_eq!(nonces.next_at(4_000), 5_002);
    }

    #[test]
    fn test_unique_across_threads() {
        let nonces = Arc::new(NonceGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let nonces = Arc::clone(&nonces);
                std::thread::spawn(move || (0..500).map(|_| nonces.next_at(42)).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for nonce in handle.join().unwrap() {
                assert!(seen.insert(nonce), "duplicate nonce {}", nonce);
            }
        }
        assert_eq!(seen.len(), 2_000);
    }

    #[test]
    fn test_process_generator_is_increasing() {
        let a = next_nonce();
        let b = next_nonce();
        assert!(b > a);
    }
}
