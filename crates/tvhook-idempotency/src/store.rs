//! Bounded, time-limited set of seen idempotency keys.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::key::IdempotencyKey;

/// Map plus insertion-ordered index. Every entry shares one TTL, so
/// insertion order is also expiry order.
#[derive(Debug, Default)]
struct StoreInner {
    /// Key -> insertion time (ms).
    entries: HashMap<IdempotencyKey, u64>,
    /// (key, insertion time) oldest first.
    order: VecDeque<(IdempotencyKey, u64)>,
}

impl StoreInner {
    /// Drop every entry whose age has reached `ttl_ms`.
    fn purge_expired(&mut self, now_ms: u64, ttl_ms: u64) -> usize {
        let mut purged = 0;
        while let Some((_, inserted_at)) = self.order.front() {
            if now_ms.saturating_sub(*inserted_at) < ttl_ms {
                break;
            }
            if let Some((key, _)) = self.order.pop_front() {
                self.entries.remove(&key);
                purged += 1;
            }
        }
        purged
    }

    fn evict_oldest(&mut self) -> Option<IdempotencyKey> {
        let (key, _) = self.order.pop_front()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Remembers recently seen keys.
///
/// # Guarantees
/// - `check_and_mark` is atomic: of N concurrent calls with the same key,
///   exactly one returns `false`.
/// - An entry is never reported past its TTL.
/// - An entry is only dropped before its TTL when the store is at capacity,
///   and then the oldest insertion goes first.
///
/// Expired entries are reclaimed lazily on every access.
pub struct IdempotencyStore<C: Clock = SystemClock> {
    inner: Mutex<StoreInner>,
    ttl_ms: u64,
    capacity: usize,
    clock: C,
}

impl IdempotencyStore<SystemClock> {
    /// Create a store on the system clock.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, SystemClock)
    }
}

impl<C: Clock> IdempotencyStore<C> {
    /// Create a store on the given clock. Capacity is at least 1.
    #[must_use]
    pub fn with_clock(ttl: Duration, capacity: usize, clock: C) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            ttl_ms: ttl.as_millis() as u64,
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Returns `true` if `key` was already seen within the TTL; otherwise
    /// records it and returns `false`.
    pub fn check_and_mark(&self, key: &IdempotencyKey) -> bool {
        let now_ms = self.clock.now_ms();
        let mut inner = self.inner.lock();

        inner.purge_expired(now_ms, self.ttl_ms);
        if inner.entries.contains_key(key) {
            return true;
        }

        while inner.entries.len() >= self.capacity {
            match inner.evict_oldest() {
                Some(evicted) => debug!(key = %evicted, "Idempotency store full, evicted oldest key"),
                None => break,
            }
        }

        inner.entries.insert(key.clone(), now_ms);
        inner.order.push_back((key.clone(), now_ms));
        false
    }

    /// Whether `key` is currently remembered (does not record it).
    #[must_use]
    pub fn contains(&self, key: &IdempotencyKey) -> bool {
        let now_ms = self.clock.now_ms();
        let mut inner = self.inner.lock();
        inner.purge_expired(now_ms, self.ttl_ms);
        inner.entries.contains_key(key)
    }

    /// Drop expired entries now. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        self.inner.lock().purge_expired(now_ms, self.ttl_ms)
    }

    /// Number of live entries (after reclaiming expired ones).
    #[must_use]
    pub fn len(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut inner = self.inner.lock();
        inner.purge_expired(now_ms, self.ttl_ms);
        inner.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Current time on the store's clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl<C: Clock> std::fmt::Debug for IdempotencyStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyStore")
            .field("ttl_ms", &self.ttl_ms)
            .field("capacity", &self.capacity)
            .field("entries", &self.inner.lock().entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    /// Mock clock for testing with controllable time.
    struct MockClock {
        time_ms: AtomicU64,
    }

    impl MockClock {
        fn new(initial_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                time_ms: AtomicU64::new(initial_ms),
            })
        }

        fn advance(&self, delta_ms: u64) {
            self.time_ms.fetch_add(delta_ms, Ordering::AcqRel);
        }
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u64 {
            self.time_ms.load(Ordering::Acquire)
        }
    }

    const BASE_TIME: u64 = 1_700_000_000_000;

    fn key(s: &str) -> IdempotencyKey {
        IdempotencyKey::from(s)
    }

    #[test]
    fn test_first_sighting_then_duplicate() {
        let store = IdempotencyStore::with_clock(Duration::from_secs(60), 16, MockClock::new(BASE_TIME));
        assert!(!store.check_and_mark(&key("e1")));
        assert!(store.check_and_mark(&key("e1")));
        assert!(!store.check_and_mark(&key("e2")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let clock = MockClock::new(BASE_TIME);
        let store = IdempotencyStore::with_clock(Duration::from_secs(60), 16, clock.clone());

        assert!(!store.check_and_mark(&key("e1")));
        clock.advance(59_999);
        assert!(store.check_and_mark(&key("e1")), "still live before TTL");

        clock.advance(1);
        assert!(!store.contains(&key("e1")));
        assert!(!store.check_and_mark(&key("e1")), "treated as new after TTL");
        assert!(store.check_and_mark(&key("e1")));
    }

    #[test]
    fn test_duplicate_check_does_not_refresh_ttl() {
        let clock = MockClock::new(BASE_TIME);
        let store = IdempotencyStore::with_clock(Duration::from_secs(10), 16, clock.clone());

        assert!(!store.check_and_mark(&key("e1")));
        clock.advance(9_000);
        assert!(store.check_and_mark(&key("e1")));
        clock.advance(1_000);
        assert!(!store.check_and_mark(&key("e1")));
    }

    #[test]
    fn test_capacity_evicts_oldest_insertion() {
        let clock = MockClock::new(BASE_TIME);
        let store = IdempotencyStore::with_clock(Duration::from_secs(60), 3, clock.clone());

        for k in ["a", "b", "c"] {
            assert!(!store.check_and_mark(&key(k)));
            clock.advance(10);
        }
        assert!(!store.check_and_mark(&key("d")));

        assert_eq!(store.len(), 3);
        assert!(!store.contains(&key("a")), "oldest evicted");
        assert!(store.contains(&key("b")));
        assert!(store.contains(&key("c")));
        assert!(store.contains(&key("d")));
    }

    #[test]
    fn test_expired_entries_freed_before_eviction() {
        let clock = MockClock::new(BASE_TIME);
        let store = IdempotencyStore::with_clock(Duration::from_secs(1), 2, clock.clone());

        assert!(!store.check_and_mark(&key("a")));
        clock.advance(500);
        assert!(!store.check_and_mark(&key("b")));
        clock.advance(600); // "a" expired, "b" live

        assert!(!store.check_and_mark(&key("c")));
        assert!(store.contains(&key("b")), "live entry kept while an expired one was reclaimable");
        assert!(store.contains(&key("c")));
    }

    #[test]
    fn test_purge_expired() {
        let clock = MockClock::new(BASE_TIME);
        let store = IdempotencyStore::with_clock(Duration::from_secs(1), 8, clock.clone());
        store.check_and_mark(&key("a"));
        store.check_and_mark(&key("b"));
        clock.advance(1_000);
        assert_eq!(store.purge_expired(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let store = IdempotencyStore::with_clock(Duration::from_secs(60), 0, MockClock::new(BASE_TIME));
        assert_eq!(store.capacity(), 1);
        assert!(!store.check_and_mark(&key("a")));
        assert!(store.check_and_mark(&key("a")));
    }

    #[test]
    fn test_concurrent_same_key_single_winner() {
        let store = Arc::new(IdempotencyStore::new(Duration::from_secs(60), 512));
        let barrier = Arc::new(Barrier::new(16));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                let winners = winners.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if !store.check_and_mark(&key("race")) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
