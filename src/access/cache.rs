//! Short-TTL memoization of access-check results.
//!
//! Bounded associative cache: per-entry TTL plus least-recently-used
//! eviction once at capacity. Only boolean access results are cached;
//! role and raw subscription data are always read directly.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cached results are valid for 5 minutes.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// At most 100 entries per process.
pub const CACHE_CAPACITY: usize = 100;

struct Entry {
    value: bool,
    inserted_at: Instant,
    // Monotonic recency counter, bumped on every hit.
    last_used: u64,
}

pub struct AccessCache {
    entries: HashMap<String, Entry>,
    ttl: Duration,
    capacity: usize,
    tick: u64,
}

impl Default for AccessCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, CACHE_CAPACITY)
    }
}

impl AccessCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
            tick: 0,
        }
    }

    /// Look up a cached access result. Expired entries are dropped and
    /// treated as absent. A hit refreshes recency, not the TTL clock.
    pub fn get(&mut self, email: &str) -> Option<bool> {
        let fresh = self
            .entries
            .get(email)
            .map(|entry| entry.inserted_at.elapsed() < self.ttl)?;

        if !fresh {
            self.entries.remove(email);
            return None;
        }

        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(email).map(|entry| {
            entry.last_used = tick;
            entry.value
        })
    }

    /// Insert an access result, evicting the least-recently-used entry
    /// if the cache is at capacity.
    pub fn insert(&mut self, email: String, value: bool) {
        self.tick += 1;
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&email) {
            self.evict_lru();
        }
        self.entries.insert(
            email,
            Entry {
                value,
                inserted_at: Instant::now(),
                last_used: self.tick,
            },
        );
    }

    /// Drop the cached result for an email, if any.
    pub fn invalidate(&mut self, email: &str) {
        self.entries.remove(email);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(email, _)| email.clone());
        if let Some(email) = oldest {
            self.entries.remove(&email);
        }
    }
}
