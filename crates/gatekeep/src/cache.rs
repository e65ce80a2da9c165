//! Time-bounded decision cache.
//!
//! Maps a [`DecisionKey`] to a boolean decision and its expiry instant. An
//! expired entry is reported as a miss and evicted on read. Entries can also
//! be dropped explicitly, per key, per actor, or all at once.
//!
//! Entries live in an [`LruCache`] behind a `Mutex`; at capacity the least
//! recently used decision is evicted. Concurrent misses on the same key each
//! evaluate independently and the last insert wins.

use crate::key::DecisionKey;
use chrono::{DateTime, TimeDelta, Utc};
use gatekeep_types::{ActorId, Clock, SystemClock};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::trace;

/// Default upper bound on cached decisions.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: bool,
    expires_at: DateTime<Utc>,
    actor: ActorId,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-local cache of access decisions.
#[derive(Debug)]
pub struct DecisionCache<C = SystemClock> {
    entries: Mutex<LruCache<DecisionKey, CacheEntry>>,
    clock: C,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new()
    }
}

fn to_capacity(max_entries: usize) -> NonZeroUsize {
    NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN)
}

impl<C: Clock> DecisionCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(to_capacity(DEFAULT_MAX_ENTRIES))),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Sets the capacity bound. Values below 1 are raised to 1.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .resize(to_capacity(max_entries));
        self
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<DecisionKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached decision if present and not yet expired.
    ///
    /// A hit marks the entry as most recently used.
    pub fn get(&self, key: &DecisionKey) -> Option<bool> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let lookup = entries
            .get(key)
            .map(|entry| (entry.value, now < entry.expires_at));

        match lookup {
            Some((value, true)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some((_, false)) => {
                entries.pop(key);
                trace!(key = %key, "Evicted expired decision");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `value` under `key` until `now + ttl`, replacing any existing
    /// entry. At capacity the least recently used entry is evicted.
    pub fn insert(&self, key: DecisionKey, actor: &ActorId, value: bool, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = CacheEntry {
            value,
            expires_at,
            actor: actor.clone(),
        };

        let displaced = self.lock().push(key.clone(), entry);
        if let Some((evicted, _)) = displaced.filter(|(evicted, _)| *evicted != key) {
            trace!(key = %evicted, "Evicted decision at capacity");
        }
    }

    /// Drops one decision. Returns whether it was present.
    pub fn invalidate(&self, key: &DecisionKey) -> bool {
        self.lock().pop(key).is_some()
    }

    /// Drops every decision made for `actor`. Returns how many were removed.
    pub fn invalidate_actor(&self, actor: &ActorId) -> usize {
        self.remove_where(|entry| entry.actor == *actor)
    }

    /// Drops every decision.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.remove_where(|entry| now >= entry.expires_at)
    }

    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
        let mut entries = self.lock();
        let doomed: Vec<DecisionKey> = entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        doomed.len()
    }

    /// Number of stored entries, expired ones included until evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries held before eviction.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
