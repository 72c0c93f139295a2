//! # TTL cache
//! In-memory key/value store with absolute expiry (no sliding refresh).
//!
//! Stale entries are not evicted; `get` ignores them and the next `set`
//! overwrites them. Time comes from a [`Clock`] so tests can move it.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::{Mutex, RwLock};

/// Provider caches keep values for one hour.
pub const DEFAULT_TTL_SECS: i64 = 3_600;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: ChronoDuration,
    clock: SharedClock,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Cache with the default one hour TTL.
    pub fn new(clock: SharedClock) -> Self {
        Self::with_ttl(ChronoDuration::seconds(DEFAULT_TTL_SECS), clock)
    }

    pub fn with_ttl(ttl: ChronoDuration, clock: SharedClock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the value only while `now - stored_at < ttl`.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read();
        entries.get(key).and_then(|entry| {
            if now.signed_duration_since(entry.stored_at) < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Replaces any existing entry and stamps it with the current time.
    pub fn set(&self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries
            .write()
            .insert(key, CacheEntry { value, stored_at });
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> ChronoDuration {
        self.ttl
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.read().len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
