//! Process-local TTL cache for listing reads.
//!
//! Entries are keyed by kind (list, detail, stats), an optional entity id, and a fingerprint of
//! the request parameters. A write to an entity drops every detail variant for that entity and
//! all list and stats entries, since any of them may include it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;

const KEY_PREFIX: &str = "properties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    List,
    Detail,
    Stats,
}

impl CacheKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CacheKind::List => "list",
            CacheKind::Detail => "detail",
            CacheKind::Stats => "stats",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKind,
    entity: Option<String>,
    fingerprint: String,
}

impl CacheKey {
    pub fn list(fingerprint: impl Into<String>) -> Self {
        Self {
            kind: CacheKind::List,
            entity: None,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn detail(entity_id: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            kind: CacheKind::Detail,
            entity: Some(entity_id.into()),
            fingerprint: variant.into(),
        }
    }

    pub fn stats(fingerprint: impl Into<String>) -> Self {
        Self {
            kind: CacheKind::Stats,
            entity: None,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(
                f,
                "{KEY_PREFIX}:{}:{entity}:{}",
                self.kind.as_str(),
                self.fingerprint
            ),
            None => write!(f, "{KEY_PREFIX}:{}:{}", self.kind.as_str(), self.fingerprint),
        }
    }
}

/// Time-to-live per cache kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub list: Duration,
    pub detail: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(300),
            detail: Duration::from_secs(120),
            stats: Duration::from_secs(60),
        }
    }
}

impl CacheTtls {
    pub fn for_kind(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::List => self.list,
            CacheKind::Detail => self.detail,
            CacheKind::Stats => self.stats,
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    stored_at: DateTime<Utc>,
    value: V,
}

/// Cache instance owned by whoever constructs it; cloning values out keeps the lock short.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    ttls: CacheTtls,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttls: CacheTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttls,
            clock,
        }
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Stored value, unless missing or at least one TTL old. Expired entries are evicted.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let ttl = self.ttls.for_kind(key.kind);
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => is_expired(entry.stored_at, now, ttl),
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// `get` unless the caller asked to bypass. Bypassing leaves the stored entry in place.
    pub fn lookup(&self, key: &CacheKey, bypass: bool) -> Option<V> {
        if bypass {
            None
        } else {
            self.get(key)
        }
    }

    pub fn set(&self, key: CacheKey, value: V) {
        let stored_at = self.clock.now();
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key, CacheEntry { stored_at, value });
    }

    /// Drop every detail entry for `entity_id` plus all list and stats entries. Returns the
    /// number of entries removed.
    pub fn invalidate(&self, entity_id: &str) -> usize {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let before = entries.len();
        entries.retain(|key, _| match key.kind {
            CacheKind::Detail => key.entity.as_deref() != Some(entity_id),
            CacheKind::List | CacheKind::Stats => false,
        });
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_expired(stored_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (now - stored_at).to_std() {
        Ok(age) => age >= ttl,
        // Stored in the future relative to `now`: the clock moved back, treat as fresh.
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn cache() -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        (TtlCache::new(CacheTtls::default(), clock.clone()), clock)
    }

    #[test]
    fn returns_value_until_ttl_elapses() {
        let (cache, clock) = cache();
        let key = CacheKey::detail("p-1", "public");
        cache.set(key.clone(), "villa".into());

        clock.advance(chrono::Duration::seconds(119));
        assert_eq!(cache.get(&key).as_deref(), Some("villa"));

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn ttl_depends_on_kind() {
        let (cache, clock) = cache();
        cache.set(CacheKey::stats("approval"), "stats".into());
        cache.set(CacheKey::list("page=1"), "list".into());

        clock.advance(chrono::Duration::seconds(60));
        assert_eq!(cache.get(&CacheKey::stats("approval")), None);
        assert_eq!(
            cache.get(&CacheKey::list("page=1")).as_deref(),
            Some("list")
        );
    }

    #[test]
    fn invalidate_drops_entity_variants_and_all_collections() {
        let (cache, _) = cache();
        cache.set(CacheKey::detail("p-1", "public"), "a".into());
        cache.set(CacheKey::detail("p-1", "staff"), "b".into());
        cache.set(CacheKey::detail("p-2", "public"), "c".into());
        cache.set(CacheKey::list("page=1"), "d".into());
        cache.set(CacheKey::stats("approval"), "e".into());

        assert_eq!(cache.invalidate("p-1"), 4);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&CacheKey::detail("p-2", "public")).as_deref(),
            Some("c")
        );
    }

    #[test]
    fn bypass_skips_read_without_evicting() {
        let (cache, _) = cache();
        let key = CacheKey::list("page=1:role=anonymous");
        cache.set(key.clone(), "cached".into());

        assert_eq!(cache.lookup(&key, true), None);
        assert_eq!(cache.lookup(&key, false).as_deref(), Some("cached"));
    }

    #[test]
    fn keys_render_with_prefix() {
        assert_eq!(
            CacheKey::detail("p-9", "staff").to_string(),
            "properties:detail:p-9:staff"
        );
        assert_eq!(CacheKey::stats("approval").to_string(), "properties:stats:approval");
    }
}
