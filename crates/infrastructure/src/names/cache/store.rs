use super::clock::{Clock, SystemClock};
use super::metrics::{CacheCounters, CacheStats};
use dashmap::DashMap;
use ferrous_names_application::ports::{CacheCleanupOutcome, DurableStore};
use ferrous_names_domain::config::CacheConfig;
use ferrous_names_domain::{CacheEntry, CacheLookup, CacheSource, DomainError, LookupType};
use futures::future::join_all;
use rustc_hash::FxBuildHasher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

struct StoredEntry {
    entry: CacheEntry,
    seq: u64,
}

/// Persistent name cache.
///
/// Entries live in an in-memory index backed by a [`DurableStore`]. Reads
/// and writes always succeed against memory; durable failures are logged
/// and the cache keeps working memory-only.
pub struct DomainCache {
    entries: DashMap<String, StoredEntry, FxBuildHasher>,
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    forward_ttl: Duration,
    reverse_ttl: Duration,
    max_entries: usize,
    counters: CacheCounters,
    next_seq: AtomicU64,
    storage_healthy: AtomicBool,
}

impl DomainCache {
    pub fn new(config: &CacheConfig, store: Arc<dyn DurableStore>) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(
                config.max_entries.min(65536),
                FxBuildHasher,
            ),
            store,
            clock: Arc::new(SystemClock),
            forward_ttl: config.forward_ttl(),
            reverse_ttl: config.reverse_ttl(),
            max_entries: config.max_entries.max(1),
            counters: CacheCounters::default(),
            next_seq: AtomicU64::new(0),
            storage_healthy: AtomicBool::new(true),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl_for(&self, lookup_type: LookupType) -> Duration {
        match lookup_type {
            LookupType::Forward => self.forward_ttl,
            LookupType::Reverse => self.reverse_ttl,
        }
    }

    /// Loads every live row from the durable store into memory. Expired rows
    /// are deleted from the store instead. Returns the number loaded.
    pub async fn init(&self) -> usize {
        let rows = match self.store.get_all().await {
            Ok(rows) => rows,
            Err(e) => {
                self.storage_failed("load", &e);
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let mut loaded = 0;
        let mut expired = Vec::new();
        for entry in rows {
            if entry.is_expired_at(now) {
                expired.push(entry.key);
                continue;
            }
            self.insert_memory(entry);
            loaded += 1;
        }

        for key in &expired {
            if let Err(e) = self.store.delete(key).await {
                self.storage_failed("delete", &e);
            }
        }

        info!(
            loaded,
            expired = expired.len(),
            durable = self.store.is_durable(),
            "Name cache initialized"
        );

        if self.entries.len() > self.max_entries {
            self.cleanup().await;
        }
        loaded
    }

    /// `Hit(Some)` for a cached value, `Hit(None)` for a cached absence and
    /// `Miss` when nothing live is stored. Expired entries are removed here.
    pub async fn get(&self, raw_key: &str, lookup_type: LookupType) -> CacheLookup {
        let key = CacheEntry::namespaced_key(raw_key, lookup_type);
        let now = self.clock.now_ms();

        let memory = self.entries.get(&key).map(|stored| {
            let expired = stored.entry.is_expired_at(now);
            (expired, stored.entry.value.clone())
        });

        let lookup = match memory {
            Some((false, value)) => CacheLookup::Hit(value),
            Some((true, _)) => {
                self.expire(&key).await;
                CacheLookup::Miss
            }
            None => self.load_from_store(&key, now).await,
        };

        match &lookup {
            CacheLookup::Hit(_) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Name cache HIT");
            }
            CacheLookup::Miss => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Name cache MISS");
            }
        }
        lookup
    }

    async fn load_from_store(&self, key: &str, now: i64) -> CacheLookup {
        if !self.store.is_durable() {
            return CacheLookup::Miss;
        }
        match self.store.get(key).await {
            Ok(Some(entry)) if entry.is_expired_at(now) => {
                if let Err(e) = self.store.delete(key).await {
                    self.storage_failed("delete", &e);
                }
                CacheLookup::Miss
            }
            Ok(Some(entry)) => {
                let value = entry.value.clone();
                self.insert_memory(entry);
                CacheLookup::Hit(value)
            }
            Ok(None) => CacheLookup::Miss,
            Err(e) => {
                self.storage_failed("get", &e);
                CacheLookup::Miss
            }
        }
    }

    /// Liveness check without touching hit/miss statistics.
    pub fn contains(&self, raw_key: &str, lookup_type: LookupType) -> bool {
        let key = CacheEntry::namespaced_key(raw_key, lookup_type);
        let now = self.clock.now_ms();
        self.entries
            .get(&key)
            .is_some_and(|stored| !stored.entry.is_expired_at(now))
    }

    pub async fn set(
        &self,
        raw_key: &str,
        value: Option<String>,
        lookup_type: LookupType,
        source: CacheSource,
    ) {
        let ttl = self.ttl_for(lookup_type);
        self.set_with_ttl(raw_key, value, lookup_type, source, ttl)
            .await;
    }

    pub async fn set_with_ttl(
        &self,
        raw_key: &str,
        value: Option<String>,
        lookup_type: LookupType,
        source: CacheSource,
        ttl: Duration,
    ) {
        let entry = CacheEntry::new(
            raw_key,
            value,
            lookup_type,
            source,
            self.clock.now_ms(),
            ttl.as_millis() as u64,
        );

        self.insert_memory(entry.clone());

        match self.store.put(&entry).await {
            Ok(()) => self.storage_recovered(),
            Err(e) => self.storage_failed("put", &e),
        }

        if self.entries.len() > self.max_entries {
            self.cleanup().await;
        }
    }

    pub async fn batch_get(
        &self,
        raw_keys: &[String],
        lookup_type: LookupType,
    ) -> HashMap<String, CacheLookup> {
        let lookups = join_all(raw_keys.iter().map(|k| self.get(k, lookup_type))).await;
        raw_keys.iter().cloned().zip(lookups).collect()
    }

    pub async fn batch_set(
        &self,
        items: Vec<(String, Option<String>)>,
        lookup_type: LookupType,
        source: CacheSource,
    ) {
        join_all(items.into_iter().map(|(key, value)| async move {
            self.set(&key, value, lookup_type, source).await
        }))
        .await;
    }

    pub async fn delete(&self, raw_key: &str, lookup_type: LookupType) -> bool {
        let key = CacheEntry::namespaced_key(raw_key, lookup_type);
        let removed = self.entries.remove(&key).is_some();
        if let Err(e) = self.store.delete(&key).await {
            self.storage_failed("delete", &e);
        }
        removed
    }

    pub async fn clear(&self) {
        self.entries.clear();
        self.counters.reset();
        if let Err(e) = self.store.clear().await {
            self.storage_failed("clear", &e);
        }
        info!("Name cache cleared");
    }

    /// Purges expired entries, then evicts the oldest insertions until the
    /// cache is back at capacity.
    pub async fn cleanup(&self) -> CacheCleanupOutcome {
        let now = self.clock.now_ms();

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.value().entry.is_expired_at(now))
            .map(|e| e.key().clone())
            .collect();
        for key in &expired {
            self.entries.remove(key);
        }

        let mut evicted = Vec::new();
        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            let mut by_age: Vec<(i64, u64, String)> = self
                .entries
                .iter()
                .map(|e| (e.value().entry.timestamp, e.value().seq, e.key().clone()))
                .collect();
            by_age.sort_unstable();
            for (_, _, key) in by_age.into_iter().take(overflow) {
                self.entries.remove(&key);
                evicted.push(key);
            }
        }

        for key in expired.iter().chain(evicted.iter()) {
            if let Err(e) = self.store.delete(key).await {
                self.storage_failed("delete", &e);
                break;
            }
        }

        self.counters
            .expirations
            .fetch_add(expired.len() as u64, Ordering::Relaxed);
        self.counters
            .evictions
            .fetch_add(evicted.len() as u64, Ordering::Relaxed);

        let outcome = CacheCleanupOutcome {
            expired_removed: expired.len(),
            evicted: evicted.len(),
            cache_size: self.entries.len(),
        };
        if outcome.entries_removed() > 0 {
            debug!(
                expired = outcome.expired_removed,
                evicted = outcome.evicted,
                size = outcome.cache_size,
                "Name cache cleanup"
            );
        }
        outcome
    }

    pub fn stats(&self) -> CacheStats {
        let (forward_entries, reverse_entries) =
            self.entries
                .iter()
                .fold((0, 0), |(f, r), e| match e.value().entry.lookup_type {
                    LookupType::Forward => (f + 1, r),
                    LookupType::Reverse => (f, r + 1),
                });

        CacheStats {
            total_entries: forward_entries + reverse_entries,
            forward_entries,
            reverse_entries,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            hit_rate: self.counters.hit_rate(),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            durable: self.is_durable(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// `false` once the durable store is absent or has started failing.
    pub fn is_durable(&self) -> bool {
        self.store.is_durable() && self.storage_healthy.load(Ordering::Relaxed)
    }

    fn insert_memory(&self, entry: CacheEntry) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert(entry.key.clone(), StoredEntry { entry, seq });
    }

    async fn expire(&self, key: &str) {
        self.entries.remove(key);
        self.counters.expirations.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.store.delete(key).await {
            self.storage_failed("delete", &e);
        }
    }

    fn storage_failed(&self, operation: &'static str, error: &DomainError) {
        if self.storage_healthy.swap(false, Ordering::Relaxed) {
            warn!(
                operation,
                error = %error,
                "Durable name cache unavailable, continuing memory-only"
            );
        } else {
            debug!(operation, error = %error, "Durable name cache still unavailable");
        }
    }

    fn storage_recovered(&self) {
        if !self.storage_healthy.swap(true, Ordering::Relaxed) {
            info!("Durable name cache available again");
        }
    }
}
