//! TTL cache contract for fetched feature sets.
//!
//! The engine only needs get/put with millisecond expiries; the storage
//! medium stays the collaborator's business. Expired entries read as absent.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::feature::FeatureSet;

pub trait FeatureCache: Send + Sync {
    fn get(&self, key: &str) -> Option<FeatureSet>;
    fn put(&self, key: &str, value: FeatureSet, ttl_ms: i64);
}

/// In-memory implementation on the wall clock.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: FeatureSet,
    expires_at_ms: i64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureCache for MemoryCache {
    fn get(&self, key: &str) -> Option<FeatureSet> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().expect("cache lock");
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: FeatureSet, ttl_ms: i64) {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl_ms;
        self.entries
            .lock()
            .expect("cache lock")
            .insert(key.to_string(), CacheEntry { value, expires_at_ms });
    }
}
