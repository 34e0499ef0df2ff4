//! Short-lived read cache
//!
//! List and detail pages re-fetch freely; reads younger than the TTL are
//! served from memory. Mutations invalidate by key prefix.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

struct Entry {
    stored_at: DateTime<Utc>,
    value: serde_json::Value,
}

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    /// Fresh value for `key`
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.lock().ok()?;
        let now = Utc::now();
        entries
            .get(key)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.value.clone())
    }

    /// Store `value`, evicting whatever has expired
    pub fn put(&self, key: impl Into<String>, value: serde_json::Value) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = Utc::now();
            entries.retain(|_, e| self.is_fresh(e, now));
            entries.insert(
                key.into(),
                Entry {
                    stored_at: now,
                    value,
                },
            );
        }
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }
}
