//! A keyed TTL cache handed to handlers explicitly, never reached through
//! ambient state. Entries go stale by expiry only; writes elsewhere in the
//! system do not invalidate them.

use crate::veil::Fallible;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct Cache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> Cache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A live value for this key, if one is cached. Expired entries are
    /// dropped on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// The cached value if still live, otherwise whatever `compute` returns,
    /// cached for `ttl`. Compute errors are passed through uncached.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Fallible<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Fallible<V>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = compute().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}
