use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Short-TTL response cache shared by every aggregation endpoint. Entries
/// are overwritten in place on set and dropped lazily on an expired read;
/// there is no background eviction.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Returns the cached value unless the entry is missing or expired.
    /// An entry is never served past its expiry.
    pub fn get(&self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn set(&self, key: String, value: Value, ttl: Duration) {
        self.entries.insert(key, CacheEntry { value, expires_at: Instant::now() + ttl });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Derive a deterministic cache key from the endpoint identity, the
/// caller's organization and any request discriminators. The organization
/// id is always a component so two tenants can never share an entry.
pub fn cache_key(endpoint: &str, organization_id: Uuid, discriminators: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");
    hasher.update(organization_id.as_bytes());
    for d in discriminators {
        hasher.update(b"|");
        hasher.update(d.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
