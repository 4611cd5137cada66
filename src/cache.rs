//! TTL-based cache for check results.

use crate::response::CheckResult;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Get-or-set store for check results, with per-entry expiry.
pub trait CheckCache: Send + Sync {
    /// Get a live entry.
    fn get(&self, key: &str) -> Option<CheckResult>;

    /// Store an entry that expires after `ttl`.
    fn insert(&self, key: &str, value: CheckResult, ttl: Duration);
}

/// Build the cache key for an IP and lookback window.
///
/// Addresses are canonicalised so equivalent spellings share an entry.
/// The window is the segment after the last `:`, which keeps the mapping
/// injective even for IPv6 input.
pub fn cache_key(ip: &str, lookback_days: u32) -> String {
    let ip = ip.trim();
    let normalized = match ip.parse::<IpAddr>() {
        Ok(addr) => addr.to_string(),
        Err(_) => ip.to_string(),
    };
    format!("abuseipdb:{normalized}:{lookback_days}")
}

/// Cached check result.
#[derive(Debug, Clone)]
struct CachedCheck {
    value: CheckResult,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedCheck {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }
}

/// Thread-safe in-memory TTL cache.
pub struct MemoryCache {
    cache: RwLock<HashMap<String, CachedCheck>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Remove expired entries from the cache.
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.cache.write() {
            evict_expired_entries(&mut cache);
        }
    }

    /// Get the number of entries in the cache, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}

impl CheckCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CheckResult> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;

        if entry.is_expired() {
            // Left for cleanup, avoids taking the write lock here
            None
        } else {
            Some(entry.value.clone())
        }
    }

    fn insert(&self, key: &str, value: CheckResult, ttl: Duration) {
        let entry = CachedCheck {
            value,
            cached_at: Instant::now(),
            ttl,
        };

        if let Ok(mut cache) = self.cache.write() {
            if cache.len() >= self.max_entries && !cache.contains_key(key) {
                evict_expired_entries(&mut cache);

                if cache.len() >= self.max_entries {
                    if let Some(oldest) = cache
                        .iter()
                        .min_by_key(|(_, v)| v.cached_at)
                        .map(|(k, _)| k.clone())
                    {
                        cache.remove(&oldest);
                    }
                }
            }

            cache.insert(key.to_string(), entry);
        }
    }
}

fn evict_expired_entries(cache: &mut HashMap<String, CachedCheck>) {
    cache.retain(|_, v| !v.is_expired());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn result(ip: &str, score: u8) -> CheckResult {
        serde_json::from_value(serde_json::json!({
            "ipAddress": ip,
            "abuseConfidenceScore": score,
        }))
        .unwrap()
    }

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_cache_key_distinct() {
        assert_ne!(cache_key("1.2.3.4", 30), cache_key("1.2.3.5", 30));
        assert_ne!(cache_key("1.2.3.4", 30), cache_key("1.2.3.4", 90));
        assert_ne!(cache_key("1.1.82.56", 30), cache_key("11.8.25.6", 30));
        assert_ne!(cache_key("::1", 30), cache_key("::", 130));
    }

    #[test]
    fn test_cache_key_canonical() {
        assert_eq!(cache_key(" 1.2.3.4 ", 30), cache_key("1.2.3.4", 30));
        assert_eq!(cache_key("::0001", 30), cache_key("::1", 30));
        assert_eq!(cache_key("1.2.3.4", 30), "abuseipdb:1.2.3.4:30");
    }

    #[test]
    fn test_cache_set_and_get() {
        let cache = MemoryCache::new(1000);
        cache.insert("k", result("192.168.1.1", 75), HOUR);

        let cached = cache.get("k").unwrap();
        assert_eq!(cached.abuse_confidence_score, 75);
        assert_eq!(cached.ip_address, "192.168.1.1");
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryCache::new(1000);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_cache_expiration() {
        let cache = MemoryCache::new(1000);
        cache.insert("k", result("192.168.1.1", 75), Duration::from_millis(1));

        thread::sleep(Duration::from_millis(10));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_zero_ttl_never_served() {
        let cache = MemoryCache::new(1000);
        cache.insert("k", result("192.168.1.1", 75), Duration::ZERO);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_cache_max_entries() {
        let cache = MemoryCache::new(2);

        cache.insert("a", result("192.168.1.1", 10), HOUR);
        thread::sleep(Duration::from_millis(1));
        cache.insert("b", result("192.168.1.2", 20), HOUR);
        thread::sleep(Duration::from_millis(1));
        cache.insert("c", result("192.168.1.3", 30), HOUR);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_cache_cleanup() {
        let cache = MemoryCache::new(1000);
        cache.insert("a", result("192.168.1.1", 10), Duration::from_millis(1));
        cache.insert("b", result("192.168.1.2", 20), Duration::from_millis(1));

        thread::sleep(Duration::from_millis(10));
        cache.cleanup();

        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cache_clear() {
        let cache = MemoryCache::new(1000);
        cache.insert("a", result("192.168.1.1", 10), HOUR);
        cache.insert("b", result("192.168.1.2", 20), HOUR);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
