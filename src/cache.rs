//! Request cache for identical generation requests.
//!
//! [`RequestCache`] memoises successful responses so that repeated requests
//! for the same (model, prompt, images) triple skip the network entirely.
//! It is in-memory only and explicitly **not** a durability mechanism; its
//! sole contract is response reuse within a process lifetime.
//!
//! # Keying
//!
//! The key combines model id, full prompt text, image count, and a cheap
//! tail fingerprint of each image payload — chosen specifically to avoid
//! hashing multi-megabyte base64 blobs in full. See [`cache_key`].
//!
//! # Eviction
//!
//! Insertion at capacity evicts the single entry with the oldest creation
//! timestamp. Timestamps are not refreshed on hits, so this is cheaper than
//! access-order LRU but can evict a hot entry before a cold one; the policy
//! is kept deliberately (see DESIGN.md).

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::telemetry;
use crate::types::{GenResponse, ImageInput};

/// Bytes of each image payload folded into the cache key.
const FINGERPRINT_TAIL_BYTES: usize = 64;

/// Configuration for the request cache.
///
/// ```rust
/// # use mockmill::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(100)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 50.
    pub max_entries: usize,
    /// Time-to-live for cached entries. Default: 30 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

struct Entry {
    response: GenResponse,
    created_at: Instant,
}

/// TTL + capacity bounded memo of prior successful responses.
///
/// Shared mutable state: the map sits behind a `Mutex` so concurrent
/// requests (including variation fan-out) see internally consistent reads.
/// The lock is never held across an await point.
pub struct RequestCache {
    entries: Mutex<HashMap<u64, Entry>>,
    config: CacheConfig,
}

impl RequestCache {
    /// Create a new request cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Look up a cached response.
    ///
    /// Returns a hit only if an entry exists and is younger than the TTL;
    /// an expired entry is removed and reported as a miss. Emits cache
    /// hit/miss metrics.
    pub fn get(&self, key: u64) -> Option<GenResponse> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(&key) {
            Some(entry) if entry.created_at.elapsed() < self.config.ttl => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry.response.clone())
            }
            Some(_) => {
                entries.remove(&key);
                debug!(key, "cache entry expired");
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert a response, evicting the oldest entry if at capacity.
    pub fn insert(&self, key: u64, response: GenResponse) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if entries.len() >= self.config.max_entries
            && !entries.contains_key(&key)
            && let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| *k)
        {
            entries.remove(&oldest);
            debug!(key = oldest, "evicted oldest cache entry");
        }
        entries.insert(
            key,
            Entry {
                response,
                created_at: Instant::now(),
            },
        );
    }

    /// Empty the cache.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Number of live entries (expired entries linger until read).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute a cache key from model, prompt, and image payloads.
///
/// Pure and deterministic: identical inputs always hash identically within
/// a process lifetime, and any change to the prompt text changes the key.
/// Uses `DefaultHasher` (SipHash) — sufficient for an in-memory cache; a
/// distributed backend would need a cross-process stable hash.
pub fn cache_key(model: &str, prompt: &str, images: &[ImageInput]) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    prompt.hash(&mut hasher);
    images.len().hash(&mut hasher);
    for image in images {
        image.mime_type.hash(&mut hasher);
        fingerprint(&image.data).hash(&mut hasher);
    }
    hasher.finish()
}

/// Cheap non-cryptographic fingerprint of a base64 payload.
///
/// Length plus the last [`FINGERPRINT_TAIL_BYTES`] bytes distinguishes
/// real-world images without walking megabytes of data.
fn fingerprint(data: &str) -> (usize, &[u8]) {
    let bytes = data.as_bytes();
    let tail = &bytes[bytes.len().saturating_sub(FINGERPRINT_TAIL_BYTES)..];
    (bytes.len(), tail)
}
