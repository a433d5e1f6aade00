//! Decoded image caching.
//!
//! Successful loads are kept in an LRU with a time-to-live; failed URLs are
//! remembered separately so a broken reference is only fetched once.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::{DecodedImage, ImageError, ImageLoader};

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of decoded images kept.
    pub max_entries: usize,
    /// How long a decoded image stays valid.
    pub ttl: Duration,
    /// Whether failed URLs are remembered.
    pub cache_failures: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(60 * 60), // 1 hour
            cache_failures: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub insertions: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    image: DecodedImage,
    expires_at: Instant,
}

/// Thread-safe image cache: URL → decoded image, URL → failure.
pub struct ImageCache {
    entries: Mutex<LruCache<Url, CacheEntry>>,
    failures: RwLock<HashSet<Url>>,
    stats: RwLock<CacheStats>,
    config: CacheConfig,
}

impl ImageCache {
    /// Create a new image cache with custom configuration.
    pub fn new(config: CacheConfig) -> Self {
        info!(
            max_entries = config.max_entries,
            ttl_secs = config.ttl.as_secs(),
            "Image cache initialized"
        );
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            failures: RwLock::new(HashSet::new()),
            stats: RwLock::new(CacheStats::default()),
            config,
        }
    }

    /// A default-configured cache ready to be shared between sessions.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(CacheConfig::default()))
    }

    /// Look up a decoded image.
    pub fn get(&self, url: &Url) -> Option<DecodedImage> {
        let mut entries = self.entries.lock().ok()?;
        let found = match entries.get(url) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.image),
            Some(_) => {
                trace!(url = %url, "Image cache entry expired");
                entries.pop(url);
                None
            }
            None => None,
        };
        drop(entries);

        if let Ok(mut stats) = self.stats.write() {
            if found.is_some() {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
        found
    }

    /// Store a decoded image.
    pub fn put(&self, url: Url, image: DecodedImage) {
        let entry = CacheEntry {
            image,
            expires_at: Instant::now() + self.config.ttl,
        };
        let Ok(mut entries) = self.entries.lock() else {
            warn!(url = %url, "Image cache lock poisoned");
            return;
        };
        let evicted = entries.push(url.clone(), entry);
        drop(entries);

        if let Ok(mut stats) = self.stats.write() {
            stats.insertions += 1;
            // push returns the replaced entry for the same key too
            if matches!(evicted, Some((ref old, _)) if *old != url) {
                stats.evictions += 1;
            }
        }
        debug!(url = %url, width = image.width, height = image.height, "Image cached");
    }

    /// Whether `url` is known to fail.
    pub fn has_failed(&self, url: &Url) -> bool {
        self.failures
            .read()
            .map(|failures| failures.contains(url))
            .unwrap_or(false)
    }

    /// Remember that `url` failed to load.
    pub fn mark_failed(&self, url: Url) {
        if !self.config.cache_failures {
            return;
        }
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(url);
        }
        if let Ok(mut stats) = self.stats.write() {
            stats.failures += 1;
        }
    }

    /// Resolve `url` through the cache, falling back to `loader`.
    pub fn get_or_load(
        &self,
        url: &Url,
        loader: &dyn ImageLoader,
    ) -> Result<DecodedImage, ImageError> {
        if self.has_failed(url) {
            trace!(url = %url, "Skipping known failed image");
            return Err(ImageError::KnownFailure(url.clone()));
        }
        if let Some(image) = self.get(url) {
            return Ok(image);
        }
        match loader.load(url) {
            Ok(image) => {
                self.put(url.clone(), image);
                Ok(image)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "Image load failed");
                self.mark_failed(url.clone());
                Err(err)
            }
        }
    }

    /// Drop all entries and failure marks.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
        info!("Image cache cleared");
    }

    /// Number of decoded images currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticImageLoader;
    use std::thread;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_get_or_load_caches_success() {
        let cache = ImageCache::default();
        let loader = StaticImageLoader::new()
            .with_image(url("mem://a.png"), DecodedImage::new(50.0, 40.0));

        let first = cache.get_or_load(&url("mem://a.png"), &loader).unwrap();
        let second = cache.get_or_load(&url("mem://a.png"), &loader).unwrap();
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_failure_is_remembered() {
        let cache = ImageCache::default();
        let loader = StaticImageLoader::new();

        let err = cache.get_or_load(&url("mem://missing.png"), &loader).unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
        assert!(cache.has_failed(&url("mem://missing.png")));

        let err = cache.get_or_load(&url("mem://missing.png"), &loader).unwrap_err();
        assert!(matches!(err, ImageError::KnownFailure(_)));
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ImageCache::new(CacheConfig {
            ttl: Duration::ZERO,
            ..CacheConfig::default()
        });
        cache.put(url("mem://a.png"), DecodedImage::new(1.0, 1.0));
        assert_eq!(cache.get(&url("mem://a.png")), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ImageCache::new(CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        });
        cache.put(url("mem://1"), DecodedImage::new(1.0, 1.0));
        cache.put(url("mem://2"), DecodedImage::new(2.0, 2.0));
        cache.put(url("mem://3"), DecodedImage::new(3.0, 3.0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&url("mem://1")), None);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = ImageCache::shared();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let u = url(&format!("mem://img{}", i % 2));
                    cache.put(u.clone(), DecodedImage::new(i as f32, 1.0));
                    cache.get(&u).is_some()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 2);
    }
}
