//! In-memory compiled asset cache.
//!
//! Maps request URLs to their compiled bytes. An entry is either present or
//! explicitly invalidated; a URL that was never built has no key at all. Entries are
//! trusted as-is while present: there is no timestamp or hash check, only the
//! invalidated marker set by a file watch.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stored cache value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// The source changed since this entry was built; recompute on next access
    Invalidated,
    /// Compiled output, served without revalidation
    Present(Bytes),
}

/// Result of looking up a URL, distinguishing "never built" from "stale".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// No key for this URL
    Absent,
    /// Key exists but holds the invalidated marker
    Invalidated,
    /// Compiled output ready to serve
    Present(Bytes),
}

impl CacheLookup {
    /// Returns the bytes for a present entry.
    pub fn present(self) -> Option<Bytes> {
        match self {
            CacheLookup::Present(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Check whether this lookup requires a recompute.
    pub fn is_miss(&self) -> bool {
        !matches!(self, CacheLookup::Present(_))
    }
}

/// Entry counts by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub present: usize,
    pub invalidated: usize,
}

/// Compiled asset cache shared by the request path and the watch callbacks.
///
/// Single-key updates and the [`invalidate_all`](Self::invalidate_all) sweep each
/// take the write lock, so they are atomic with respect to one another. A request
/// storing a brand new key while a sweep is pending may land before or after it.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
}

impl AssetCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a URL.
    pub fn lookup(&self, url: &str) -> CacheLookup {
        match self.entries.read().get(url) {
            None => CacheLookup::Absent,
            Some(CacheEntry::Invalidated) => CacheLookup::Invalidated,
            Some(CacheEntry::Present(bytes)) => CacheLookup::Present(bytes.clone()),
        }
    }

    /// Get the compiled bytes for a URL if the entry is present.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.lookup(url).present()
    }

    /// Store compiled output for a URL, replacing any invalidated marker.
    pub fn store(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        self.entries
            .write()
            .insert(url.into(), CacheEntry::Present(bytes.into()));
    }

    /// Mark a single URL as invalidated.
    ///
    /// The key is kept (or created) with the invalidated marker; it is never removed.
    /// Returns the entry that was replaced, if any.
    pub fn invalidate(&self, url: &str) -> Option<CacheEntry> {
        self.entries
            .write()
            .insert(url.to_string(), CacheEntry::Invalidated)
    }

    /// Mark every key currently in the cache as invalidated.
    ///
    /// Returns the number of keys swept. Bumps [`generation`](Self::generation).
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write();
        for entry in entries.values_mut() {
            *entry = CacheEntry::Invalidated;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.len()
    }

    /// Number of global sweeps performed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of keys, present or invalidated.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Count entries by state.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let present = entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Present(_)))
            .count();
        CacheStats {
            present,
            invalidated: entries.len() - present,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_absent() {
        let cache = AssetCache::new();
        assert_eq!(cache.lookup("/main.js"), CacheLookup::Absent);
        assert!(cache.get("/main.js").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_and_get() {
        let cache = AssetCache::new();
        cache.store("/main.js", b"console.log(1)".to_vec());

        assert_eq!(cache.get("/main.js").as_deref(), Some(&b"console.log(1)"[..]));
        assert!(!cache.lookup("/main.js").is_miss());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_keeps_key() {
        let cache = AssetCache::new();
        cache.store("/main.js", b"a".to_vec());

        let previous = cache.invalidate("/main.js");
        assert_eq!(previous, Some(CacheEntry::Present(Bytes::from_static(b"a"))));
        assert_eq!(cache.lookup("/main.js"), CacheLookup::Invalidated);
        assert!(cache.lookup("/main.js").is_miss());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_absent_inserts_marker() {
        let cache = AssetCache::new();
        assert_eq!(cache.invalidate("/never-built.js"), None);
        assert_eq!(cache.lookup("/never-built.js"), CacheLookup::Invalidated);
    }

    #[test]
    fn test_store_overwrites_invalidated() {
        let cache = AssetCache::new();
        cache.store("/main.js", b"old".to_vec());
        cache.invalidate("/main.js");
        cache.store("/main.js", b"new".to_vec());

        assert_eq!(cache.get("/main.js").as_deref(), Some(&b"new"[..]));
    }

    #[test]
    fn test_invalidate_only_touches_one_key() {
        let cache = AssetCache::new();
        cache.store("/a.js", b"a".to_vec());
        cache.store("/b.js", b"b".to_vec());

        cache.invalidate("/a.js");

        assert_eq!(cache.lookup("/a.js"), CacheLookup::Invalidated);
        assert_eq!(cache.get("/b.js").as_deref(), Some(&b"b"[..]));
    }

    #[test]
    fn test_invalidate_all() {
        let cache = AssetCache::new();
        cache.store("/a.js", b"a".to_vec());
        cache.store("/b.js", b"b".to_vec());
        cache.invalidate("/c.js");
        assert_eq!(cache.generation(), 0);

        let swept = cache.invalidate_all();

        assert_eq!(swept, 3);
        assert_eq!(cache.generation(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                present: 0,
                invalidated: 3
            }
        );
        // keys that did not exist are not created by the sweep
        assert_eq!(cache.lookup("/d.js"), CacheLookup::Absent);
    }

    #[test]
    fn test_stats() {
        let cache = AssetCache::new();
        cache.store("/a.js", b"a".to_vec());
        cache.store("/b.js", b"b".to_vec());
        cache.invalidate("/b.js");

        assert_eq!(
            cache.stats(),
            CacheStats {
                present: 1,
                invalidated: 1
            }
        );
    }
}
