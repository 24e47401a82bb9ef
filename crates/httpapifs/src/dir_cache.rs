use crate::entry::EntryRecord;
use crate::path;
use std::collections::HashMap;

/// Per-directory listing cache.
///
/// A key is present only while its listing is believed current. There is no
/// TTL and no capacity bound; entries leave the cache only through
/// `invalidate`, `invalidate_tree` or `clear`.
#[derive(Debug, Default)]
pub struct DirCache {
    entries: HashMap<String, Vec<EntryRecord>>,
    stats: DirCacheStats,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub invalidations: u64,
    pub size: usize,
}

impl DirCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, dir: &str) -> Option<&[EntryRecord]> {
        match self.entries.get(dir) {
            Some(entries) => {
                self.stats.hits += 1;
                Some(entries.as_slice())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Outer `None`: listing unknown. Inner `None`: listing known, name absent.
    pub fn lookup(&mut self, dir: &str, name: &str) -> Option<Option<EntryRecord>> {
        self.get(dir)
            .map(|entries| entries.iter().find(|e| e.name == name).cloned())
    }

    pub fn put(&mut self, dir: impl Into<String>, entries: Vec<EntryRecord>) {
        self.entries.insert(dir.into(), entries);
        self.stats.insertions += 1;
    }

    pub fn invalidate(&mut self, dir: &str) -> bool {
        if self.entries.remove(dir).is_some() {
            self.stats.invalidations += 1;
            true
        } else {
            false
        }
    }

    /// Drops `dir` and every cached directory below it.
    pub fn invalidate_tree(&mut self, dir: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !path::is_within(dir, key));
        let removed = before - self.entries.len();
        self.stats.invalidations += removed as u64;
        removed
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.entries.contains_key(dir)
    }

    pub fn clear(&mut self) {
        self.stats.invalidations += self.entries.len() as u64;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> DirCacheStats {
        DirCacheStats {
            size: self.entries.len(),
            ..self.stats.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_listing() -> Vec<EntryRecord> {
        vec![
            EntryRecord::file("readme.txt", 120, 1000),
            EntryRecord::dir("img", None),
        ]
    }

    #[test]
    fn test_get_absent_is_miss() {
        let mut cache = DirCache::new();
        assert!(cache.get("/docs").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = DirCache::new();
        cache.put("/docs", docs_listing());

        let result = cache.get("/docs").unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_put_replaces_not_merges() {
        let mut cache = DirCache::new();
        cache.put("/docs", docs_listing());
        cache.put("/docs", vec![EntryRecord::file("other.txt", 1, 1)]);

        let result = cache.get("/docs").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "other.txt");
    }

    #[test]
    fn test_empty_listing_is_present() {
        let mut cache = DirCache::new();
        cache.put("/empty", Vec::new());

        assert_eq!(cache.get("/empty").map(|e| e.len()), Some(0));
        assert_eq!(cache.lookup("/empty", "anything"), Some(None));
    }

    #[test]
    fn test_lookup_distinguishes_unknown_from_absent() {
        let mut cache = DirCache::new();
        assert_eq!(cache.lookup("/docs", "readme.txt"), None);

        cache.put("/docs", docs_listing());
        assert_eq!(
            cache.lookup("/docs", "readme.txt"),
            Some(Some(EntryRecord::file("readme.txt", 120, 1000)))
        );
        assert_eq!(cache.lookup("/docs", "missing.txt"), Some(None));
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let mut cache = DirCache::new();
        cache.put("/docs", docs_listing());

        assert!(cache.invalidate("/docs"));
        assert!(cache.get("/docs").is_none());
        assert!(!cache.invalidate("/docs"));
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_invalidate_tree_drops_descendants_only() {
        let mut cache = DirCache::new();
        cache.put("/docs", docs_listing());
        cache.put("/docs/img", Vec::new());
        cache.put("/docs/img/thumbs", Vec::new());
        cache.put("/docsx", Vec::new());

        assert_eq!(cache.invalidate_tree("/docs/img"), 2);
        assert!(cache.contains("/docs"));
        assert!(cache.contains("/docsx"));
        assert!(!cache.contains("/docs/img/thumbs"));
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = DirCache::new();
        cache.put("/a", Vec::new());
        cache.put("/b", Vec::new());

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().invalidations, 2);

        cache.clear();
        assert_eq!(cache.stats().invalidations, 2);
    }
}
