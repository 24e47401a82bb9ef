//! Path to metadata resolution over the listing cache.
//!
//! The remote API can only list directories, so a node is found by looking
//! its name up in its parent's listing. A cold parent costs exactly one
//! `get`; a warm one costs nothing, including for names that are absent.

use crate::dir_cache::{DirCache, DirCacheStats};
use crate::entry::EntryRecord;
use crate::error::Result;
use crate::path;
use crate::remote::RemoteApi;
use crate::transport::HttpTransport;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct NodeResolver<T> {
    remote: RemoteApi<T>,
    // Locked per step, never across a remote call.
    cache: Mutex<DirCache>,
    root: String,
}

impl<T: HttpTransport> NodeResolver<T> {
    /// `root` is the listing key sent for the root directory.
    pub fn new(remote: RemoteApi<T>, root: impl Into<String>) -> Self {
        Self {
            remote,
            cache: Mutex::new(DirCache::new()),
            root: root.into(),
        }
    }

    pub fn remote(&self) -> &RemoteApi<T> {
        &self.remote
    }

    pub fn listing_key(&self, dir: &str) -> String {
        let dir = path::normalize(dir);
        if dir == path::ROOT {
            self.root.clone()
        } else {
            dir
        }
    }

    /// Resolves `path` to its entry record, or `None` if it does not exist.
    ///
    /// Checks the parent's cached listing unless `refresh` is set; on a miss
    /// fetches the parent once and checks the fresh listing. Never loops.
    pub fn resolve(&self, path: &str, refresh: bool) -> Result<Option<EntryRecord>> {
        let Some((parent, name)) = path::split(path) else {
            return Ok(Some(EntryRecord::dir(path::ROOT, None)));
        };
        let key = self.listing_key(&parent);

        if !refresh {
            if let Some(hit) = self.cache.lock().lookup(&key, &name) {
                debug!("resolve {}: cached listing of {}", path, key);
                return Ok(hit);
            }
        }

        let entries = self.fetch(&parent)?;
        Ok(entries.into_iter().find(|e| e.name == name))
    }

    /// The listing of `dir`, from the cache unless missing or `refresh` is set.
    pub fn listing(&self, dir: &str, refresh: bool) -> Result<Vec<EntryRecord>> {
        if !refresh {
            let key = self.listing_key(dir);
            if let Some(entries) = self.cache.lock().get(&key) {
                return Ok(entries.to_vec());
            }
        }
        self.fetch(dir)
    }

    /// Fetches `dir` from the remote and stores the result, even when empty.
    pub fn fetch(&self, dir: &str) -> Result<Vec<EntryRecord>> {
        let key = self.listing_key(dir);
        debug!("HTTP FETCH listing {}", key);
        let mut entries = self.remote.list(&key)?;

        let mut seen = HashSet::new();
        entries.retain(|entry| {
            let first = seen.insert(entry.name.clone());
            if !first {
                warn!("listing of {} repeats name {}, keeping the first", key, entry.name);
            }
            first
        });

        self.cache.lock().put(key, entries.clone());
        Ok(entries)
    }

    pub fn is_cached(&self, dir: &str) -> bool {
        self.cache.lock().contains(&self.listing_key(dir))
    }

    pub fn invalidate(&self, dir: &str) {
        let key = self.listing_key(dir);
        if self.cache.lock().invalidate(&key) {
            debug!("invalidated listing {}", key);
        }
    }

    /// Invalidates the listing that holds `path` itself.
    pub fn invalidate_parent(&self, path: &str) {
        if let Some(parent) = path::parent(path) {
            self.invalidate(&parent);
        }
    }

    /// Invalidates `dir` and all cached listings below it.
    pub fn invalidate_tree(&self, dir: &str) {
        if path::is_root(dir) {
            self.clear();
            return;
        }
        let removed = self.cache.lock().invalidate_tree(&path::normalize(dir));
        if removed > 0 {
            debug!("invalidated {} listings under {}", removed, dir);
        }
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> DirCacheStats {
        self.cache.lock().stats()
    }
}
