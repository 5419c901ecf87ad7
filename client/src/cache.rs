//! Bounded in-memory cache for downloaded images.

use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug)]
struct CachedImage {
    data: Bytes,
    last_used: u64,
}

/// URL-keyed image cache with least-recently-used eviction.
///
/// Safe to share across tasks; capacity zero disables caching.
#[derive(Debug)]
pub struct ImageCache {
    entries: DashMap<String, CachedImage>,
    capacity: usize,
    clock: AtomicU64,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            clock: AtomicU64::new(0),
        }
    }

    pub fn get(&self, url: &str) -> Option<Bytes> {
        let mut entry = self.entries.get_mut(url)?;
        entry.last_used = self.tick();
        Some(entry.data.clone())
    }

    pub fn insert(&self, url: impl Into<String>, data: Bytes) {
        if self.capacity == 0 {
            return;
        }

        let url = url.into();
        if !self.entries.contains_key(&url) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let last_used = self.tick();
        self.entries.insert(url, CachedImage { data, last_used });
    }

    pub fn remove(&self, url: &str) -> Option<Bytes> {
        self.entries.remove(url).map(|(_, image)| image.data)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn evict_oldest(&self) -> bool {
        // The iterator holds shard read locks; collect the key before removing
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().last_used)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(url) => {
                debug!("Evicting cached image {}", url);
                self.entries.remove(&url).is_some()
            }
            None => false,
        }
    }
}
