// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Cache entries and their access metadata.

use std::{fmt, sync::Arc, time::Instant};

/// A cached result collection together with its access metadata.
///
/// Entries are created by the engine when a cache miss completes with a
/// non-empty result; empty results are never cached. The collection itself
/// is immutable once cached and is handed to callers by reference count.
/// The metadata records when the entry was created and how recently and how
/// often it has been read, which is what the orderings in
/// [`EvictionOrder`](crate::EvictionOrder) sort by.
pub struct CacheEntry<T> {
    items: Arc<[T]>,
    created: Instant,
    last_accessed: Instant,
    access_count: u64,
}

impl<T> CacheEntry<T> {
    /// Wraps a non-empty result collection.
    ///
    /// `last_accessed` starts out equal to `created`, so an entry that has
    /// never been read sorts as old as its creation under LRU.
    pub(crate) fn new(items: Arc<[T]>) -> Self {
        assert!(!items.is_empty(), "cache entries must hold at least one item");
        let now = Instant::now();
        Self {
            items,
            created: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Returns the cached collection, recording the access.
    ///
    /// Bumps `last_accessed` and `access_count` as a side effect; callers
    /// outside the engine lock must use [`Self::len`] instead.
    pub(crate) fn items(&mut self) -> Arc<[T]> {
        self.last_accessed = Instant::now();
        self.access_count += 1;
        Arc::clone(&self.items)
    }

    /// Number of cached items, without touching the access metadata.
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// When this entry was created.
    #[must_use]
    pub fn created(&self) -> Instant {
        self.created
    }

    /// When this entry was last read through [`items`](Self::items).
    #[must_use]
    pub fn last_accessed(&self) -> Instant {
        self.last_accessed
    }

    /// How many times this entry has been read.
    #[must_use]
    pub fn access_count(&self) -> u64 {
        self.access_count
    }
}

impl<T> fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("len", &self.items.len())
            .field("created", &self.created)
            .field("last_accessed", &self.last_accessed)
            .field("access_count", &self.access_count)
            .finish()
    }
}

#[cfg(test)]
impl<T> CacheEntry<T> {
    pub(crate) fn set_created(&mut self, created: Instant) {
        self.created = created;
    }

    pub(crate) fn set_last_accessed(&mut self, last_accessed: Instant) {
        self.last_accessed = last_accessed;
    }

    pub(crate) fn set_access_count(&mut self, access_count: u64) {
        self.access_count = access_count;
    }
}
