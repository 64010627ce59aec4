// Copyright (c) The Memoir Project Authors.
// Licensed under the MIT License.

//! Eviction orderings over cache entries.

use crate::memoizer::CacheMap;

/// Ordering used to pick eviction victims when the item budget is exceeded.
///
/// Each ordering is a pure total order over the cached entries; the engine
/// removes entries from the front of the order until enough room has been
/// freed. The active ordering is swappable at any time through
/// [`Memoizer::set_eviction_order`](crate::Memoizer::set_eviction_order).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvictionOrder {
    /// Least-recently-used: entries with the oldest read go first.
    #[default]
    Lru,
    /// Least-used: entries with the fewest reads go first.
    LeastUsed,
    /// Oldest-first: entries created earliest go first, regardless of how
    /// recently or how often they were read.
    Fifo,
}

impl EvictionOrder {
    /// Ranks every cached entry from first-evicted to last-evicted.
    ///
    /// Reads only the non-mutating metadata accessors, so ranking never
    /// perturbs the very ordering it computes.
    pub(crate) fn rank<T>(self, cache: &CacheMap<T>) -> Vec<String> {
        let mut pairs: Vec<_> = cache.iter().collect();
        match self {
            Self::Lru => pairs.sort_by_key(|(_, entry)| entry.last_accessed()),
            Self::LeastUsed => pairs.sort_by_key(|(_, entry)| entry.access_count()),
            Self::Fifo => pairs.sort_by_key(|(_, entry)| entry.created()),
        }
        pairs.into_iter().map(|(key, _)| key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::entry::CacheEntry;

    fn entry(items: usize) -> CacheEntry<u32> {
        CacheEntry::new(vec![0; items].into())
    }

    fn cache_of(entries: Vec<(&str, CacheEntry<u32>)>) -> CacheMap<u32> {
        entries.into_iter().map(|(k, e)| (k.to_owned(), e)).collect()
    }

    #[test]
    fn lru_ranks_oldest_access_first() {
        let now = Instant::now();
        let mut recent = entry(1);
        recent.set_last_accessed(now);
        let mut stale = entry(1);
        stale.set_last_accessed(now - Duration::from_secs(60));

        let cache = cache_of(vec![("recent", recent), ("stale", stale)]);
        let ranked = EvictionOrder::Lru.rank(&cache);
        assert_eq!(ranked, vec!["stale".to_owned(), "recent".to_owned()]);
    }

    #[test]
    fn least_used_ranks_fewest_reads_first() {
        let mut hot = entry(1);
        hot.set_access_count(40);
        let mut warm = entry(1);
        warm.set_access_count(3);
        let cold = entry(1);

        let cache = cache_of(vec![("hot", hot), ("warm", warm), ("cold", cold)]);
        let ranked = EvictionOrder::LeastUsed.rank(&cache);
        assert_eq!(ranked, vec!["cold".to_owned(), "warm".to_owned(), "hot".to_owned()]);
    }

    #[test]
    fn fifo_ignores_access_pattern() {
        let now = Instant::now();
        let mut old = entry(1);
        old.set_created(now - Duration::from_secs(120));
        old.set_access_count(100);
        old.set_last_accessed(now);
        let mut young = entry(1);
        young.set_created(now);

        let cache = cache_of(vec![("old", old), ("young", young)]);
        let ranked = EvictionOrder::Fifo.rank(&cache);
        assert_eq!(ranked, vec!["old".to_owned(), "young".to_owned()]);
    }
}
