//! L1 in-memory suggestion cache using moka.
//!
//! Holds live suggestions only; the store stays authoritative.
//!
//! Fills race with invalidation: a caller may read a live row, lose the CPU
//! while another caller invalidates it, then insert the stale copy. Every
//! fill therefore carries the epoch observed before its store read, and is
//! evicted again if an invalidation has bumped the epoch since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sift_core::{CacheKey, Suggestion};

#[derive(Clone)]
pub struct SuggestionCache {
    cache: Cache<CacheKey, Suggestion>,
    epoch: Arc<AtomicU64>,
}

impl SuggestionCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self {
            cache,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Suggestion> {
        self.cache.get(key)
    }

    /// Take before reading the store; pass to [`SuggestionCache::insert`].
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Only live suggestions read at `epoch` with no invalidation since are kept.
    pub fn insert(&self, key: CacheKey, suggestion: Suggestion, epoch: u64) {
        if !suggestion.is_live() {
            return;
        }
        self.cache.insert(key.clone(), suggestion);
        // Checked after the insert so an invalidation landing in between is seen.
        if self.epoch() != epoch {
            self.cache.invalidate(&key);
        }
    }

    /// Call after the store has marked the rows invalidated.
    pub fn invalidate(&self, keys: &[CacheKey]) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        for key in keys {
            self.cache.invalidate(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sift_core::ConfidenceBand;

    fn suggestion(invalidated: bool) -> Suggestion {
        Suggestion {
            suggestion_id: "s1".to_string(),
            ticket_id: "t1".to_string(),
            intent_id: Some("i1".to_string()),
            response_text: "hello".to_string(),
            confidence_score: 0.9,
            band: ConfidenceBand::High,
            similar_ticket_ids: vec![],
            prompt_version: 0,
            snapshot_version: None,
            created_at: Utc::now(),
            invalidated_at: invalidated.then(Utc::now),
        }
    }

    #[test]
    fn insert_get_invalidate() {
        let cache = SuggestionCache::new(10);
        let key = CacheKey::new("t1", "i1", 0);
        cache.insert(key.clone(), suggestion(false), cache.epoch());
        assert_eq!(cache.get(&key).map(|s| s.suggestion_id), Some("s1".to_string()));
        cache.invalidate(&[key.clone()]);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn fill_read_before_an_invalidation_is_dropped() {
        let cache = SuggestionCache::new(10);
        let key = CacheKey::new("t1", "i1", 0);

        // Row read while live, then invalidated elsewhere before the fill lands.
        let epoch = cache.epoch();
        let read = suggestion(false);
        cache.invalidate(&[key.clone()]);
        cache.insert(key.clone(), read, epoch);
        assert!(cache.get(&key).is_none());

        // A fresh read after the invalidation is cached normally.
        cache.insert(key.clone(), suggestion(false), cache.epoch());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn clones_share_the_epoch() {
        let cache = SuggestionCache::new(10);
        let job_side = cache.clone();
        let key = CacheKey::new("t1", "i1", 0);
        let epoch = job_side.epoch();
        cache.invalidate(&[key.clone()]);
        job_side.insert(key.clone(), suggestion(false), epoch);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn invalidated_rows_are_not_admitted() {
        let cache = SuggestionCache::new(10);
        let key = CacheKey::new("t1", "i1", 0);
        cache.insert(key.clone(), suggestion(true), cache.epoch());
        assert!(cache.get(&key).is_none());
    }
}
