//! Read-through cache regions with coarse invalidation.
//!
//! One [`CacheRegion`] exists per entity family (see
//! [`EntityKind::cache_region`]). Any write to the family clears the whole
//! region. Each eviction bumps a generation counter and every entry carries
//! the generation it was loaded at. Lookups ignore entries from an older
//! generation, so a value stored by a read that raced a write is never
//! served, whichever side of the eviction its insert lands on.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::entity::{EntityKind, Scope};
use crate::types::DbId;

/// What a cached value was loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Item(EntityKind, DbId),
    All(EntityKind),
    Scope(EntityKind, Scope),
}

#[derive(Clone)]
struct Entry {
    generation: u64,
    value: Arc<dyn Any + Send + Sync>,
}

/// A named, concurrently accessible key/value region.
pub struct CacheRegion {
    name: &'static str,
    enabled: bool,
    generation: AtomicU64,
    entries: DashMap<CacheKey, Entry>,
}

impl fmt::Debug for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegion")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl CacheRegion {
    pub fn new(name: &'static str, enabled: bool) -> Self {
        Self {
            name,
            enabled,
            generation: AtomicU64::new(0),
            entries: DashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current generation; pass it back to [`CacheRegion::put_if_current`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cached value for `key`, if present and of type `T`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &CacheKey) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let current = self.generation();
        let entry = self.entries.get(key).map(|e| e.value().clone());
        let hit = match entry {
            Some(entry) if entry.generation == current => entry.value.downcast_ref::<T>().cloned(),
            Some(_) => {
                self.entries.remove_if(key, |_, e| e.generation != current);
                None
            }
            None => None,
        };
        tracing::debug!(region = self.name, ?key, hit = hit.is_some(), "Cache lookup");
        hit
    }

    /// Store a value under the current generation.
    pub fn put<T: Send + Sync + 'static>(&self, key: CacheKey, value: T) {
        self.put_if_current(self.generation(), key, value);
    }

    /// Store a value loaded while the region was at `generation`.
    ///
    /// Never served once the region has been evicted since.
    pub fn put_if_current<T: Send + Sync + 'static>(&self, generation: u64, key: CacheKey, value: T) {
        if !self.enabled || generation != self.generation() {
            return;
        }
        let entry = Entry {
            generation,
            value: Arc::new(value),
        };
        self.entries.insert(key, entry);
    }

    /// Clear every entry of the region.
    pub fn evict_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
        tracing::debug!(region = self.name, "Cache region evicted");
    }
}

/// Hands out the shared region for each entity family.
#[derive(Debug)]
pub struct CacheRegistry {
    enabled: bool,
    regions: DashMap<&'static str, Arc<CacheRegion>>,
}

impl CacheRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            regions: DashMap::new(),
        }
    }

    /// Region for `kind`, created on first use.
    pub fn region_for(&self, kind: EntityKind) -> Arc<CacheRegion> {
        let name = kind.cache_region();
        let region = self
            .regions
            .entry(name)
            .or_insert_with(|| Arc::new(CacheRegion::new(name, self.enabled)));
        Arc::clone(region.value())
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: CacheKey = CacheKey::Item(EntityKind::Movie, 1);

    #[test]
    fn get_returns_stored_value() {
        let region = CacheRegion::new("movieCache", true);
        region.put(KEY, "Alien".to_string());
        assert_eq!(region.get::<String>(&KEY).as_deref(), Some("Alien"));
    }

    #[test]
    fn get_with_wrong_type_misses() {
        let region = CacheRegion::new("movieCache", true);
        region.put(KEY, 5_i32);
        assert_eq!(region.get::<String>(&KEY), None);
    }

    #[test]
    fn evict_all_clears_every_key() {
        let region = CacheRegion::new("serieCache", true);
        region.put(CacheKey::All(EntityKind::Show), vec![1, 2]);
        region.put(CacheKey::Scope(EntityKind::Season, Scope::Parent(1)), vec![3]);
        region.evict_all();
        assert!(region.is_empty());
    }

    #[test]
    fn stale_generation_is_not_cached() {
        let region = CacheRegion::new("movieCache", true);
        let generation = region.generation();
        region.evict_all();
        region.put_if_current(generation, KEY, 1_i32);
        assert_eq!(region.get::<i32>(&KEY), None);
    }

    #[test]
    fn insert_landing_inside_an_eviction_is_not_served() {
        let region = CacheRegion::new("movieCache", true);
        let generation = region.generation();

        // The writer has bumped the generation but not yet cleared entries.
        region.generation.fetch_add(1, Ordering::AcqRel);
        region
            .entries
            .insert(KEY, Entry { generation, value: Arc::new(1_i32) });

        assert_eq!(region.get::<i32>(&KEY), None);
        assert!(region.is_empty());
    }

    #[test]
    fn insert_after_a_passed_check_is_not_served() {
        let region = CacheRegion::new("movieCache", true);
        let generation = region.generation();
        region.put_if_current(generation, KEY, 1_i32);

        // A write completes; a second racing read re-inserts its old value.
        region.evict_all();
        region
            .entries
            .insert(KEY, Entry { generation, value: Arc::new(1_i32) });

        assert_eq!(region.get::<i32>(&KEY), None);

        region.put(KEY, 2_i32);
        assert_eq!(region.get::<i32>(&KEY), Some(2));
    }

    #[test]
    fn disabled_region_never_hits() {
        let region = CacheRegion::new("movieCache", false);
        region.put(KEY, 1_i32);
        assert_eq!(region.get::<i32>(&KEY), None);
    }

    #[test]
    fn registry_shares_regions_within_a_family() {
        let registry = CacheRegistry::default();
        let shows = registry.region_for(EntityKind::Show);
        let episodes = registry.region_for(EntityKind::Episode);
        assert!(Arc::ptr_eq(&shows, &episodes));
        assert_eq!(shows.name(), "serieCache");
    }
}
