//! Application state and shared resources.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use lru::LruCache;
use projection::{MapProjection, ProjectionResult, Rotation, ViewLut};
use renderer::SourceRaster;
use tracing::{debug, info};

use crate::config::MapApiConfig;
use crate::metrics;

/// Identifies one cached view: output size, projection and the exact
/// rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub width: usize,
    pub height: usize,
    pub projection: MapProjection,
    rotation_bits: [u64; 4],
}

impl ViewKey {
    pub fn new(width: usize, height: usize, projection: MapProjection, rotation: &Rotation) -> Self {
        let q = rotation.quaternion();
        Self {
            width,
            height,
            projection,
            rotation_bits: [q.w.to_bits(), q.i.to_bits(), q.j.to_bits(), q.k.to_bits()],
        }
    }
}

/// LRU cache of view lookup tables bounded by entry count and total bytes.
pub struct LutCache {
    entries: LruCache<ViewKey, Arc<ViewLut>>,
    memory_limit: usize,
    current_memory: usize,
}

impl LutCache {
    pub fn new(capacity: usize, memory_limit: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            memory_limit,
            current_memory: 0,
        }
    }

    pub fn get(&mut self, key: &ViewKey) -> Option<Arc<ViewLut>> {
        self.entries.get(key).cloned()
    }

    /// Insert a LUT, evicting least recently used entries until it fits.
    ///
    /// Returns false, leaving the cache untouched, when the LUT alone is
    /// larger than the memory limit.
    pub fn insert(&mut self, key: ViewKey, lut: Arc<ViewLut>) -> bool {
        let size = lut.memory_bytes();
        if size > self.memory_limit {
            return false;
        }

        if let Some(old) = self.entries.pop(&key) {
            self.current_memory = self.current_memory.saturating_sub(old.memory_bytes());
        }
        while self.current_memory.saturating_add(size) > self.memory_limit {
            match self.entries.pop_lru() {
                Some((_, evicted)) => {
                    self.current_memory =
                        self.current_memory.saturating_sub(evicted.memory_bytes());
                }
                None => break,
            }
        }

        // Displaced by the entry-count bound.
        if let Some((_, evicted)) = self.entries.push(key, lut) {
            self.current_memory = self.current_memory.saturating_sub(evicted.memory_bytes());
        }
        self.current_memory += size;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes held by cached LUTs.
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.memory_limit
    }
}

/// Shared application state.
pub struct AppState {
    pub config: MapApiConfig,
    pub raster: Arc<SourceRaster>,
    luts: Mutex<LutCache>,
}

impl AppState {
    /// Load the source image named by the configuration.
    pub fn new(config: MapApiConfig) -> Result<Self> {
        let raster = SourceRaster::load(&config.image_path, config.downscale_factor)?;
        Ok(Self::with_raster(config, raster))
    }

    /// Build state around an already loaded raster.
    pub fn with_raster(config: MapApiConfig, raster: SourceRaster) -> Self {
        let luts = LutCache::new(config.lut_cache_capacity, config.lut_cache_max_bytes);
        info!(
            width = raster.width(),
            height = raster.height(),
            lut_cache_capacity = config.lut_cache_capacity,
            lut_cache_max_bytes = luts.memory_limit(),
            "Initialized map state"
        );
        Self {
            config,
            raster: Arc::new(raster),
            luts: Mutex::new(luts),
        }
    }

    /// Fetch the lookup table for a view, building and caching it on a miss.
    ///
    /// The lock is not held while building, so two concurrent misses for the
    /// same view may both build it; the later insert wins. A LUT larger than
    /// the cache's byte limit is returned without being cached.
    pub fn view_lut(
        &self,
        width: usize,
        height: usize,
        rotation: &Rotation,
        projection: MapProjection,
    ) -> ProjectionResult<Arc<ViewLut>> {
        let key = ViewKey::new(width, height, projection, rotation);

        if let Some(lut) = self.lock_luts().get(&key) {
            metrics::record_lut_cache(true);
            return Ok(lut);
        }
        metrics::record_lut_cache(false);

        let lut = Arc::new(ViewLut::build(
            width,
            height,
            rotation,
            projection,
            self.raster.width(),
            self.raster.height(),
        )?);

        let mut luts = self.lock_luts();
        if !luts.insert(key, Arc::clone(&lut)) {
            debug!(
                width,
                height,
                bytes = lut.memory_bytes(),
                limit = luts.memory_limit(),
                "View LUT exceeds cache limit, not cached"
            );
        }
        metrics::record_lut_cache_bytes(luts.memory_usage());
        Ok(lut)
    }

    /// Number of cached lookup tables.
    pub fn cached_views(&self) -> usize {
        self.lock_luts().len()
    }

    /// Bytes held by cached lookup tables.
    pub fn cached_bytes(&self) -> usize {
        self.lock_luts().memory_usage()
    }

    fn lock_luts(&self) -> std::sync::MutexGuard<'_, LutCache> {
        // A panic while holding the lock leaves the cache itself consistent.
        self.luts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_quadrant_world;

    /// An 8x8 LUT: 64 coordinates plus one bitmap word.
    const SMALL_LUT_BYTES: usize = 64 * 16 + 8;

    fn state(capacity: usize) -> AppState {
        state_with_limit(capacity, MapApiConfig::default().lut_cache_max_bytes)
    }

    fn state_with_limit(capacity: usize, max_bytes: usize) -> AppState {
        let config = MapApiConfig {
            lut_cache_capacity: capacity,
            lut_cache_max_bytes: max_bytes,
            ..MapApiConfig::default()
        };
        let raster = SourceRaster::new(36, 18, create_quadrant_world(36, 18)).unwrap();
        AppState::with_raster(config, raster)
    }

    #[test]
    fn test_view_lut_is_cached() {
        let state = state(4);
        let rotation = Rotation::from_degrees(10.0, 20.0, 0.0).unwrap();

        let first = state
            .view_lut(16, 16, &rotation, MapProjection::Orthographic)
            .unwrap();
        let second = state
            .view_lut(16, 16, &rotation, MapProjection::Orthographic)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.cached_views(), 1);
    }

    #[test]
    fn test_distinct_views_get_distinct_entries() {
        let state = state(4);
        let rotation = Rotation::identity();
        state.view_lut(16, 16, &rotation, MapProjection::Orthographic).unwrap();
        state.view_lut(16, 16, &rotation, MapProjection::Mercator).unwrap();
        state.view_lut(32, 16, &rotation, MapProjection::Equirectangular).unwrap();
        assert_eq!(state.cached_views(), 3);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let state = state(2);
        for lon in [0.0, 10.0, 20.0] {
            let rotation = Rotation::from_degrees(0.0, lon, 0.0).unwrap();
            state.view_lut(8, 8, &rotation, MapProjection::Mercator).unwrap();
        }
        assert_eq!(state.cached_views(), 2);
    }

    #[test]
    fn test_cache_evicts_past_byte_limit() {
        let state = state_with_limit(16, 2 * SMALL_LUT_BYTES + 100);
        for lon in [0.0, 10.0, 20.0, 30.0] {
            let rotation = Rotation::from_degrees(0.0, lon, 0.0).unwrap();
            state.view_lut(8, 8, &rotation, MapProjection::Mercator).unwrap();
            assert!(state.cached_bytes() <= 2 * SMALL_LUT_BYTES + 100);
        }
        assert_eq!(state.cached_views(), 2);
        assert_eq!(state.cached_bytes(), 2 * SMALL_LUT_BYTES);

        // The most recent view survived eviction.
        let latest = Rotation::from_degrees(0.0, 30.0, 0.0).unwrap();
        let a = state.view_lut(8, 8, &latest, MapProjection::Mercator).unwrap();
        let b = state.view_lut(8, 8, &latest, MapProjection::Mercator).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(state.cached_views(), 2);
    }

    #[test]
    fn test_oversized_lut_is_served_but_not_cached() {
        let state = state_with_limit(16, SMALL_LUT_BYTES);
        let rotation = Rotation::identity();

        state.view_lut(8, 8, &rotation, MapProjection::Orthographic).unwrap();
        assert_eq!(state.cached_views(), 1);

        let large = state
            .view_lut(32, 32, &rotation, MapProjection::Orthographic)
            .unwrap();
        assert_eq!((large.width(), large.height()), (32, 32));
        assert!(large.memory_bytes() > SMALL_LUT_BYTES);

        // The small entry is kept and the large one was never inserted.
        assert_eq!(state.cached_views(), 1);
        assert_eq!(state.cached_bytes(), SMALL_LUT_BYTES);
    }

    #[test]
    fn test_lut_cache_accounts_for_replacement_and_count_eviction() {
        let lut = |w: usize| Arc::new(ViewLut::new(w, 8));
        let key = |w: usize| ViewKey::new(w, 8, MapProjection::Mercator, &Rotation::identity());
        let mut cache = LutCache::new(2, usize::MAX);

        assert!(cache.insert(key(8), lut(8)));
        assert!(cache.insert(key(8), lut(8)));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_usage(), SMALL_LUT_BYTES);

        assert!(cache.insert(key(16), lut(16)));
        assert!(cache.insert(key(24), lut(24)));
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.memory_usage(),
            lut(16).memory_bytes() + lut(24).memory_bytes()
        );
        assert!(cache.get(&key(8)).is_none());
    }

    #[test]
    fn test_view_key_distinguishes_rotation() {
        let a = ViewKey::new(8, 8, MapProjection::Mercator, &Rotation::identity());
        let b = ViewKey::new(
            8,
            8,
            MapProjection::Mercator,
            &Rotation::from_degrees(0.0, 1.0, 0.0).unwrap(),
        );
        assert_ne!(a, b);
        assert_eq!(
            a,
            ViewKey::new(8, 8, MapProjection::Mercator, &Rotation::identity())
        );
    }
}
