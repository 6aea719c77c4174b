//! Bounded LRU cache for great-circle distances.
//!
//! Cache key: both endpoints rounded to `precision` decimal places (default 4,
//! about 11 m), stored as scaled integers so that equality is exact. The
//! two endpoints are ordered inside the key, so `(a, b)` and `(b, a)` share one
//! entry.
//!
//! **Rounding is part of the value, not only the key.** The distance stored for
//! a key is computed from the rounded coordinates, never from whichever raw
//! point happened to miss first. Two lookups that round to the same pair
//! therefore return bit-identical results, even after the entry was evicted
//! and recomputed. The cost is a positional error of at most half a unit in the
//! last kept decimal.
//!
//! **Eviction:** on insert past capacity the least-recently-used entry is
//! dropped. Entries are never updated: a key always maps to the same distance.
//!
//! **Locking:** lookup-or-insert, the LRU touch and eviction all happen under a
//! single mutex held for the whole operation. The haversine evaluation is cheap
//! enough to run inside it, which also prevents two callers from computing the
//! same miss twice.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, GeographicPoint};

/// Default number of cached coordinate pairs
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Default key precision in decimal places (~11 m at the equator)
pub const DEFAULT_CACHE_PRECISION: u32 = 4;

/// Highest supported key precision; keeps quantized coordinates inside i64
pub const MAX_CACHE_PRECISION: u32 = 10;

/// Normalized cache key: two quantized endpoints in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    first: (i64, i64),
    second: (i64, i64),
}

impl CacheKey {
    /// Build the key for a coordinate pair at the given precision.
    pub fn new(a: &GeographicPoint, b: &GeographicPoint, precision: u32) -> Self {
        let scale = scale_for(precision);
        let qa = quantize(a, scale);
        let qb = quantize(b, scale);
        if qa <= qb {
            CacheKey {
                first: qa,
                second: qb,
            }
        } else {
            CacheKey {
                first: qb,
                second: qa,
            }
        }
    }

    /// Rounded endpoints the cached distance is computed from
    fn endpoints(&self, scale: f64) -> (GeographicPoint, GeographicPoint) {
        (dequantize(self.first, scale), dequantize(self.second, scale))
    }
}

fn scale_for(precision: u32) -> f64 {
    10f64.powi(precision.min(MAX_CACHE_PRECISION) as i32)
}

fn quantize(p: &GeographicPoint, scale: f64) -> (i64, i64) {
    (
        (p.latitude() * scale).round() as i64,
        (p.longitude() * scale).round() as i64,
    )
}

fn dequantize(q: (i64, i64), scale: f64) -> GeographicPoint {
    // Rounding cannot leave the valid range: the bounds are whole degrees
    GeographicPoint::from_trusted(q.0 as f64 / scale, q.1 as f64 / scale)
}

/// Snapshot of cache occupancy and effectiveness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_max_size: usize,
    /// `cache_size / cache_max_size`, in 0..=1
    pub cache_utilization: f64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CacheState {
    entries: LruCache<CacheKey, f64>,
    hits: u64,
    misses: u64,
}

/// Distance cache owned by one engine instance
#[derive(Debug)]
pub struct GeoDistanceCache {
    precision: u32,
    scale: f64,
    capacity: NonZeroUsize,
    state: Mutex<CacheState>,
}

impl GeoDistanceCache {
    pub fn new(capacity: NonZeroUsize, precision: u32) -> Self {
        let precision = precision.min(MAX_CACHE_PRECISION);
        GeoDistanceCache {
            precision,
            scale: scale_for(precision),
            capacity,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Cached great-circle distance in kilometres between two points.
    pub fn distance_km(&self, a: &GeographicPoint, b: &GeographicPoint) -> f64 {
        let key = CacheKey::new(a, b, self.precision);
        let mut state = self.lock();

        if let Some(&distance) = state.entries.get(&key) {
            state.hits += 1;
            return distance;
        }

        state.misses += 1;
        let (first, second) = key.endpoints(self.scale);
        let distance = haversine_km(&first, &second);
        if let Some((evicted, _)) = state.entries.push(key, distance) {
            tracing::debug!(?evicted, "distance cache full, evicted least recently used pair");
        }
        distance
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
        tracing::debug!(dropped, "distance cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let size = state.entries.len();
        CacheStats {
            cache_size: size,
            cache_max_size: self.capacity.get(),
            cache_utilization: size as f64 / self.capacity.get() as f64,
            hits: state.hits,
            misses: state.misses,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    // The cache only ever holds complete (key, distance) pairs, so a panic in
    // another holder cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for GeoDistanceCache {
    fn default() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        GeoDistanceCache::new(capacity, DEFAULT_CACHE_PRECISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeographicPoint {
        GeographicPoint::new(lat, lon).unwrap()
    }

    fn cache(capacity: usize) -> GeoDistanceCache {
        GeoDistanceCache::new(NonZeroUsize::new(capacity).unwrap(), DEFAULT_CACHE_PRECISION)
    }

    #[test]
    fn test_key_is_order_independent() {
        let a = point(37.7749, -122.4194);
        let b = point(34.0522, -118.2437);
        assert_eq!(CacheKey::new(&a, &b, 4), CacheKey::new(&b, &a, 4));
    }

    #[test]
    fn test_near_duplicates_share_a_key() {
        let a = point(37.77491, -122.41942);
        let a2 = point(37.774912, -122.419418);
        let b = point(34.0522, -118.2437);
        assert_eq!(CacheKey::new(&a, &b, 4), CacheKey::new(&a2, &b, 4));
        assert_ne!(CacheKey::new(&a, &b, 6), CacheKey::new(&a2, &b, 6));
    }

    #[test]
    fn test_repeat_lookup_hits() {
        let c = cache(10);
        let a = point(10.0, 10.0);
        let b = point(11.0, 11.0);

        let first = c.distance_km(&a, &b);
        let second = c.distance_km(&a, &b);
        let reversed = c.distance_km(&b, &a);

        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(first.to_bits(), reversed.to_bits());
        let stats = c.stats();
        assert_eq!(stats.cache_size, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_bit_identical_after_eviction() {
        let c = cache(1);
        let a = point(10.00001, 10.0);
        let a_close = point(10.00002, 10.0);
        let b = point(11.0, 11.0);
        let other = point(-20.0, 40.0);

        let before = c.distance_km(&a, &b);
        c.distance_km(&a, &other); // evicts (a, b)
        let after = c.distance_km(&a_close, &b);

        assert_eq!(before.to_bits(), after.to_bits());
        assert_eq!(c.stats().misses, 3);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let c = cache(5);
        let origin = point(0.0, 0.0);
        for i in 0..20 {
            c.distance_km(&origin, &point(i as f64, 1.0));
            assert!(c.len() <= 5);
        }
        let stats = c.stats();
        assert_eq!(stats.cache_size, 5);
        assert_eq!(stats.cache_utilization, 1.0);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let c = cache(2);
        let origin = point(0.0, 0.0);
        let p1 = point(1.0, 1.0);
        let p2 = point(2.0, 2.0);
        let p3 = point(3.0, 3.0);

        c.distance_km(&origin, &p1);
        c.distance_km(&origin, &p2);
        c.distance_km(&origin, &p1); // p1 is now most recent
        c.distance_km(&origin, &p3); // evicts p2

        let misses_before = c.stats().misses;
        c.distance_km(&origin, &p1);
        assert_eq!(c.stats().misses, misses_before, "p1 should still be cached");
        c.distance_km(&origin, &p2);
        assert_eq!(c.stats().misses, misses_before + 1, "p2 should have been evicted");
    }

    #[test]
    fn test_clear_resets_everything() {
        let c = cache(10);
        c.distance_km(&point(1.0, 1.0), &point(2.0, 2.0));
        c.distance_km(&point(1.0, 1.0), &point(2.0, 2.0));
        c.clear();
        let stats = c.stats();
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert!(c.is_empty());
    }

    #[test]
    fn test_rounded_distance_close_to_exact() {
        let c = cache(10);
        let a = point(37.774929, -122.419416);
        let b = point(34.052234, -118.243685);
        let cached = c.distance_km(&a, &b);
        let exact = haversine_km(&a, &b);
        assert!((cached - exact).abs() < 0.05, "cached {} exact {}", cached, exact);
    }

    #[test]
    fn test_shared_across_threads() {
        let c = cache(64);
        let origin = point(0.0, 0.0);
        std::thread::scope(|s| {
            for t in 0..4 {
                let c = &c;
                s.spawn(move || {
                    for i in 0..32 {
                        let p = point(((i + t) % 16) as f64, 0.0);
                        c.distance_km(&origin, &p);
                    }
                });
            }
        });
        let stats = c.stats();
        assert_eq!(stats.cache_size, 16);
        assert_eq!(stats.hits + stats.misses, 128);
        assert_eq!(stats.misses, 16);
    }
}
