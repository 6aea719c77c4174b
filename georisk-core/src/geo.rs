//! Geographic value types and great-circle distance
//!
//! Global invariants enforced:
//! - A `GeographicPoint` always holds -90..=90 latitude and -180..=180 longitude
//! - A `HazardSource` always has a positive, finite influence radius
//! - Distances are non-negative and symmetric

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validated latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeographicPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPoint> for GeographicPoint {
    type Error = ValidationError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeographicPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeographicPoint {
    /// Create a point, rejecting out-of-range or non-finite coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(GeographicPoint {
            latitude,
            longitude,
        })
    }

    /// Build from coordinates already known to be in range (rounded cache keys)
    pub(crate) fn from_trusted(latitude: f64, longitude: f64) -> Self {
        debug_assert!((-90.0..=90.0).contains(&latitude));
        debug_assert!((-180.0..=180.0).contains(&longitude));
        GeographicPoint {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A located hazard origin (fault segment, river, active fire, coastline)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHazardSource")]
pub struct HazardSource {
    location: GeographicPoint,
    intensity: f64,
    influence_radius_km: f64,
}

#[derive(Deserialize)]
struct RawHazardSource {
    location: GeographicPoint,
    intensity: f64,
    influence_radius_km: f64,
}

impl TryFrom<RawHazardSource> for HazardSource {
    type Error = ValidationError;

    fn try_from(raw: RawHazardSource) -> Result<Self, Self::Error> {
        HazardSource::new(raw.location, raw.intensity, raw.influence_radius_km)
    }
}

impl HazardSource {
    /// Create a source; `intensity` is a unitless potential (typically 0-10)
    pub fn new(
        location: GeographicPoint,
        intensity: f64,
        influence_radius_km: f64,
    ) -> Result<Self, ValidationError> {
        if !(intensity.is_finite() && intensity >= 0.0) {
            return Err(ValidationError::InvalidIntensity(intensity));
        }
        if !(influence_radius_km.is_finite() && influence_radius_km > 0.0) {
            return Err(ValidationError::NonPositiveRadius(influence_radius_km));
        }
        Ok(HazardSource {
            location,
            intensity,
            influence_radius_km,
        })
    }

    pub fn location(&self) -> GeographicPoint {
        self.location
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn influence_radius_km(&self) -> f64 {
        self.influence_radius_km
    }
}

/// Great-circle distance in kilometres (haversine, R = 6371 km)
///
/// h = sin²(Δlat/2) + cos(lat_a)·cos(lat_b)·sin²(Δlon/2)
/// d = 2R·asin(√h)
///
/// Well-defined over the full coordinate range, including the poles and the
/// antimeridian. `h` is clamped to 1.0 against rounding just above it for
/// antipodal points.
pub fn haversine_km(a: &GeographicPoint, b: &GeographicPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeographicPoint {
        GeographicPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_reject_out_of_range_latitude() {
        assert_eq!(
            GeographicPoint::new(90.5, 0.0),
            Err(ValidationError::LatitudeOutOfRange(90.5))
        );
        assert!(GeographicPoint::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn test_reject_out_of_range_longitude() {
        assert_eq!(
            GeographicPoint::new(0.0, -180.01),
            Err(ValidationError::LongitudeOutOfRange(-180.01))
        );
    }

    #[test]
    fn test_reject_nan_coordinates() {
        assert!(GeographicPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeographicPoint::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_boundary_coordinates_accepted() {
        assert!(GeographicPoint::new(90.0, 180.0).is_ok());
        assert!(GeographicPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: GeographicPoint =
            serde_json::from_str(r#"{"latitude": 37.77, "longitude": -122.42}"#).unwrap();
        assert_eq!(ok.latitude(), 37.77);

        let bad: Result<GeographicPoint, _> =
            serde_json::from_str(r#"{"latitude": 137.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_hazard_source_rejects_non_positive_radius() {
        let loc = point(0.0, 0.0);
        assert_eq!(
            HazardSource::new(loc, 5.0, 0.0),
            Err(ValidationError::NonPositiveRadius(0.0))
        );
        assert!(HazardSource::new(loc, 5.0, -10.0).is_err());
        assert!(HazardSource::new(loc, -1.0, 10.0).is_err());
        assert!(HazardSource::new(loc, 5.0, 10.0).is_ok());
    }

    #[test]
    fn test_san_francisco_to_los_angeles() {
        let sf = point(37.7749, -122.4194);
        let la = point(34.0522, -118.2437);
        let d = haversine_km(&sf, &la);
        assert!(d > 550.0 && d < 560.0, "got {}", d);
    }

    #[test]
    fn test_identical_points_are_zero() {
        let p = point(51.5074, -0.1278);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = point(-33.8688, 151.2093);
        let b = point(35.6762, 139.6503);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn test_antimeridian_is_short() {
        // One degree of longitude across the date line at the equator
        let a = point(0.0, 179.5);
        let b = point(0.0, -179.5);
        let d = haversine_km(&a, &b);
        assert!((d - 111.19).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        let a = point(0.0, 0.0);
        let b = point(0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((haversine_km(&a, &b) - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_pole_to_pole() {
        let north = point(90.0, 0.0);
        let south = point(-90.0, 45.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((haversine_km(&north, &south) - half_circumference).abs() < 1e-6);
    }
}
