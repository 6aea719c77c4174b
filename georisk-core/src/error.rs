//! Error types for the risk engine
//!
//! Two families:
//! - `ValidationError`: a value object (point, source, event, request) is out of range
//! - `ConfigError`: an `AssessmentConfig` cannot be built from the given options
//!
//! Missing data is never an error. Empty source lists, empty event lists and
//! empty score maps degrade to zero contributions.

use crate::hazard::HazardType;
use thiserror::Error;

/// A caller-supplied value violates its documented range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid latitude: {0} (expected -90..=90)")]
    LatitudeOutOfRange(f64),

    #[error("invalid longitude: {0} (expected -180..=180)")]
    LongitudeOutOfRange(f64),

    #[error("influence_radius_km must be positive and finite (got {0})")]
    NonPositiveRadius(f64),

    #[error("intensity must be non-negative and finite (got {0})")]
    InvalidIntensity(f64),

    #[error("severity must be within 0..=10 (got {0})")]
    SeverityOutOfRange(f64),

    #[error("impact_radius_km must be positive and finite (got {0})")]
    InvalidImpactRadius(f64),

    #[error("event date {event_date} is after the reference date {as_of}")]
    EventInFuture {
        event_date: chrono::NaiveDate,
        as_of: chrono::NaiveDate,
    },

    #[error("hazard {0} requested more than once")]
    DuplicateHazard(HazardType),
}

/// An assessment configuration failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weights.{hazard} must sum to 1.0 (got {sum:.4})")]
    WeightSum { hazard: HazardType, sum: f64 },

    #[error("weights.{hazard}.{name} must be non-negative and finite (got {value})")]
    InvalidWeight {
        hazard: HazardType,
        name: &'static str,
        value: f64,
    },

    #[error("unknown aggregation method: {0:?} (expected weighted_average, max or probabilistic)")]
    UnknownAggregationMethod(String),

    #[error("unknown proximity decay model: {0:?} (expected linear, exponential or inverse_square)")]
    UnknownDecayModel(String),

    #[error(
        "thresholds must satisfy 0 < moderate < high < critical < 100 \
         (got moderate={moderate}, high={high}, critical={critical})"
    )]
    InvalidThresholds {
        moderate: f64,
        high: f64,
        critical: f64,
    },

    #[error("decay_years must be positive and finite (got {0})")]
    NonPositiveDecayYears(f64),

    #[error("proximity_cache_size must be at least 1")]
    ZeroCacheSize,

    #[error("cache_precision must be at most {max} decimal places (got {got})")]
    CachePrecisionTooHigh { got: u32, max: u32 },

    #[error("calculation_timeout_ms must be positive")]
    ZeroTimeout,
}

/// Any failure the engine surface can report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
