//! Georisk core library - multi-hazard geographic risk assessment

// Global invariants enforced in this crate:
// - Every score is within [0, 100] and every proximity impact within [0, 1]
// - No global mutable state; the distance cache is owned by one engine
// - No I/O, clocks or randomness in scoring (config loading is separate)
// - Identical input and config yield identical scores

pub mod cache;
pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod hazard;
pub mod history;
pub mod proximity;
pub mod report;
pub mod risk;
pub mod vulnerability;

pub use cache::{CacheStats, GeoDistanceCache};
pub use composite::{composite_risk, AggregationMethod, CompositeRiskResult, HazardContribution};
pub use config::{AssessmentConfig, AssessmentConfigBuilder, GeoriskConfig, ResolvedConfig};
pub use engine::{AssessmentRequest, HazardAssessment, LocationAssessment, RiskEngine};
pub use error::{ConfigError, RiskError, ValidationError};
pub use geo::{haversine_km, GeographicPoint, HazardSource};
pub use hazard::{HazardBreakdown, HazardInput, HazardType, RiskScoreResult};
pub use history::{historical_weighting, HistoricalEvent};
pub use proximity::{proximity_impact, DecayModel};
pub use report::{render_json, render_text};
pub use risk::{classify_risk, RiskLevel, RiskThresholds};
pub use vulnerability::{SiteProfile, VulnerabilityFactors};
