//! Risk engine: one config, one distance cache, every scoring operation
//!
//! Global invariants enforced:
//! - The distance cache belongs to this engine instance; there is no process-wide state
//! - Scoring and aggregation read only their inputs and the config
//! - An engine may be shared across threads; only the cache synchronizes

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, GeoDistanceCache};
use crate::composite::{composite_risk, AggregationMethod, CompositeRiskResult};
use crate::config::AssessmentConfig;
use crate::error::{RiskError, ValidationError};
use crate::geo::{GeographicPoint, HazardSource};
use crate::hazard::{
    score_flood, score_seismic, score_storm, score_wildfire, FloodSite, HazardBreakdown,
    HazardInput, HazardType, RiskScoreResult, ScoringContext, SeismicSite, StormSite,
    WildfireSite,
};
use crate::history::{historical_weighting, HistoricalEvent};
use crate::proximity::{proximity_impact, DecayModel};
use crate::risk::RiskLevel;
use crate::vulnerability::{
    assessment_confidence, recommendations, SiteProfile, VulnerabilityFactors,
};

/// Everything needed to assess one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentRequest {
    pub location: GeographicPoint,
    pub hazards: Vec<HazardInput>,
    #[serde(default)]
    pub profile: SiteProfile,
    /// Composite weights per hazard; equal weights when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_weights: Option<BTreeMap<HazardType, f64>>,
    /// Overrides the configured aggregation method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_method: Option<AggregationMethod>,
}

impl AssessmentRequest {
    /// The site profile with its building code rating settled
    ///
    /// A rating on the profile wins; otherwise the seismic site's rating applies.
    pub fn resolved_profile(&self) -> SiteProfile {
        let seismic_rating = self.hazards.iter().find_map(|input| match input {
            HazardInput::Seismic { site, .. } => Some(site.building_code_rating),
            _ => None,
        });
        SiteProfile {
            building_code_rating: self.profile.building_code_rating.or(seismic_rating),
            ..self.profile.clone()
        }
    }
}

/// Result for one hazard inside a `LocationAssessment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardAssessment {
    pub hazard: HazardType,
    pub score: f64,
    pub level: RiskLevel,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub breakdown: HazardBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAssessment {
    pub location: GeographicPoint,
    /// In `HazardType` order
    pub hazards: Vec<HazardAssessment>,
    pub composite: CompositeRiskResult,
    pub vulnerability: VulnerabilityFactors,
    pub calculation_time_ms: f64,
}

/// Risk assessment engine bound to one validated configuration
#[derive(Debug)]
pub struct RiskEngine {
    config: AssessmentConfig,
    cache: GeoDistanceCache,
}

impl Default for RiskEngine {
    fn default() -> Self {
        RiskEngine::new(AssessmentConfig::default())
    }
}

impl RiskEngine {
    pub fn new(config: AssessmentConfig) -> Self {
        let cache = GeoDistanceCache::new(config.proximity_cache_size(), config.cache_precision());
        RiskEngine { config, cache }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    fn context(&self) -> ScoringContext<'_> {
        ScoringContext::new(&self.config, &self.cache)
    }

    /// Cached great-circle distance in kilometres
    pub fn distance_km(&self, a: &GeographicPoint, b: &GeographicPoint) -> f64 {
        self.cache.distance_km(a, b)
    }

    pub fn proximity_impact(&self, distance_km: f64, max_distance_km: f64, model: DecayModel) -> f64 {
        proximity_impact(distance_km, max_distance_km, model)
    }

    /// Historical score with the configured `decay_years`
    pub fn historical_weighting(&self, events: &[HistoricalEvent]) -> f64 {
        historical_weighting(events, self.config.decay_years())
    }

    pub fn score_seismic(
        &self,
        location: &GeographicPoint,
        faults: &[HazardSource],
        events: &[HistoricalEvent],
        site: &SeismicSite,
    ) -> RiskScoreResult {
        score_seismic(location, faults, events, site, &self.context())
    }

    pub fn score_flood(
        &self,
        location: &GeographicPoint,
        water_bodies: &[HazardSource],
        events: &[HistoricalEvent],
        site: &FloodSite,
    ) -> RiskScoreResult {
        score_flood(location, water_bodies, events, site, &self.context())
    }

    pub fn score_wildfire(
        &self,
        location: &GeographicPoint,
        fire_sources: &[HazardSource],
        events: &[HistoricalEvent],
        site: &WildfireSite,
    ) -> RiskScoreResult {
        score_wildfire(location, fire_sources, events, site, &self.context())
    }

    pub fn score_storm(
        &self,
        location: &GeographicPoint,
        coastlines: &[HazardSource],
        events: &[HistoricalEvent],
        site: &StormSite,
    ) -> RiskScoreResult {
        score_storm(location, coastlines, events, site, &self.context())
    }

    /// Score whichever hazard `input` describes
    pub fn score(&self, location: &GeographicPoint, input: &HazardInput) -> RiskScoreResult {
        input.score(location, &self.context())
    }

    /// Composite with the configured aggregation method
    pub fn composite_risk(
        &self,
        scores: &BTreeMap<HazardType, f64>,
        weights: Option<&BTreeMap<HazardType, f64>>,
    ) -> CompositeRiskResult {
        self.composite_risk_with(scores, weights, self.config.aggregation_method())
    }

    pub fn composite_risk_with(
        &self,
        scores: &BTreeMap<HazardType, f64>,
        weights: Option<&BTreeMap<HazardType, f64>>,
        method: AggregationMethod,
    ) -> CompositeRiskResult {
        composite_risk(scores, weights, method, self.config.thresholds())
    }

    pub fn get_performance_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Score every requested hazard and aggregate them
    ///
    /// Each hazard type may appear at most once. Elapsed time is compared to
    /// `calculation_timeout_ms` and only logged when over budget.
    pub fn assess(&self, request: &AssessmentRequest) -> Result<LocationAssessment, RiskError> {
        let started = Instant::now();

        let mut seen = BTreeSet::new();
        for input in &request.hazards {
            if !seen.insert(input.hazard()) {
                return Err(ValidationError::DuplicateHazard(input.hazard()).into());
            }
        }

        let profile = request.resolved_profile();
        let vulnerability = VulnerabilityFactors::from_profile(&profile);
        let thresholds = self.config.thresholds();

        let mut hazards: Vec<HazardAssessment> = request
            .hazards
            .iter()
            .map(|input| {
                let result = match (input, profile.building_code_rating) {
                    (
                        HazardInput::Seismic {
                            faults,
                            events,
                            site,
                        },
                        Some(building_code_rating),
                    ) => {
                        let site = SeismicSite {
                            building_code_rating,
                            ..*site
                        };
                        self.score_seismic(&request.location, faults, events, &site)
                    }
                    _ => self.score(&request.location, input),
                };
                let level = thresholds.classify(result.score);
                HazardAssessment {
                    hazard: input.hazard(),
                    score: result.score,
                    level,
                    confidence: assessment_confidence(
                        input.events().len(),
                        profile.has_detailed_metadata,
                    ),
                    recommendations: recommendations(level, input.hazard(), &vulnerability),
                    breakdown: result.breakdown,
                }
            })
            .collect();
        hazards.sort_by_key(|h| h.hazard);

        let scores: BTreeMap<HazardType, f64> =
            hazards.iter().map(|h| (h.hazard, h.score)).collect();
        let method = request
            .aggregation_method
            .unwrap_or_else(|| self.config.aggregation_method());
        let composite = self.composite_risk_with(&scores, request.hazard_weights.as_ref(), method);

        let elapsed = started.elapsed();
        let calculation_time_ms = elapsed.as_secs_f64() * 1000.0;
        let budget_ms = self.config.calculation_timeout_ms();
        if elapsed.as_millis() > u128::from(budget_ms) {
            tracing::warn!(
                elapsed_ms = calculation_time_ms,
                budget_ms,
                hazards = hazards.len(),
                "assessment exceeded calculation budget"
            );
        }
        tracing::debug!(
            score = composite.score,
            level = %composite.level,
            method = %method,
            "assessed location"
        );

        Ok(LocationAssessment {
            location: request.location,
            hazards,
            composite,
            vulnerability,
            calculation_time_ms,
        })
    }
}
