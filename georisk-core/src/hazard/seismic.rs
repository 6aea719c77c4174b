//! Seismic scorer
//!
//! ```text
//! base  = fault_proximity·w_fp + historical·w_h + magnitude·w_m
//! final = clamp(base · soil_amplification · mitigation_factor)
//! ```
//!
//! Magnitude grows as `(max_intensity / 10)^1.5` to follow the logarithmic
//! energy scale of earthquake magnitudes.

use super::{HazardBreakdown, RiskScoreResult, ScoringContext};
use crate::geo::{GeographicPoint, HazardSource};
use crate::history::HistoricalEvent;
use crate::risk::clamp_score;
use crate::vulnerability::DEFAULT_BUILDING_CODE_RATING;
use serde::{Deserialize, Serialize};

/// Site attributes that modulate ground shaking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeismicSite {
    /// 1.0 for rock up to 2.0 for soft soil
    pub soil_amplification: f64,
    /// 0 (weak) to 10 (strict); each point removes 5% of the risk
    pub building_code_rating: f64,
}

impl Default for SeismicSite {
    fn default() -> Self {
        SeismicSite {
            soil_amplification: 1.0,
            building_code_rating: DEFAULT_BUILDING_CODE_RATING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicBreakdown {
    pub fault_proximity_score: f64,
    pub historical_score: f64,
    pub magnitude_score: f64,
    pub base_score: f64,
    pub soil_amplification: f64,
    /// Fraction of risk left after building codes, in [0.5, 1.0]
    pub mitigation_factor: f64,
    pub final_score: f64,
}

pub fn score_seismic(
    location: &GeographicPoint,
    faults: &[HazardSource],
    events: &[HistoricalEvent],
    site: &SeismicSite,
    ctx: &ScoringContext<'_>,
) -> RiskScoreResult {
    let weights = ctx.config.weights().seismic;

    let fault_proximity_score = ctx.peak_source_impact(location, faults);
    let historical_score = ctx.historical(events);
    let magnitude_score = faults
        .iter()
        .map(HazardSource::intensity)
        .reduce(f64::max)
        .map(|max_intensity| clamp_score((max_intensity / 10.0).powf(1.5) * 100.0))
        .unwrap_or(0.0);

    let base_score = fault_proximity_score * weights.fault_proximity
        + historical_score * weights.historical
        + magnitude_score * weights.magnitude;

    let mitigation_factor = 1.0 - site.building_code_rating.clamp(0.0, 10.0) / 20.0;
    let final_score = clamp_score(base_score * site.soil_amplification * mitigation_factor);

    tracing::debug!(
        hazard = "seismic",
        faults = faults.len(),
        events = events.len(),
        score = final_score,
        "scored hazard"
    );

    RiskScoreResult {
        score: final_score,
        breakdown: HazardBreakdown::Seismic(SeismicBreakdown {
            fault_proximity_score,
            historical_score,
            magnitude_score,
            base_score,
            soil_amplification: site.soil_amplification,
            mitigation_factor,
            final_score,
        }),
    }
}
