//! Flood scorer
//!
//! ```text
//! elevation       = 100 · exp(-elevation_m / 30)
//! drainage        = (10 - drainage_quality) · 10
//! base            = elevation·w_e + water_proximity·w_w + historical·w_h + drainage·w_d
//! rainfall_factor = 0.5 + 0.5 · min(annual_rainfall_mm / 5000, 1)
//! final           = clamp(base · rainfall_factor)
//! ```

use super::{HazardBreakdown, RiskScoreResult, ScoringContext};
use crate::geo::{GeographicPoint, HazardSource};
use crate::history::HistoricalEvent;
use crate::risk::clamp_score;
use serde::{Deserialize, Serialize};

/// Elevation over which the elevation sub-score decays by 1/e
const ELEVATION_DECAY_M: f64 = 30.0;

/// Rainfall at which the rainfall factor saturates
const RAINFALL_SATURATION_MM: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FloodSite {
    /// Height above sea level; unknown elevation contributes nothing
    pub elevation_m: Option<f64>,
    /// 0 (poor) to 10 (excellent)
    pub drainage_quality: f64,
    pub annual_rainfall_mm: f64,
}

impl Default for FloodSite {
    fn default() -> Self {
        FloodSite {
            elevation_m: None,
            drainage_quality: 5.0,
            annual_rainfall_mm: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodBreakdown {
    pub elevation_score: f64,
    pub water_proximity_score: f64,
    pub historical_score: f64,
    pub drainage_score: f64,
    pub base_score: f64,
    pub rainfall_factor: f64,
    pub final_score: f64,
}

pub fn score_flood(
    location: &GeographicPoint,
    water_bodies: &[HazardSource],
    events: &[HistoricalEvent],
    site: &FloodSite,
    ctx: &ScoringContext<'_>,
) -> RiskScoreResult {
    let weights = ctx.config.weights().flood;

    // Below sea level saturates at 100
    let elevation_score = site
        .elevation_m
        .map(|e| clamp_score(100.0 * (-e / ELEVATION_DECAY_M).exp()))
        .unwrap_or(0.0);
    let water_proximity_score = ctx.peak_source_impact(location, water_bodies);
    let historical_score = ctx.historical(events);
    let drainage_score = clamp_score((10.0 - site.drainage_quality) * 10.0);

    let base_score = elevation_score * weights.elevation
        + water_proximity_score * weights.water_proximity
        + historical_score * weights.historical
        + drainage_score * weights.drainage;

    let rainfall_factor =
        0.5 + 0.5 * (site.annual_rainfall_mm.max(0.0) / RAINFALL_SATURATION_MM).min(1.0);
    let final_score = clamp_score(base_score * rainfall_factor);

    tracing::debug!(
        hazard = "flood",
        water_bodies = water_bodies.len(),
        events = events.len(),
        score = final_score,
        "scored hazard"
    );

    RiskScoreResult {
        score: final_score,
        breakdown: HazardBreakdown::Flood(FloodBreakdown {
            elevation_score,
            water_proximity_score,
            historical_score,
            drainage_score,
            base_score,
            rainfall_factor,
            final_score,
        }),
    }
}
