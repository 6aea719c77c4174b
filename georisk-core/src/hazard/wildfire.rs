//! Wildfire scorer
//!
//! Fuel and dryness set the base; heat and wind amplify it:
//!
//! ```text
//! base               = vegetation·w_v + climate_aridity·w_c + historical·w_h + active_fire·w_f
//! temperature_factor = 1 + max(0, (temperature_avg_c - 20) / 20)
//! wind_factor        = 1 + min(wind_speed_kmh / 100, 1)
//! final              = clamp(base · temperature_factor · wind_factor)
//! ```

use super::{HazardBreakdown, RiskScoreResult, ScoringContext};
use crate::geo::{GeographicPoint, HazardSource};
use crate::history::HistoricalEvent;
use crate::risk::clamp_score;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WildfireSite {
    /// Fuel load, 0 (barren) to 10 (dense forest)
    pub vegetation_density: f64,
    /// 0 (humid) to 10 (arid)
    pub climate_aridity_index: f64,
    pub temperature_avg_c: f64,
    pub wind_speed_kmh: f64,
}

impl Default for WildfireSite {
    fn default() -> Self {
        WildfireSite {
            vegetation_density: 0.0,
            climate_aridity_index: 0.0,
            temperature_avg_c: 20.0,
            wind_speed_kmh: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildfireBreakdown {
    pub vegetation_score: f64,
    pub climate_aridity_score: f64,
    pub historical_score: f64,
    pub active_fire_proximity_score: f64,
    pub base_score: f64,
    pub temperature_factor: f64,
    pub wind_factor: f64,
    pub final_score: f64,
}

pub fn score_wildfire(
    location: &GeographicPoint,
    fire_sources: &[HazardSource],
    events: &[HistoricalEvent],
    site: &WildfireSite,
    ctx: &ScoringContext<'_>,
) -> RiskScoreResult {
    let weights = ctx.config.weights().wildfire;

    let vegetation_score = clamp_score(site.vegetation_density * 10.0);
    let climate_aridity_score = clamp_score(site.climate_aridity_index * 10.0);
    let historical_score = ctx.historical(events);
    let active_fire_proximity_score = ctx.peak_source_impact(location, fire_sources);

    let base_score = vegetation_score * weights.vegetation
        + climate_aridity_score * weights.climate_aridity
        + historical_score * weights.historical
        + active_fire_proximity_score * weights.active_fire_proximity;

    let temperature_factor = 1.0 + ((site.temperature_avg_c - 20.0) / 20.0).max(0.0);
    let wind_factor = 1.0 + (site.wind_speed_kmh.max(0.0) / 100.0).min(1.0);
    let final_score = clamp_score(base_score * temperature_factor * wind_factor);

    tracing::debug!(
        hazard = "wildfire",
        fire_sources = fire_sources.len(),
        events = events.len(),
        score = final_score,
        "scored hazard"
    );

    RiskScoreResult {
        score: final_score,
        breakdown: HazardBreakdown::Wildfire(WildfireBreakdown {
            vegetation_score,
            climate_aridity_score,
            historical_score,
            active_fire_proximity_score,
            base_score,
            temperature_factor,
            wind_factor,
            final_score,
        }),
    }
}
