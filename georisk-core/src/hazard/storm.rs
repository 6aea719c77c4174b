//! Storm scorer
//!
//! ```text
//! historical       = max(weighting, avg_severity/10·50 + min(events_per_year/5, 1)·50)
//! seasonal         = SEASONAL_FACTORS[month - 1] · 100
//! base             = historical·w_h + geographic_exposure·w_g + seasonal·w_s
//! coastal_factor   = 1 + exp(-coastal_km / 50)
//! elevation_factor = sqrt(1 + max(0, (20 - elevation_m) / 20))
//! final            = clamp(base · coastal_factor · elevation_factor)
//! ```

use super::{HazardBreakdown, RiskScoreResult, ScoringContext};
use crate::geo::{GeographicPoint, HazardSource};
use crate::history::{HistoricalEvent, DAYS_PER_YEAR};
use crate::risk::clamp_score;
use serde::{Deserialize, Serialize};

/// Relative storm activity per calendar month, January first
pub const SEASONAL_FACTORS: [f64; 12] = [0.3, 0.4, 0.7, 0.8, 0.9, 1.0, 0.9, 0.9, 1.0, 0.9, 0.7, 0.4];

/// Distance over which coastal amplification decays by 1/e
const COASTAL_DECAY_KM: f64 = 50.0;

/// Elevation below which storm surge exposure grows
const SURGE_ELEVATION_M: f64 = 20.0;

/// Event rate at which the frequency factor saturates
const SATURATING_EVENTS_PER_YEAR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StormSite {
    /// Declared distance to the coast
    pub coastal_distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    /// Calendar month 1-12; out-of-range values are clamped
    pub month: u8,
    /// 0 (sheltered) to 10 (exposed)
    pub geographic_exposure: f64,
}

impl Default for StormSite {
    fn default() -> Self {
        StormSite {
            coastal_distance_km: None,
            elevation_m: None,
            month: 1,
            geographic_exposure: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormBreakdown {
    pub historical_score: f64,
    pub geographic_exposure_score: f64,
    pub seasonal_score: f64,
    pub seasonal_factor: f64,
    pub base_score: f64,
    /// Distance the coastal factor was computed from, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coastal_distance_km: Option<f64>,
    pub coastal_factor: f64,
    pub elevation_factor: f64,
    pub final_score: f64,
}

pub fn score_storm(
    location: &GeographicPoint,
    coastlines: &[HazardSource],
    events: &[HistoricalEvent],
    site: &StormSite,
    ctx: &ScoringContext<'_>,
) -> RiskScoreResult {
    let weights = ctx.config.weights().storm;

    let historical_score = storm_history(ctx.historical(events), events);
    let seasonal_factor = seasonal_factor(site.month);
    let seasonal_score = seasonal_factor * 100.0;
    let geographic_exposure_score = clamp_score(site.geographic_exposure * 10.0);

    let base_score = historical_score * weights.historical
        + geographic_exposure_score * weights.geographic_exposure
        + seasonal_score * weights.seasonal;

    let coastal_distance_km = match (
        site.coastal_distance_km,
        ctx.nearest_distance_km(location, coastlines),
    ) {
        (Some(declared), Some(measured)) => Some(declared.min(measured)),
        (declared, measured) => declared.or(measured),
    };
    let coastal_factor = coastal_distance_km
        .map(|d| 1.0 + (-d.max(0.0) / COASTAL_DECAY_KM).exp())
        .unwrap_or(1.0);
    let elevation_factor = site
        .elevation_m
        .map(|e| (1.0 + ((SURGE_ELEVATION_M - e) / SURGE_ELEVATION_M).max(0.0)).sqrt())
        .unwrap_or(1.0);

    let final_score = clamp_score(base_score * coastal_factor * elevation_factor);

    tracing::debug!(
        hazard = "storm",
        coastlines = coastlines.len(),
        events = events.len(),
        score = final_score,
        "scored hazard"
    );

    RiskScoreResult {
        score: final_score,
        breakdown: HazardBreakdown::Storm(StormBreakdown {
            historical_score,
            geographic_exposure_score,
            seasonal_score,
            seasonal_factor,
            base_score,
            coastal_distance_km,
            coastal_factor,
            elevation_factor,
            final_score,
        }),
    }
}

/// Seasonal activity for a 1-based month
pub fn seasonal_factor(month: u8) -> f64 {
    SEASONAL_FACTORS[usize::from(month.clamp(1, 12) - 1)]
}

// Storms recur; a high event rate lifts the score even when the
// time-decayed severity alone would not.
fn storm_history(weighted: f64, events: &[HistoricalEvent]) -> f64 {
    if events.is_empty() {
        return weighted;
    }
    let count = events.len() as f64;
    let avg_severity = events.iter().map(HistoricalEvent::severity).sum::<f64>() / count;
    let max_days = events
        .iter()
        .map(HistoricalEvent::days_ago)
        .max()
        .unwrap_or(0);
    let years_span = (f64::from(max_days) / DAYS_PER_YEAR).max(1.0);
    let frequency_factor = (count / years_span / SATURATING_EVENTS_PER_YEAR).min(1.0);

    clamp_score(weighted.max(avg_severity / 10.0 * 50.0 + frequency_factor * 50.0))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cache::GeoDistanceCache;
    use crate::config::AssessmentConfig;

    fn breakdown(result: &RiskScoreResult) -> &StormBreakdown {
        match &result.breakdown {
            HazardBreakdown::Storm(b) => b,
            other => panic!("unexpected breakdown {:?}", other),
        }
    }

    #[test]
    fn test_miami_in_september() {
        let config = AssessmentConfig::default();
        let cache = GeoDistanceCache::default();
        let ctx = ScoringContext::new(&config, &cache);
        let miami = point(25.7617, -80.1918);
        let events = [event(8.0, 365 * 5), event(6.0, 365 * 2)];
        let site = StormSite {
            coastal_distance_km: Some(5.0),
            elevation_m: Some(2.0),
            month: 9,
            geographic_exposure: 5.0,
        };

        let result = score_storm(&miami, &[], &events, &site, &ctx);
        let b = breakdown(&result);
        assert_eq!(b.seasonal_factor, 1.0);
        assert_eq!(b.seasonal_score, 100.0);
        assert!((b.coastal_factor - (1.0 + (-0.1f64).exp())).abs() < 1e-12);
        assert!((b.elevation_factor - 1.9f64.sqrt()).abs() < 1e-12);
        assert!((0.0..=100.0).contains(&result.score));
    }

    #[test]
    fn test_frequency_lifts_history() {
        // Two mild events within a year: 2/yr -> factor 0.4
        let events = [event(2.0, 30), event(2.0, 200)];
        let weighted = 24.0;
        let lifted = storm_history(weighted, &events);
        assert!((lifted - (10.0 + 20.0)).abs() < 1e-9, "got {}", lifted);

        // Strong weighting wins over the frequency estimate
        assert_eq!(storm_history(90.0, &events), 90.0);
        assert_eq!(storm_history(0.0, &[]), 0.0);
    }

    #[test]
    fn test_seasonal_table() {
        assert_eq!(seasonal_factor(1), 0.3);
        assert_eq!(seasonal_factor(6), 1.0);
        assert_eq!(seasonal_factor(12), 0.4);
        assert_eq!(seasonal_factor(0), 0.3);
        assert_eq!(seasonal_factor(200), 0.4);
    }

    #[test]
    fn test_inland_unknown_geometry_has_neutral_multipliers() {
        let config = AssessmentConfig::default();
        let cache = GeoDistanceCache::default();
        let ctx = ScoringContext::new(&config, &cache);
        let result = score_storm(&point(45.0, 5.0), &[], &[], &StormSite::default(), &ctx);
        let b = breakdown(&result);
        assert_eq!(b.coastal_factor, 1.0);
        assert_eq!(b.elevation_factor, 1.0);
        assert_eq!(b.coastal_distance_km, None);
        assert!((result.score - (50.0 * 0.30 + 30.0 * 0.30)).abs() < 1e-9);
    }

    #[test]
    fn test_coastline_source_closer_than_declared() {
        let config = AssessmentConfig::default();
        let cache = GeoDistanceCache::default();
        let ctx = ScoringContext::new(&config, &cache);
        let here = point(0.0, 0.0);
        let coast = source(0.0, 0.0, 5.0, 100.0);
        let site = StormSite {
            coastal_distance_km: Some(80.0),
            ..StormSite::default()
        };
        let result = score_storm(&here, &[coast], &[], &site, &ctx);
        let b = breakdown(&result);
        assert_eq!(b.coastal_distance_km, Some(0.0));
        assert_eq!(b.coastal_factor, 2.0);
    }

    #[test]
    fn test_high_ground_is_neutral() {
        let config = AssessmentConfig::default();
        let cache = GeoDistanceCache::default();
        let ctx = ScoringContext::new(&config, &cache);
        let site = StormSite {
            elevation_m: Some(400.0),
            ..StormSite::default()
        };
        let result = score_storm(&point(46.0, 8.0), &[], &[], &site, &ctx);
        assert_eq!(breakdown(&result).elevation_factor, 1.0);
    }
}
