//! Per-hazard scoring
//!
//! Each hazard type has one deterministic scorer that turns a location, its
//! hazard sources, past events and site attributes into a 0-100 score plus a
//! fixed, named breakdown.
//!
//! Global invariants enforced:
//! - Every sub-score is clamped to [0, 100] before weighting
//! - Every final score is clamped to [0, 100] after the site multipliers
//! - Missing sources or events yield a zero sub-score, never an error
//! - Scorers read only their inputs, the config and the distance cache

pub mod flood;
pub mod seismic;
pub mod storm;
pub mod wildfire;

pub use flood::{score_flood, FloodBreakdown, FloodSite};
pub use seismic::{score_seismic, SeismicBreakdown, SeismicSite};
pub use storm::{score_storm, StormBreakdown, StormSite};
pub use wildfire::{score_wildfire, WildfireBreakdown, WildfireSite};

use crate::cache::GeoDistanceCache;
use crate::config::AssessmentConfig;
use crate::geo::{GeographicPoint, HazardSource};
use crate::history::{historical_weighting, HistoricalEvent};
use crate::proximity::proximity_impact;
use crate::risk::clamp_score;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Natural hazard category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    #[serde(alias = "earthquake")]
    Seismic,
    Flood,
    #[serde(alias = "fire")]
    Wildfire,
    Storm,
}

impl HazardType {
    pub const ALL: [HazardType; 4] = [
        HazardType::Seismic,
        HazardType::Flood,
        HazardType::Wildfire,
        HazardType::Storm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Seismic => "seismic",
            HazardType::Flood => "flood",
            HazardType::Wildfire => "wildfire",
            HazardType::Storm => "storm",
        }
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named factors behind one hazard score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hazard", rename_all = "snake_case")]
pub enum HazardBreakdown {
    Seismic(SeismicBreakdown),
    Flood(FloodBreakdown),
    Wildfire(WildfireBreakdown),
    Storm(StormBreakdown),
}

impl HazardBreakdown {
    pub fn hazard(&self) -> HazardType {
        match self {
            HazardBreakdown::Seismic(_) => HazardType::Seismic,
            HazardBreakdown::Flood(_) => HazardType::Flood,
            HazardBreakdown::Wildfire(_) => HazardType::Wildfire,
            HazardBreakdown::Storm(_) => HazardType::Storm,
        }
    }

    /// Weighted sum of the sub-scores, before site multipliers
    pub fn base_score(&self) -> f64 {
        match self {
            HazardBreakdown::Seismic(b) => b.base_score,
            HazardBreakdown::Flood(b) => b.base_score,
            HazardBreakdown::Wildfire(b) => b.base_score,
            HazardBreakdown::Storm(b) => b.base_score,
        }
    }
}

/// Score of one hazard with its breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreResult {
    pub score: f64,
    pub breakdown: HazardBreakdown,
}

impl RiskScoreResult {
    pub fn hazard(&self) -> HazardType {
        self.breakdown.hazard()
    }
}

/// Everything a scorer reads besides its own inputs
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub config: &'a AssessmentConfig,
    pub cache: &'a GeoDistanceCache,
}

impl<'a> ScoringContext<'a> {
    pub fn new(config: &'a AssessmentConfig, cache: &'a GeoDistanceCache) -> Self {
        ScoringContext { config, cache }
    }

    /// Strongest source influence at `location`, on the 0-100 scale
    ///
    /// Each source contributes `impact(d, radius) · intensity/10 · 100` with
    /// its own radius and the configured decay model; the maximum wins.
    pub fn peak_source_impact(&self, location: &GeographicPoint, sources: &[HazardSource]) -> f64 {
        let model = self.config.decay_model();
        let peak = sources
            .iter()
            .map(|source| {
                let distance = self.cache.distance_km(location, &source.location());
                proximity_impact(distance, source.influence_radius_km(), model)
                    * (source.intensity() / 10.0)
                    * 100.0
            })
            .fold(0.0, f64::max);
        clamp_score(peak)
    }

    /// Distance to the closest source, if any
    pub fn nearest_distance_km(
        &self,
        location: &GeographicPoint,
        sources: &[HazardSource],
    ) -> Option<f64> {
        sources
            .iter()
            .map(|source| self.cache.distance_km(location, &source.location()))
            .reduce(f64::min)
    }

    /// Historical sub-score with the configured decay
    pub fn historical(&self, events: &[HistoricalEvent]) -> f64 {
        historical_weighting(events, self.config.decay_years())
    }
}

/// Scorer input for one hazard, tagged by hazard type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hazard", rename_all = "snake_case")]
pub enum HazardInput {
    #[serde(alias = "earthquake")]
    Seismic {
        #[serde(default)]
        faults: Vec<HazardSource>,
        #[serde(default)]
        events: Vec<HistoricalEvent>,
        #[serde(default)]
        site: SeismicSite,
    },
    Flood {
        #[serde(default)]
        water_bodies: Vec<HazardSource>,
        #[serde(default)]
        events: Vec<HistoricalEvent>,
        #[serde(default)]
        site: FloodSite,
    },
    #[serde(alias = "fire")]
    Wildfire {
        #[serde(default)]
        fire_sources: Vec<HazardSource>,
        #[serde(default)]
        events: Vec<HistoricalEvent>,
        #[serde(default)]
        site: WildfireSite,
    },
    Storm {
        #[serde(default)]
        coastlines: Vec<HazardSource>,
        #[serde(default)]
        events: Vec<HistoricalEvent>,
        #[serde(default)]
        site: StormSite,
    },
}

impl HazardInput {
    pub fn hazard(&self) -> HazardType {
        match self {
            HazardInput::Seismic { .. } => HazardType::Seismic,
            HazardInput::Flood { .. } => HazardType::Flood,
            HazardInput::Wildfire { .. } => HazardType::Wildfire,
            HazardInput::Storm { .. } => HazardType::Storm,
        }
    }

    pub fn events(&self) -> &[HistoricalEvent] {
        match self {
            HazardInput::Seismic { events, .. }
            | HazardInput::Flood { events, .. }
            | HazardInput::Wildfire { events, .. }
            | HazardInput::Storm { events, .. } => events,
        }
    }

    /// Dispatch to the matching scorer
    pub fn score(&self, location: &GeographicPoint, ctx: &ScoringContext<'_>) -> RiskScoreResult {
        match self {
            HazardInput::Seismic {
                faults,
                events,
                site,
            } => score_seismic(location, faults, events, site, ctx),
            HazardInput::Flood {
                water_bodies,
                events,
                site,
            } => score_flood(location, water_bodies, events, site, ctx),
            HazardInput::Wildfire {
                fire_sources,
                events,
                site,
            } => score_wildfire(location, fire_sources, events, site, ctx),
            HazardInput::Storm {
                coastlines,
                events,
                site,
            } => score_storm(location, coastlines, events, site, ctx),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn point(lat: f64, lon: f64) -> GeographicPoint {
        GeographicPoint::new(lat, lon).unwrap()
    }

    pub fn source(lat: f64, lon: f64, intensity: f64, radius_km: f64) -> HazardSource {
        HazardSource::new(point(lat, lon), intensity, radius_km).unwrap()
    }

    pub fn event(severity: f64, days_ago: u32) -> HistoricalEvent {
        HistoricalEvent::new(severity, days_ago).unwrap()
    }
}
