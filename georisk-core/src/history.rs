//! Historical event weighting
//!
//! Turns a list of past events into one time-decayed, frequency-boosted
//! severity score on the 0-100 scale:
//!
//! ```text
//! time_weight_i   = exp(-years_ago_i / decay_years)
//! weighted_score  = Σ(10·severity_i · time_weight_i) / Σ(time_weight_i)
//! frequency_boost = min((event_count - 1) / 10, 0.2)
//! final           = min(weighted_score · (1 + frequency_boost), 100)
//! ```
//!
//! The boost counts repeat events, so a lone event scores exactly its own
//! scaled severity whatever its age.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per year used to convert event ages
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default e-folding time of the temporal decay
pub const DEFAULT_DECAY_YEARS: f64 = 10.0;

/// Maximum frequency boost (+20%)
pub const MAX_FREQUENCY_BOOST: f64 = 0.2;

/// A past hazard event affecting the assessed location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistoricalEvent")]
pub struct HistoricalEvent {
    severity: f64,
    days_ago: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    impact_radius_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    casualties: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    economic_damage_usd: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHistoricalEvent {
    severity: f64,
    #[serde(default)]
    days_ago: Option<u32>,
    #[serde(default)]
    event_date: Option<NaiveDate>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
    #[serde(default)]
    impact_radius_km: Option<f64>,
    #[serde(default)]
    casualties: Option<u32>,
    #[serde(default)]
    economic_damage_usd: Option<f64>,
}

impl TryFrom<RawHistoricalEvent> for HistoricalEvent {
    type Error = String;

    fn try_from(raw: RawHistoricalEvent) -> Result<Self, Self::Error> {
        let event = match (raw.days_ago, raw.event_date, raw.as_of) {
            (Some(days), None, _) => HistoricalEvent::new(raw.severity, days),
            (None, Some(date), Some(as_of)) => HistoricalEvent::from_date(raw.severity, date, as_of),
            (None, Some(_), None) => {
                return Err("event_date requires an as_of reference date".to_string())
            }
            (Some(_), Some(_), _) => {
                return Err("specify either days_ago or event_date, not both".to_string())
            }
            (None, None, _) => return Err("missing days_ago or event_date".to_string()),
        }
        .map_err(|e| e.to_string())?;

        let event = match raw.impact_radius_km {
            Some(radius) => event.with_impact_radius(radius).map_err(|e| e.to_string())?,
            None => event,
        };
        Ok(HistoricalEvent {
            casualties: raw.casualties,
            economic_damage_usd: raw.economic_damage_usd,
            ..event
        })
    }
}

impl HistoricalEvent {
    /// Create an event of `severity` (0-10) that occurred `days_ago` days ago
    pub fn new(severity: f64, days_ago: u32) -> Result<Self, ValidationError> {
        if !(0.0..=10.0).contains(&severity) {
            return Err(ValidationError::SeverityOutOfRange(severity));
        }
        Ok(HistoricalEvent {
            severity,
            days_ago,
            impact_radius_km: None,
            casualties: None,
            economic_damage_usd: None,
        })
    }

    /// Create an event from its calendar date, aged relative to `as_of`
    ///
    /// The reference date is explicit: the engine never reads the clock.
    pub fn from_date(
        severity: f64,
        event_date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let days = (as_of - event_date).num_days();
        if days < 0 {
            return Err(ValidationError::EventInFuture { event_date, as_of });
        }
        HistoricalEvent::new(severity, u32::try_from(days).unwrap_or(u32::MAX))
    }

    pub fn with_impact_radius(mut self, radius_km: f64) -> Result<Self, ValidationError> {
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(ValidationError::InvalidImpactRadius(radius_km));
        }
        self.impact_radius_km = Some(radius_km);
        Ok(self)
    }

    pub fn with_casualties(mut self, casualties: u32) -> Self {
        self.casualties = Some(casualties);
        self
    }

    pub fn with_economic_damage(mut self, damage_usd: f64) -> Self {
        self.economic_damage_usd = Some(damage_usd);
        self
    }

    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn days_ago(&self) -> u32 {
        self.days_ago
    }

    pub fn years_ago(&self) -> f64 {
        self.days_ago as f64 / DAYS_PER_YEAR
    }

    pub fn impact_radius_km(&self) -> Option<f64> {
        self.impact_radius_km
    }

    pub fn casualties(&self) -> Option<u32> {
        self.casualties
    }

    pub fn economic_damage_usd(&self) -> Option<f64> {
        self.economic_damage_usd
    }
}

/// Time-decayed, frequency-boosted severity score in 0..=100
///
/// Returns 0 for an empty list. A non-positive or NaN `decay_years` ignores
/// age entirely (every event weighs the same).
pub fn historical_weighting(events: &[HistoricalEvent], decay_years: f64) -> f64 {
    if events.is_empty() {
        return 0.0;
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for event in events {
        let time_weight = if decay_years > 0.0 {
            (-event.years_ago() / decay_years).exp()
        } else {
            1.0
        };
        weighted_sum += event.severity * 10.0 * time_weight;
        total_weight += time_weight;
    }

    // Every weight underflowed: ages are astronomically large relative to decay
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted_score = weighted_sum / total_weight;
    // A lone event carries no frequency signal
    let frequency_boost = match events.len() {
        1 => 0.0,
        n => (n as f64 / 10.0).min(MAX_FREQUENCY_BOOST),
    };

    (weighted_score * (1.0 + frequency_boost)).clamp(0.0, 100.0)
}
