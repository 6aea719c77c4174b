//! Distance-based decay of hazard impact
//!
//! Global invariants enforced:
//! - Impact is always within [0, 1]
//! - Impact is exactly 1.0 at distance 0 for every model
//! - Impact is exactly 0.0 at or beyond the maximum influence distance

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decay curve mapping normalized distance to impact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayModel {
    /// 1 - d/R
    Linear,
    /// exp(-3·d/R), about 5% just inside R
    #[default]
    Exponential,
    /// 1 - (d/R)²
    InverseSquare,
}

impl DecayModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayModel::Linear => "linear",
            DecayModel::Exponential => "exponential",
            DecayModel::InverseSquare => "inverse_square",
        }
    }
}

impl fmt::Display for DecayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecayModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(DecayModel::Linear),
            "exponential" => Ok(DecayModel::Exponential),
            "inverse_square" => Ok(DecayModel::InverseSquare),
            other => Err(ConfigError::UnknownDecayModel(other.to_string())),
        }
    }
}

/// Impact of a hazard source `distance_km` away with influence radius `max_distance_km`
///
/// Out-of-range sources terminate early with 0. Degenerate inputs (negative,
/// NaN or non-positive radius) also yield 0 rather than an error; a negative
/// distance is treated as distance 0.
pub fn proximity_impact(distance_km: f64, max_distance_km: f64, model: DecayModel) -> f64 {
    if max_distance_km.is_nan()
        || max_distance_km <= 0.0
        || distance_km.is_nan()
        || distance_km >= max_distance_km
    {
        return 0.0;
    }

    let normalized = distance_km.max(0.0) / max_distance_km;
    let impact = match model {
        DecayModel::Linear => 1.0 - normalized,
        DecayModel::Exponential => (-3.0 * normalized).exp(),
        DecayModel::InverseSquare => 1.0 - normalized * normalized,
    };

    impact.clamp(0.0, 1.0)
}
