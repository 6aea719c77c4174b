//! Risk level classification
//!
//! Global invariants enforced:
//! - Thresholds partition [0, 100] into four contiguous, non-overlapping bands
//! - Classification is a pure function of the score and the thresholds

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,      // [0, 25)
    Moderate, // [25, 50)
    High,     // [50, 75)
    Critical, // [75, 100]
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds of the MODERATE, HIGH and CRITICAL bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub moderate: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            moderate: 25.0,
            high: 50.0,
            critical: 75.0,
        }
    }
}

impl RiskThresholds {
    /// Check `0 < moderate < high < critical < 100`, so every band is non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 < self.moderate
            && self.moderate < self.high
            && self.high < self.critical
            && self.critical < 100.0;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds {
                moderate: self.moderate,
                high: self.high,
                critical: self.critical,
            })
        }
    }

    /// Classify a 0-100 score into its half-open band
    pub fn classify(&self, score: f64) -> RiskLevel {
        if score < self.moderate {
            RiskLevel::Low
        } else if score < self.high {
            RiskLevel::Moderate
        } else if score < self.critical {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// Classify a score with the default 25/50/75 thresholds
pub fn classify_risk(score: f64) -> RiskLevel {
    RiskThresholds::default().classify(score)
}

/// Clamp a score into [0, 100]; NaN collapses to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries_are_half_open() {
        assert_eq!(classify_risk(0.0), RiskLevel::Low);
        assert_eq!(classify_risk(24.999), RiskLevel::Low);
        assert_eq!(classify_risk(25.0), RiskLevel::Moderate);
        assert_eq!(classify_risk(49.999), RiskLevel::Moderate);
        assert_eq!(classify_risk(50.0), RiskLevel::High);
        assert_eq!(classify_risk(74.999), RiskLevel::High);
        assert_eq!(classify_risk(75.0), RiskLevel::Critical);
        assert_eq!(classify_risk(100.0), RiskLevel::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RiskThresholds {
            moderate: 10.0,
            high: 20.0,
            critical: 30.0,
        };
        t.validate().unwrap();
        assert_eq!(t.classify(15.0), RiskLevel::Moderate);
        assert_eq!(t.classify(30.0), RiskLevel::Critical);
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let t = RiskThresholds {
            moderate: 50.0,
            high: 25.0,
            critical: 75.0,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_reject_thresholds_outside_range() {
        for (m, h, c) in [(0.0, 50.0, 75.0), (25.0, 50.0, 100.0), (25.0, 25.0, 75.0)] {
            let t = RiskThresholds {
                moderate: m,
                high: h,
                critical: c,
            };
            assert!(t.validate().is_err(), "{} {} {}", m, h, c);
        }
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(42.0), 42.0);
    }
}
