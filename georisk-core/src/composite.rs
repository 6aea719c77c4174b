//! Multi-hazard composite aggregation
//!
//! Global invariants enforced:
//! - Composite score is always within [0, 100]
//! - Contributions sum to the composite score for every method
//! - Hazards are visited in `HazardType` order, so ties break deterministically
//! - An empty score set yields 0 / LOW with no contributions

use crate::error::ConfigError;
use crate::hazard::HazardType;
use crate::risk::{clamp_score, RiskLevel, RiskThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How per-hazard scores combine into one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Σ score_i · weight_i
    #[default]
    WeightedAverage,
    /// Worst single hazard
    Max,
    /// 100 · (1 - Π(1 - score_i/100)), hazards treated as independent
    Probabilistic,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::WeightedAverage => "weighted_average",
            AggregationMethod::Max => "max",
            AggregationMethod::Probabilistic => "probabilistic",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weighted_average" => Ok(AggregationMethod::WeightedAverage),
            "max" => Ok(AggregationMethod::Max),
            "probabilistic" => Ok(AggregationMethod::Probabilistic),
            other => Err(ConfigError::UnknownAggregationMethod(other.to_string())),
        }
    }
}

/// Share of the composite attributable to one hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardContribution {
    pub hazard: HazardType,
    pub score: f64,
    /// Normalized weight (weights sum to 1 across the breakdown)
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRiskResult {
    pub score: f64,
    pub level: RiskLevel,
    pub method: AggregationMethod,
    pub contributions: Vec<HazardContribution>,
}

/// Combine per-hazard scores into one composite score and level
///
/// `weights` apply to the weighted average. They are normalized to sum to 1;
/// a hazard without a weight (or with a negative or non-finite one) gets 0,
/// and when nothing positive remains every hazard is weighted equally.
/// Input scores are clamped to [0, 100] first.
pub fn composite_risk(
    scores: &BTreeMap<HazardType, f64>,
    weights: Option<&BTreeMap<HazardType, f64>>,
    method: AggregationMethod,
    thresholds: &RiskThresholds,
) -> CompositeRiskResult {
    if scores.is_empty() {
        return CompositeRiskResult {
            score: 0.0,
            level: RiskLevel::Low,
            method,
            contributions: Vec::new(),
        };
    }

    let normalized = normalize_weights(scores, weights);
    let clamped: Vec<(HazardType, f64, f64)> = scores
        .iter()
        .zip(normalized)
        .map(|((&hazard, &score), weight)| (hazard, clamp_score(score), weight))
        .collect();

    let contributions: Vec<HazardContribution> = match method {
        AggregationMethod::WeightedAverage => clamped
            .iter()
            .map(|&(hazard, score, weight)| HazardContribution {
                hazard,
                score,
                weight,
                contribution: score * weight,
            })
            .collect(),
        AggregationMethod::Max => {
            let mut winner = 0;
            for (i, &(_, score, _)) in clamped.iter().enumerate() {
                if score > clamped[winner].1 {
                    winner = i;
                }
            }
            clamped
                .iter()
                .enumerate()
                .map(|(i, &(hazard, score, weight))| HazardContribution {
                    hazard,
                    score,
                    weight,
                    contribution: if i == winner { score } else { 0.0 },
                })
                .collect()
        }
        AggregationMethod::Probabilistic => {
            // Marginal gain of each hazard given none of the earlier ones struck
            let mut survival = 1.0;
            clamped
                .iter()
                .map(|&(hazard, score, weight)| {
                    let p = score / 100.0;
                    let contribution = 100.0 * p * survival;
                    survival *= 1.0 - p;
                    HazardContribution {
                        hazard,
                        score,
                        weight,
                        contribution,
                    }
                })
                .collect()
        }
    };

    let score = clamp_score(contributions.iter().map(|c| c.contribution).sum());
    CompositeRiskResult {
        score,
        level: thresholds.classify(score),
        method,
        contributions,
    }
}

fn normalize_weights(
    scores: &BTreeMap<HazardType, f64>,
    weights: Option<&BTreeMap<HazardType, f64>>,
) -> Vec<f64> {
    let equal = vec![1.0 / scores.len() as f64; scores.len()];
    let Some(weights) = weights else {
        return equal;
    };

    let raw: Vec<f64> = scores
        .keys()
        .map(|hazard| {
            weights
                .get(hazard)
                .copied()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .unwrap_or(0.0)
        })
        .collect();
    let total: f64 = raw.iter().sum();
    if total > 0.0 {
        raw.into_iter().map(|w| w / total).collect()
    } else {
        equal
    }
}
