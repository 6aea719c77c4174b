//! Site vulnerability, assessment confidence and mitigation advice

use crate::hazard::HazardType;
use crate::risk::{clamp_score, RiskLevel};
use serde::{Deserialize, Serialize};

/// Population density at which the density impact saturates (people/km²)
const SATURATING_POPULATION_DENSITY: f64 = 10_000.0;

/// Building code rating assumed when the request gives none
pub const DEFAULT_BUILDING_CODE_RATING: f64 = 5.0;

/// Most recommendations returned for one hazard
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Exposure attributes of the assessed site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteProfile {
    /// People per km²
    pub population_density: f64,
    /// 0 (weak) to 10 (strict); overrides the seismic site rating when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_code_rating: Option<f64>,
    /// 0 (poor) to 10 (excellent)
    pub infrastructure_quality: f64,
    /// Whether the site carries detailed survey metadata
    pub has_detailed_metadata: bool,
}

impl Default for SiteProfile {
    fn default() -> Self {
        SiteProfile {
            population_density: 0.0,
            building_code_rating: None,
            infrastructure_quality: 5.0,
            has_detailed_metadata: false,
        }
    }
}

/// 0-100 impacts derived from a `SiteProfile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityFactors {
    pub population_density_impact: f64,
    pub building_code_impact: f64,
    pub infrastructure_impact: f64,
}

impl VulnerabilityFactors {
    pub fn from_profile(profile: &SiteProfile) -> Self {
        let building_code_rating = profile
            .building_code_rating
            .unwrap_or(DEFAULT_BUILDING_CODE_RATING);
        VulnerabilityFactors {
            population_density_impact: clamp_score(
                profile.population_density / SATURATING_POPULATION_DENSITY * 100.0,
            ),
            building_code_impact: clamp_score(100.0 - building_code_rating * 10.0),
            infrastructure_impact: clamp_score(100.0 - profile.infrastructure_quality * 10.0),
        }
    }
}

/// Confidence in [0.5, 1.0] from how much evidence backs an assessment
///
/// Starts at 0.5, gains up to 0.4 from historical events (saturating at ten)
/// and 0.1 from detailed site metadata.
pub fn assessment_confidence(event_count: usize, has_detailed_metadata: bool) -> f64 {
    let historical_boost = (event_count as f64 / 10.0 * 0.4).min(0.4);
    let metadata_boost = if has_detailed_metadata { 0.1 } else { 0.0 };
    (0.5 + historical_boost + metadata_boost).min(1.0)
}

/// Mitigation advice, most urgent first, at most `MAX_RECOMMENDATIONS`
pub fn recommendations(
    level: RiskLevel,
    hazard: HazardType,
    factors: &VulnerabilityFactors,
) -> Vec<String> {
    let mut advice: Vec<&str> = Vec::new();

    match level {
        RiskLevel::Critical => {
            advice.push("CRITICAL: Immediate evacuation planning required");
            advice.push("Establish emergency response protocols");
        }
        RiskLevel::High => {
            advice.push("HIGH RISK: Develop comprehensive mitigation strategies");
            advice.push("Conduct regular safety drills");
        }
        RiskLevel::Low | RiskLevel::Moderate => {}
    }

    advice.extend_from_slice(match hazard {
        HazardType::Seismic => &[
            "Retrofit buildings to meet seismic standards",
            "Establish earthquake early warning systems",
        ],
        HazardType::Flood => &[
            "Improve drainage systems and flood barriers",
            "Implement flood warning systems",
        ],
        HazardType::Wildfire => &[
            "Enhance fire detection and suppression systems",
            "Create firebreaks and defensible spaces",
        ],
        HazardType::Storm => &[
            "Strengthen building codes for wind resistance",
            "Improve power grid resilience",
        ],
    });

    if factors.building_code_impact > 60.0 {
        advice.push("Upgrade building codes and enforcement");
    }
    if factors.infrastructure_impact > 60.0 {
        advice.push("Invest in infrastructure modernization");
    }
    if factors.population_density_impact > 70.0 {
        advice.push("Develop density-specific emergency response plans");
    }

    advice
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(String::from)
        .collect()
}
