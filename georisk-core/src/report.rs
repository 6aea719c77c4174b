//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering (hazards in `HazardType` order)
//! - Scores are formatted here, never rounded inside the engine

use crate::engine::LocationAssessment;
use crate::hazard::HazardBreakdown;

/// Render an assessment as a human-readable table
pub fn render_text(assessment: &LocationAssessment) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Location: {:.4}, {:.4}\n\n",
        assessment.location.latitude(),
        assessment.location.longitude()
    ));

    output.push_str(&format!(
        "{:<10} {:<8} {:<10} {:<10} {}\n",
        "HAZARD", "SCORE", "LEVEL", "CONFIDENCE", "KEY FACTORS"
    ));
    for hazard in &assessment.hazards {
        output.push_str(&format!(
            "{:<10} {:<8} {:<10} {:<10} {}\n",
            hazard.hazard.as_str(),
            format!("{:.2}", hazard.score),
            hazard.level.as_str(),
            format!("{:.2}", hazard.confidence),
            key_factors(&hazard.breakdown),
        ));
    }

    let composite = &assessment.composite;
    output.push_str(&format!(
        "\nComposite ({}): {:.2} {}\n",
        composite.method,
        composite.score,
        composite.level.as_str().to_uppercase()
    ));
    for c in &composite.contributions {
        output.push_str(&format!(
            "  {:<10} weight {:.2}  contribution {:.2}\n",
            c.hazard.as_str(),
            c.weight,
            c.contribution
        ));
    }

    let v = &assessment.vulnerability;
    output.push_str(&format!(
        "\nVulnerability: population {:.0}, building codes {:.0}, infrastructure {:.0}\n",
        v.population_density_impact, v.building_code_impact, v.infrastructure_impact
    ));

    for hazard in &assessment.hazards {
        if hazard.recommendations.is_empty() {
            continue;
        }
        output.push_str(&format!("\nRecommendations ({}):\n", hazard.hazard));
        for r in &hazard.recommendations {
            output.push_str(&format!("  - {}\n", r));
        }
    }

    output
}

/// Render an assessment as pretty-printed JSON
pub fn render_json(assessment: &LocationAssessment) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(assessment)?)
}

fn key_factors(breakdown: &HazardBreakdown) -> String {
    match breakdown {
        HazardBreakdown::Seismic(b) => format!(
            "fault={:.1} hist={:.1} mag={:.1} x{:.2}",
            b.fault_proximity_score,
            b.historical_score,
            b.magnitude_score,
            b.soil_amplification * b.mitigation_factor
        ),
        HazardBreakdown::Flood(b) => format!(
            "elev={:.1} water={:.1} hist={:.1} drain={:.1} x{:.2}",
            b.elevation_score,
            b.water_proximity_score,
            b.historical_score,
            b.drainage_score,
            b.rainfall_factor
        ),
        HazardBreakdown::Wildfire(b) => format!(
            "veg={:.1} arid={:.1} hist={:.1} fire={:.1} x{:.2}",
            b.vegetation_score,
            b.climate_aridity_score,
            b.historical_score,
            b.active_fire_proximity_score,
            b.temperature_factor * b.wind_factor
        ),
        HazardBreakdown::Storm(b) => format!(
            "hist={:.1} expo={:.1} season={:.1} x{:.2}",
            b.historical_score,
            b.geographic_exposure_score,
            b.seasonal_score,
            b.coastal_factor * b.elevation_factor
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AssessmentRequest, RiskEngine};
    use crate::geo::GeographicPoint;
    use crate::hazard::{FloodSite, HazardInput};
    use crate::vulnerability::SiteProfile;

    fn assessment() -> LocationAssessment {
        let request = AssessmentRequest {
            location: GeographicPoint::new(29.95, -90.07).unwrap(),
            hazards: vec![HazardInput::Flood {
                water_bodies: vec![],
                events: vec![],
                site: FloodSite {
                    elevation_m: Some(1.0),
                    ..FloodSite::default()
                },
            }],
            profile: SiteProfile::default(),
            hazard_weights: None,
            aggregation_method: None,
        };
        RiskEngine::default().assess(&request).unwrap()
    }

    #[test]
    fn test_render_text_lists_hazards_and_composite() {
        let text = render_text(&assessment());
        assert!(text.starts_with("Location: 29.9500, -90.0700"));
        assert!(text.contains("HAZARD"));
        assert!(text.contains("flood"));
        assert!(text.contains("Composite (weighted_average)"));
        assert!(text.contains("Implement flood warning systems"));
    }

    #[test]
    fn test_render_json_is_parseable() {
        let json = render_json(&assessment()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hazards"][0]["hazard"], "flood");
        assert_eq!(value["hazards"][0]["breakdown"]["hazard"], "flood");
        assert_eq!(value["composite"]["method"], "weighted_average");
        assert!(value["composite"]["score"].is_number());
    }
}
