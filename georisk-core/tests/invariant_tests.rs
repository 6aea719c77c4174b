//! Invariant Tests
//!
//! These tests explicitly validate the numeric contracts that must always hold:
//! bounded scores, distance symmetry, decay endpoints, cache idempotence and
//! configuration validation.

use std::collections::BTreeMap;

use georisk_core::hazard::{FloodSite, SeismicSite, StormSite, WildfireSite};
use georisk_core::{
    composite_risk, haversine_km, historical_weighting, proximity_impact, AggregationMethod,
    AssessmentConfig, ConfigError, DecayModel, GeographicPoint, HazardSource, HazardType,
    HistoricalEvent, RiskEngine, RiskLevel, RiskThresholds,
};

fn point(lat: f64, lon: f64) -> GeographicPoint {
    GeographicPoint::new(lat, lon).expect("valid test point")
}

/// A deterministic spread of points covering poles, antimeridian and the equator
fn sample_points() -> Vec<GeographicPoint> {
    let mut points = Vec::new();
    for lat in [-90.0, -60.5, -12.25, 0.0, 33.3, 71.9, 90.0] {
        for lon in [-180.0, -179.9, -45.0, 0.0, 0.0001, 120.7, 180.0] {
            points.push(point(lat, lon));
        }
    }
    points
}

#[test]
fn test_distance_is_non_negative_symmetric_and_zero_on_diagonal() {
    let points = sample_points();
    let engine = RiskEngine::default();
    for a in &points {
        assert_eq!(haversine_km(a, a), 0.0);
        for b in &points {
            let d = haversine_km(a, b);
            assert!(d >= 0.0);
            assert_eq!(d, haversine_km(b, a));
            assert!(engine.distance_km(a, b) >= 0.0);
        }
    }
}

#[test]
fn test_proximity_endpoints_for_every_model() {
    for model in [
        DecayModel::Linear,
        DecayModel::Exponential,
        DecayModel::InverseSquare,
    ] {
        for radius in [0.5, 10.0, 250.0, 20_000.0] {
            assert_eq!(proximity_impact(0.0, radius, model), 1.0);
            for factor in [1.0, 1.0001, 3.0] {
                assert_eq!(proximity_impact(radius * factor, radius, model), 0.0);
            }
        }
    }
}

#[test]
fn test_historical_weighting_contract() {
    assert_eq!(historical_weighting(&[], 10.0), 0.0);
    for severity in [0.0, 2.5, 7.0, 10.0] {
        let single = [HistoricalEvent::new(severity, 0).unwrap()];
        let score = historical_weighting(&single, 10.0);
        assert!((score - severity * 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_hazard_scores_are_bounded_for_extreme_inputs() {
    let engine = RiskEngine::default();
    let here = point(0.0, 0.0);
    let sources = vec![
        HazardSource::new(here, 10.0, 500.0).unwrap(),
        HazardSource::new(point(0.1, 0.1), 1_000.0, 50.0).unwrap(),
    ];
    let events: Vec<HistoricalEvent> = (0..30)
        .map(|i| HistoricalEvent::new(10.0, i * 10).unwrap())
        .collect();

    for scale in [-100.0, 0.0, 1.0, 1e6] {
        let seismic = engine.score_seismic(
            &here,
            &sources,
            &events,
            &SeismicSite {
                soil_amplification: scale,
                building_code_rating: scale,
            },
        );
        let flood = engine.score_flood(
            &here,
            &sources,
            &events,
            &FloodSite {
                elevation_m: Some(scale),
                drainage_quality: scale,
                annual_rainfall_mm: scale,
            },
        );
        let wildfire = engine.score_wildfire(
            &here,
            &sources,
            &events,
            &WildfireSite {
                vegetation_density: scale,
                climate_aridity_index: scale,
                temperature_avg_c: scale,
                wind_speed_kmh: scale,
            },
        );
        let storm = engine.score_storm(
            &here,
            &sources,
            &events,
            &StormSite {
                coastal_distance_km: Some(scale),
                elevation_m: Some(scale),
                month: 9,
                geographic_exposure: scale,
            },
        );
        for result in [seismic, flood, wildfire, storm] {
            assert!(
                (0.0..=100.0).contains(&result.score),
                "{} out of range at scale {}: {}",
                result.hazard(),
                scale,
                result.score
            );
        }
    }
}

#[test]
fn test_removing_faults_zeroes_fault_proximity() {
    let engine = RiskEngine::default();
    let result = engine.score_seismic(
        &point(37.77, -122.42),
        &[],
        &[HistoricalEvent::new(6.0, 400).unwrap()],
        &SeismicSite::default(),
    );
    match result.breakdown {
        georisk_core::HazardBreakdown::Seismic(b) => {
            assert_eq!(b.fault_proximity_score, 0.0);
            assert_eq!(b.magnitude_score, 0.0);
        }
        other => panic!("unexpected breakdown {:?}", other),
    }
}

#[test]
fn test_composite_reference_values() {
    let scores = BTreeMap::from([
        (HazardType::Seismic, 70.0),
        (HazardType::Flood, 45.0),
        (HazardType::Wildfire, 55.0),
        (HazardType::Storm, 40.0),
    ]);
    let thresholds = RiskThresholds::default();

    let avg = composite_risk(&scores, None, AggregationMethod::WeightedAverage, &thresholds);
    assert!((avg.score - 52.5).abs() < 1e-9);
    assert_eq!(avg.level, RiskLevel::High);

    let max = composite_risk(&scores, None, AggregationMethod::Max, &thresholds);
    assert_eq!(max.score, 70.0);
    assert_eq!(max.level, RiskLevel::High);

    let prob = composite_risk(&scores, None, AggregationMethod::Probabilistic, &thresholds);
    assert!(prob.score >= 70.0);
}

#[test]
fn test_probabilistic_dominates_max() {
    let thresholds = RiskThresholds::default();
    let grid = [0.0, 5.0, 33.0, 50.0, 99.0, 100.0];
    for &a in &grid {
        for &b in &grid {
            for &c in &grid {
                let scores = BTreeMap::from([
                    (HazardType::Seismic, a),
                    (HazardType::Flood, b),
                    (HazardType::Storm, c),
                ]);
                let prob =
                    composite_risk(&scores, None, AggregationMethod::Probabilistic, &thresholds);
                let max = a.max(b).max(c);
                assert!(prob.score + 1e-9 >= max, "{} {} {}", a, b, c);
                assert!(prob.score <= 100.0);
            }
        }
    }
}

#[test]
fn test_cache_idempotence_and_bound() {
    let config = AssessmentConfig::builder()
        .proximity_cache_size(8)
        .build()
        .unwrap();
    let engine = RiskEngine::new(config);
    let origin = point(48.8566, 2.3522);

    let mut previous_size = 0;
    for i in 0..20 {
        let other = point(40.0 + i as f64 * 0.5, 10.0);
        let first = engine.distance_km(&origin, &other);
        let second = engine.distance_km(&origin, &other);
        assert_eq!(first.to_bits(), second.to_bits());

        let size = engine.get_performance_stats().cache_size;
        assert!(size <= previous_size + 1);
        assert!(size <= 8);
        previous_size = size;
    }
    assert_eq!(engine.get_performance_stats().cache_utilization, 1.0);
}

#[test]
fn test_invalid_seismic_weights_fail_construction() {
    let result = AssessmentConfig::builder()
        .seismic_weights(georisk_core::config::SeismicWeights {
            fault_proximity: 0.40,
            historical: 0.25,
            magnitude: 0.30,
        })
        .build();
    assert!(matches!(result, Err(ConfigError::WeightSum { .. })));
}

#[test]
fn test_invalid_point_fails_construction() {
    assert!(GeographicPoint::new(91.0, 0.0).is_err());
    assert!(GeographicPoint::new(0.0, 181.0).is_err());
    assert!(HazardSource::new(point(0.0, 0.0), 5.0, 0.0).is_err());
}
