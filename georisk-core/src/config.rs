//! Assessment configuration
//!
//! `AssessmentConfig` is the validated runtime form every component reads. It
//! can only be obtained through `AssessmentConfigBuilder::build()` (or
//! `Default`), so a config that exists is a config that passed validation.
//!
//! `GeoriskConfig` is the JSON file form. All fields are optional and missing
//! values fall back to defaults. Search order for the file:
//! 1. Explicit path (--config CLI flag)
//! 2. `.georiskrc.json` in the project root
//! 3. `georisk.config.json` in the project root

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CACHE_PRECISION, DEFAULT_CACHE_SIZE, MAX_CACHE_PRECISION};
use crate::composite::AggregationMethod;
use crate::error::ConfigError;
use crate::hazard::HazardType;
use crate::history::DEFAULT_DECAY_YEARS;
use crate::proximity::DecayModel;
use crate::risk::RiskThresholds;

/// Allowed deviation of a weight set's sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Default informational time budget for one assessment
pub const DEFAULT_CALCULATION_TIMEOUT_MS: u64 = 100;

/// Seismic sub-score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicWeights {
    pub fault_proximity: f64,
    pub historical: f64,
    pub magnitude: f64,
}

impl Default for SeismicWeights {
    fn default() -> Self {
        SeismicWeights {
            fault_proximity: 0.40,
            historical: 0.25,
            magnitude: 0.35,
        }
    }
}

/// Flood sub-score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloodWeights {
    pub elevation: f64,
    pub water_proximity: f64,
    pub historical: f64,
    pub drainage: f64,
}

impl Default for FloodWeights {
    fn default() -> Self {
        FloodWeights {
            elevation: 0.35,
            water_proximity: 0.30,
            historical: 0.20,
            drainage: 0.15,
        }
    }
}

/// Wildfire sub-score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WildfireWeights {
    pub vegetation: f64,
    pub climate_aridity: f64,
    pub historical: f64,
    pub active_fire_proximity: f64,
}

impl Default for WildfireWeights {
    fn default() -> Self {
        WildfireWeights {
            vegetation: 0.35,
            climate_aridity: 0.25,
            historical: 0.20,
            active_fire_proximity: 0.20,
        }
    }
}

/// Storm sub-score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StormWeights {
    pub historical: f64,
    pub geographic_exposure: f64,
    pub seasonal: f64,
}

impl Default for StormWeights {
    fn default() -> Self {
        StormWeights {
            historical: 0.40,
            geographic_exposure: 0.30,
            seasonal: 0.30,
        }
    }
}

/// One weight set per hazard type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardWeights {
    pub seismic: SeismicWeights,
    pub flood: FloodWeights,
    pub wildfire: WildfireWeights,
    pub storm: StormWeights,
}

impl HazardWeights {
    /// Named entries of every set, in a fixed order
    fn sets(&self) -> [(HazardType, Vec<(&'static str, f64)>); 4] {
        let s = &self.seismic;
        let f = &self.flood;
        let w = &self.wildfire;
        let st = &self.storm;
        [
            (
                HazardType::Seismic,
                vec![
                    ("fault_proximity", s.fault_proximity),
                    ("historical", s.historical),
                    ("magnitude", s.magnitude),
                ],
            ),
            (
                HazardType::Flood,
                vec![
                    ("elevation", f.elevation),
                    ("water_proximity", f.water_proximity),
                    ("historical", f.historical),
                    ("drainage", f.drainage),
                ],
            ),
            (
                HazardType::Wildfire,
                vec![
                    ("vegetation", w.vegetation),
                    ("climate_aridity", w.climate_aridity),
                    ("historical", w.historical),
                    ("active_fire_proximity", w.active_fire_proximity),
                ],
            ),
            (
                HazardType::Storm,
                vec![
                    ("historical", st.historical),
                    ("geographic_exposure", st.geographic_exposure),
                    ("seasonal", st.seasonal),
                ],
            ),
        ]
    }

    /// Each weight non-negative and finite, each set summing to 1.0
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (hazard, entries) in self.sets() {
            for &(name, value) in &entries {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(ConfigError::InvalidWeight {
                        hazard,
                        name,
                        value,
                    });
                }
            }
            let sum: f64 = entries.iter().map(|(_, v)| v).sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ConfigError::WeightSum { hazard, sum });
            }
        }
        Ok(())
    }
}

/// Validated configuration shared by every engine component
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentConfig {
    weights: HazardWeights,
    aggregation_method: AggregationMethod,
    thresholds: RiskThresholds,
    decay_years: f64,
    proximity_cache_size: NonZeroUsize,
    cache_precision: u32,
    decay_model: DecayModel,
    calculation_timeout_ms: u64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        AssessmentConfig {
            weights: HazardWeights::default(),
            aggregation_method: AggregationMethod::default(),
            thresholds: RiskThresholds::default(),
            decay_years: DEFAULT_DECAY_YEARS,
            proximity_cache_size: NonZeroUsize::new(DEFAULT_CACHE_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            cache_precision: DEFAULT_CACHE_PRECISION,
            decay_model: DecayModel::default(),
            calculation_timeout_ms: DEFAULT_CALCULATION_TIMEOUT_MS,
        }
    }
}

impl AssessmentConfig {
    pub fn builder() -> AssessmentConfigBuilder {
        AssessmentConfigBuilder::default()
    }

    pub fn weights(&self) -> &HazardWeights {
        &self.weights
    }

    pub fn aggregation_method(&self) -> AggregationMethod {
        self.aggregation_method
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn decay_years(&self) -> f64 {
        self.decay_years
    }

    pub fn proximity_cache_size(&self) -> NonZeroUsize {
        self.proximity_cache_size
    }

    pub fn cache_precision(&self) -> u32 {
        self.cache_precision
    }

    pub fn decay_model(&self) -> DecayModel {
        self.decay_model
    }

    /// Informational budget only; nothing inside the engine enforces it
    pub fn calculation_timeout_ms(&self) -> u64 {
        self.calculation_timeout_ms
    }

    /// Express this config in file form (every field populated)
    pub fn to_file_config(&self) -> GeoriskConfig {
        let w = &self.weights;
        GeoriskConfig {
            weights: Some(WeightConfig {
                seismic: Some(SeismicWeightConfig {
                    fault_proximity: Some(w.seismic.fault_proximity),
                    historical: Some(w.seismic.historical),
                    magnitude: Some(w.seismic.magnitude),
                }),
                flood: Some(FloodWeightConfig {
                    elevation: Some(w.flood.elevation),
                    water_proximity: Some(w.flood.water_proximity),
                    historical: Some(w.flood.historical),
                    drainage: Some(w.flood.drainage),
                }),
                wildfire: Some(WildfireWeightConfig {
                    vegetation: Some(w.wildfire.vegetation),
                    climate_aridity: Some(w.wildfire.climate_aridity),
                    historical: Some(w.wildfire.historical),
                    active_fire_proximity: Some(w.wildfire.active_fire_proximity),
                }),
                storm: Some(StormWeightConfig {
                    historical: Some(w.storm.historical),
                    geographic_exposure: Some(w.storm.geographic_exposure),
                    seasonal: Some(w.storm.seasonal),
                }),
            }),
            composite_aggregation_method: Some(self.aggregation_method.as_str().to_string()),
            thresholds: Some(ThresholdConfig {
                moderate: Some(self.thresholds.moderate),
                high: Some(self.thresholds.high),
                critical: Some(self.thresholds.critical),
            }),
            decay_years: Some(self.decay_years),
            proximity_cache_size: Some(self.proximity_cache_size.get()),
            cache_precision: Some(self.cache_precision),
            proximity_decay_model: Some(self.decay_model.as_str().to_string()),
            calculation_timeout_ms: Some(self.calculation_timeout_ms),
        }
    }
}

/// Collects options, then validates them all at once in `build()`
#[derive(Debug, Clone)]
pub struct AssessmentConfigBuilder {
    weights: HazardWeights,
    aggregation_method: AggregationMethod,
    thresholds: RiskThresholds,
    decay_years: f64,
    proximity_cache_size: usize,
    cache_precision: u32,
    decay_model: DecayModel,
    calculation_timeout_ms: u64,
}

impl Default for AssessmentConfigBuilder {
    fn default() -> Self {
        let defaults = AssessmentConfig::default();
        AssessmentConfigBuilder {
            weights: defaults.weights,
            aggregation_method: defaults.aggregation_method,
            thresholds: defaults.thresholds,
            decay_years: defaults.decay_years,
            proximity_cache_size: defaults.proximity_cache_size.get(),
            cache_precision: defaults.cache_precision,
            decay_model: defaults.decay_model,
            calculation_timeout_ms: defaults.calculation_timeout_ms,
        }
    }
}

impl AssessmentConfigBuilder {
    pub fn weights(mut self, weights: HazardWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn seismic_weights(mut self, weights: SeismicWeights) -> Self {
        self.weights.seismic = weights;
        self
    }

    pub fn flood_weights(mut self, weights: FloodWeights) -> Self {
        self.weights.flood = weights;
        self
    }

    pub fn wildfire_weights(mut self, weights: WildfireWeights) -> Self {
        self.weights.wildfire = weights;
        self
    }

    pub fn storm_weights(mut self, weights: StormWeights) -> Self {
        self.weights.storm = weights;
        self
    }

    pub fn aggregation_method(mut self, method: AggregationMethod) -> Self {
        self.aggregation_method = method;
        self
    }

    pub fn thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn decay_years(mut self, years: f64) -> Self {
        self.decay_years = years;
        self
    }

    pub fn proximity_cache_size(mut self, size: usize) -> Self {
        self.proximity_cache_size = size;
        self
    }

    pub fn cache_precision(mut self, decimals: u32) -> Self {
        self.cache_precision = decimals;
        self
    }

    pub fn decay_model(mut self, model: DecayModel) -> Self {
        self.decay_model = model;
        self
    }

    pub fn calculation_timeout_ms(mut self, ms: u64) -> Self {
        self.calculation_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Result<AssessmentConfig, ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()?;

        if !(self.decay_years.is_finite() && self.decay_years > 0.0) {
            return Err(ConfigError::NonPositiveDecayYears(self.decay_years));
        }
        let proximity_cache_size =
            NonZeroUsize::new(self.proximity_cache_size).ok_or(ConfigError::ZeroCacheSize)?;
        if self.cache_precision > MAX_CACHE_PRECISION {
            return Err(ConfigError::CachePrecisionTooHigh {
                got: self.cache_precision,
                max: MAX_CACHE_PRECISION,
            });
        }
        if self.calculation_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(AssessmentConfig {
            weights: self.weights,
            aggregation_method: self.aggregation_method,
            thresholds: self.thresholds,
            decay_years: self.decay_years,
            proximity_cache_size,
            cache_precision: self.cache_precision,
            decay_model: self.decay_model,
            calculation_timeout_ms: self.calculation_timeout_ms,
        })
    }
}

/// Georisk configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoriskConfig {
    /// Per-hazard sub-score weights (each set must sum to 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,

    /// weighted_average (default), max or probabilistic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_aggregation_method: Option<String>,

    /// Risk level band lower bounds (default: 25 / 50 / 75)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdConfig>,

    /// e-folding time of historical event decay, in years (default: 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay_years: Option<f64>,

    /// Maximum cached coordinate pairs (default: 1000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_cache_size: Option<usize>,

    /// Decimal places kept in cache keys (default: 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_precision: Option<u32>,

    /// linear, exponential (default) or inverse_square
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_decay_model: Option<String>,

    /// Informational per-assessment time budget (default: 100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seismic: Option<SeismicWeightConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flood: Option<FloodWeightConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildfire: Option<WildfireWeightConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storm: Option<StormWeightConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeismicWeightConfig {
    pub fault_proximity: Option<f64>,
    pub historical: Option<f64>,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloodWeightConfig {
    pub elevation: Option<f64>,
    pub water_proximity: Option<f64>,
    pub historical: Option<f64>,
    pub drainage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WildfireWeightConfig {
    pub vegetation: Option<f64>,
    pub climate_aridity: Option<f64>,
    pub historical: Option<f64>,
    pub active_fire_proximity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StormWeightConfig {
    pub historical: Option<f64>,
    pub geographic_exposure: Option<f64>,
    pub seasonal: Option<f64>,
}

/// Custom risk band thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Lower bound of MODERATE (default: 25)
    pub moderate: Option<f64>,
    /// Lower bound of HIGH (default: 50)
    pub high: Option<f64>,
    /// Lower bound of CRITICAL (default: 75)
    pub critical: Option<f64>,
}

impl WeightConfig {
    fn merge_into(&self, base: HazardWeights) -> HazardWeights {
        let mut w = base;
        if let Some(s) = &self.seismic {
            w.seismic = SeismicWeights {
                fault_proximity: s.fault_proximity.unwrap_or(w.seismic.fault_proximity),
                historical: s.historical.unwrap_or(w.seismic.historical),
                magnitude: s.magnitude.unwrap_or(w.seismic.magnitude),
            };
        }
        if let Some(f) = &self.flood {
            w.flood = FloodWeights {
                elevation: f.elevation.unwrap_or(w.flood.elevation),
                water_proximity: f.water_proximity.unwrap_or(w.flood.water_proximity),
                historical: f.historical.unwrap_or(w.flood.historical),
                drainage: f.drainage.unwrap_or(w.flood.drainage),
            };
        }
        if let Some(wf) = &self.wildfire {
            w.wildfire = WildfireWeights {
                vegetation: wf.vegetation.unwrap_or(w.wildfire.vegetation),
                climate_aridity: wf.climate_aridity.unwrap_or(w.wildfire.climate_aridity),
                historical: wf.historical.unwrap_or(w.wildfire.historical),
                active_fire_proximity: wf
                    .active_fire_proximity
                    .unwrap_or(w.wildfire.active_fire_proximity),
            };
        }
        if let Some(st) = &self.storm {
            w.storm = StormWeights {
                historical: st.historical.unwrap_or(w.storm.historical),
                geographic_exposure: st.geographic_exposure.unwrap_or(w.storm.geographic_exposure),
                seasonal: st.seasonal.unwrap_or(w.storm.seasonal),
            };
        }
        w
    }
}

impl GeoriskConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    /// Resolve into a validated `AssessmentConfig`, filling gaps with defaults
    pub fn resolve(&self) -> Result<AssessmentConfig, ConfigError> {
        let mut builder = AssessmentConfig::builder();

        if let Some(weights) = &self.weights {
            builder = builder.weights(weights.merge_into(HazardWeights::default()));
        }
        if let Some(method) = &self.composite_aggregation_method {
            builder = builder.aggregation_method(method.parse()?);
        }
        if let Some(t) = &self.thresholds {
            let defaults = RiskThresholds::default();
            builder = builder.thresholds(RiskThresholds {
                moderate: t.moderate.unwrap_or(defaults.moderate),
                high: t.high.unwrap_or(defaults.high),
                critical: t.critical.unwrap_or(defaults.critical),
            });
        }
        if let Some(years) = self.decay_years {
            builder = builder.decay_years(years);
        }
        if let Some(size) = self.proximity_cache_size {
            builder = builder.proximity_cache_size(size);
        }
        if let Some(precision) = self.cache_precision {
            builder = builder.cache_precision(precision);
        }
        if let Some(model) = &self.proximity_decay_model {
            builder = builder.decay_model(model.parse()?);
        }
        if let Some(ms) = self.calculation_timeout_ms {
            builder = builder.calculation_timeout_ms(ms);
        }

        builder.build()
    }
}

/// A validated config and the file it came from (None if defaults)
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AssessmentConfig,
    pub config_path: Option<PathBuf>,
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.georiskrc.json`
/// 2. `georisk.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(GeoriskConfig, PathBuf)>> {
    for name in [".georiskrc.json", "georisk.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<GeoriskConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: GeoriskConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (file_config, source_path) = if let Some(path) = config_path {
        (load_config_file(path)?, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (GeoriskConfig::default(), None),
        }
    };

    let config = file_config.resolve()?;
    if let Some(path) = &source_path {
        tracing::info!(path = %path.display(), "loaded assessment config");
    }
    Ok(ResolvedConfig {
        config,
        config_path: source_path,
    })
}
