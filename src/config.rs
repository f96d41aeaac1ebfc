//! TOML-based scenario configuration and preset definitions.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{ConstantModel, DemandModel, LinearModel, NaiveLagModel};
use crate::sim::scenario::Scenario;
use crate::sim::types::{Competitors, PriceAdjustment};

/// Discount deltas outside this range are rejected.
pub const DISCOUNT_RANGE: std::ops::RangeInclusive<i32> = -50..=50;

/// Feature names computed by the simulator; competitor identifiers may not shadow them.
const RESERVED_FEATURES: &[&str] = &[
    "base_price",
    "sale_price",
    "competitor_price_avg",
    "discount_pct",
    "price_ratio",
    "rolling_mean_7",
    "day_of_month",
    "day_of_week",
    "lag_1",
    "lag_2",
    "lag_3",
    "lag_4",
    "lag_5",
    "lag_6",
    "lag_7",
];

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Declared competitor identifiers.
    #[serde(default)]
    pub competitors: CompetitorsConfig,
    /// Where the historical catalog comes from.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Demand model parameters.
    #[serde(default)]
    pub model: ModelConfig,
    /// Competitor scenarios to compare.
    #[serde(default = "Scenario::default_set")]
    pub scenarios: Vec<Scenario>,
}

/// Run parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Product to simulate; defaults to the first product in the catalog.
    pub product: Option<String>,
    /// Price change applied to the base price, in percent.
    pub discount_delta: i32,
    /// Competitor price change for the main forecast, in percent.
    pub competitor_delta: i32,
    /// Run scenarios concurrently.
    pub parallel_scenarios: bool,
    /// Days of the month highlighted in reports (e.g. a promotional event).
    pub days_of_interest: Vec<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            product: None,
            discount_delta: 0,
            competitor_delta: 0,
            parallel_scenarios: true,
            days_of_interest: vec![28],
        }
    }
}

/// Declared competitor identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompetitorsConfig {
    pub names: Vec<String>,
}

impl Default for CompetitorsConfig {
    fn default() -> Self {
        Self {
            names: vec![
                "amazon".to_string(),
                "decathlon".to_string(),
                "deporvillage".to_string(),
            ],
        }
    }
}

/// Historical catalog source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// `"synthetic"` (seeded demo data) or `"csv"`.
    pub source: String,
    /// CSV path, required when `source = "csv"`.
    pub path: Option<PathBuf>,
    /// First simulated day for synthetic data (quoted, `"YYYY-MM-DD"`).
    pub start_date: NaiveDate,
    /// Synthetic horizon length in days.
    pub days: usize,
    /// Number of synthetic products.
    pub products: usize,
    /// Synthetic data seed.
    pub seed: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            path: None,
            start_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default(),
            days: 30,
            products: 3,
            seed: 42,
        }
    }
}

/// Demand model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// `"constant"`, `"naive"`, or `"linear"`.
    pub kind: String,
    /// Output of the constant model.
    pub value: f64,
    /// Linear model intercept.
    pub intercept: f64,
    /// Linear model coefficients keyed by feature name.
    pub coefficients: BTreeMap<String, f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: "linear".to_string(),
            value: 10.0,
            intercept: 8.0,
            coefficients: BTreeMap::from([
                ("lag_1".to_string(), 0.45),
                ("lag_7".to_string(), 0.15),
                ("rolling_mean_7".to_string(), 0.25),
                ("price_ratio".to_string(), -5.0),
                ("discount_pct".to_string(), 0.05),
                ("is_weekend".to_string(), 2.0),
            ]),
        }
    }
}

impl ModelConfig {
    /// Instantiates the configured model.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown `kind`.
    pub fn build(&self) -> Result<Box<dyn DemandModel>, ConfigError> {
        match self.kind.as_str() {
            "constant" => Ok(Box::new(ConstantModel::new(self.value))),
            "naive" => Ok(Box::new(NaiveLagModel::default())),
            "linear" => Ok(Box::new(LinearModel::new(
                self.intercept,
                &self.coefficients,
            ))),
            other => Err(ConfigError {
                field: "model.kind".into(),
                message: format!("must be \"constant\", \"naive\" or \"linear\", got \"{other}\""),
            }),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.discount_delta"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} - {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// Returns the baseline scenario: current prices, standard competitor comparison.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            competitors: CompetitorsConfig::default(),
            history: HistoryConfig::default(),
            model: ModelConfig::default(),
            scenarios: Scenario::default_set(),
        }
    }

    /// Returns the promo preset: 20% off list price across the horizon.
    pub fn promo() -> Self {
        Self {
            simulation: SimulationConfig {
                discount_delta: -20,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the price-war preset: competitors undercut aggressively.
    pub fn price_war() -> Self {
        Self {
            simulation: SimulationConfig {
                discount_delta: -10,
                competitor_delta: -10,
                ..SimulationConfig::default()
            },
            scenarios: vec![
                Scenario::new("Holding (0%)", 0),
                Scenario::new("Undercut (-5%)", -5),
                Scenario::new("Undercut (-10%)", -10),
                Scenario::new("Undercut (-15%)", -15),
            ],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "promo", "price_war"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "promo" => Ok(Self::promo()),
            "price_war" => Ok(Self::price_war()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Declared competitor set.
    pub fn competitors(&self) -> Competitors {
        Competitors::new(self.competitors.names.iter().cloned())
    }

    /// Adjustment for the main forecast.
    pub fn adjustment(&self) -> PriceAdjustment {
        PriceAdjustment::new(
            self.simulation.discount_delta,
            self.simulation.competitor_delta,
        )
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !DISCOUNT_RANGE.contains(&s.discount_delta) {
            errors.push(ConfigError {
                field: "simulation.discount_delta".into(),
                message: format!(
                    "must be in [{}, {}]",
                    DISCOUNT_RANGE.start(),
                    DISCOUNT_RANGE.end()
                ),
            });
        }
        if s.days_of_interest.iter().any(|d| !(1..=31).contains(d)) {
            errors.push(ConfigError {
                field: "simulation.days_of_interest".into(),
                message: "days must be in [1, 31]".into(),
            });
        }

        let c = &self.competitors;
        if c.names.is_empty() {
            errors.push(ConfigError {
                field: "competitors.names".into(),
                message: "must declare at least one competitor".into(),
            });
        }
        let mut seen = HashSet::new();
        for name in &c.names {
            if !seen.insert(name.as_str()) {
                errors.push(ConfigError {
                    field: "competitors.names".into(),
                    message: format!("duplicate competitor \"{name}\""),
                });
            }
            if RESERVED_FEATURES.contains(&name.as_str()) {
                errors.push(ConfigError {
                    field: "competitors.names".into(),
                    message: format!("\"{name}\" shadows a computed feature"),
                });
            }
        }

        let h = &self.history;
        match h.source.as_str() {
            "csv" => {
                if h.path.is_none() {
                    errors.push(ConfigError {
                        field: "history.path".into(),
                        message: "required when history.source is \"csv\"".into(),
                    });
                }
            }
            "synthetic" => {
                if h.days == 0 {
                    errors.push(ConfigError {
                        field: "history.days".into(),
                        message: "must be > 0".into(),
                    });
                }
                if h.products == 0 {
                    errors.push(ConfigError {
                        field: "history.products".into(),
                        message: "must be > 0".into(),
                    });
                }
            }
            other => errors.push(ConfigError {
                field: "history.source".into(),
                message: format!("must be \"synthetic\" or \"csv\", got \"{other}\""),
            }),
        }

        let m = &self.model;
        match m.kind.as_str() {
            "constant" => {
                if !m.value.is_finite() {
                    errors.push(ConfigError {
                        field: "model.value".into(),
                        message: "must be finite".into(),
                    });
                }
            }
            "naive" => {}
            "linear" => {
                if m.coefficients.is_empty() {
                    errors.push(ConfigError {
                        field: "model.coefficients".into(),
                        message: "linear model needs at least one coefficient".into(),
                    });
                }
                if !m.intercept.is_finite() || m.coefficients.values().any(|v| !v.is_finite()) {
                    errors.push(ConfigError {
                        field: "model.coefficients".into(),
                        message: "intercept and coefficients must be finite".into(),
                    });
                }
            }
            other => errors.push(ConfigError {
                field: "model.kind".into(),
                message: format!("must be \"constant\", \"naive\" or \"linear\", got \"{other}\""),
            }),
        }

        if self.scenarios.is_empty() {
            errors.push(ConfigError {
                field: "scenarios".into(),
                message: "must declare at least one scenario".into(),
            });
        }
        let mut names = HashSet::new();
        for (i, sc) in self.scenarios.iter().enumerate() {
            if !names.insert(sc.name.as_str()) {
                errors.push(ConfigError {
                    field: format!("scenarios[{i}].name"),
                    message: format!("duplicate scenario \"{}\"", sc.name),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
product = "Yoga Mat"
discount_delta = -15
competitor_delta = 5
parallel_scenarios = false
days_of_interest = [28, 29]

[competitors]
names = ["amazon", "decathlon"]

[history]
source = "synthetic"
start_date = "2025-11-01"
days = 14
products = 2
seed = 7

[model]
kind = "linear"
intercept = 3.0

[model.coefficients]
lag_1 = 0.8
price_ratio = -2.0

[[scenarios]]
name = "flat"
competitor_delta = 0

[[scenarios]]
name = "cheaper"
competitor_delta = -10
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().and_then(|c| c.simulation.product.as_deref()),
            Some("Yoga Mat")
        );
        assert_eq!(cfg.as_ref().map(|c| c.history.days), Some(14));
        assert_eq!(cfg.as_ref().map(|c| c.scenarios.len()), Some(2));
        assert_eq!(
            cfg.as_ref().map(|c| c.adjustment()),
            Some(PriceAdjustment::new(-15, 5))
        );
        assert_eq!(
            cfg.as_ref()
                .and_then(|c| c.model.build().ok())
                .map(|m| m.feature_names().len()),
            Some(2)
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
discount_delta = 10
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.discount_delta), Some(10));
        assert_eq!(cfg.as_ref().map(|c| c.history.days), Some(30));
        assert_eq!(cfg.as_ref().map(|c| c.scenarios.len()), Some(3));
        assert_eq!(cfg.as_ref().map(|c| c.competitors().len()), Some(3));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
discount_delta = 0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_discount_out_of_range() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.discount_delta = 60;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.discount_delta"));
    }

    #[test]
    fn any_competitor_delta_is_accepted() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.competitor_delta = -100;
        cfg.scenarios.push(Scenario::new("gone", -100));
        cfg.scenarios.push(Scenario::new("collapse", -250));
        let errors = cfg.validate();
        assert!(errors.is_empty(), "competitor deltas are unrestricted: {errors:?}");
    }

    #[test]
    fn validation_catches_competitor_problems() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.competitors.names = vec!["amazon".into(), "amazon".into(), "lag_1".into()];
        let errors = cfg.validate();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.field == "competitors.names")
                .count(),
            2
        );

        cfg.competitors.names.clear();
        assert!(cfg.validate().iter().any(|e| e.field == "competitors.names"));
    }

    #[test]
    fn validation_catches_csv_without_path() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.history.source = "csv".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "history.path"));
    }

    #[test]
    fn validation_catches_bad_model_kind() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.model.kind = "xgboost".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "model.kind"));
    }

    #[test]
    fn validation_catches_duplicate_scenarios() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.scenarios.push(Scenario::new("No change (0%)", 0));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "scenarios[3].name"));
    }

    #[test]
    fn price_war_undercuts_competitors() {
        let cfg = ScenarioConfig::price_war();
        assert!(cfg.scenarios.iter().all(|s| s.competitor_delta <= 0));
        assert!(cfg.simulation.competitor_delta < 0);
    }

    #[test]
    fn model_kinds_build() {
        let mut m = ModelConfig::default();
        assert_eq!(m.build().unwrap().name(), "linear");
        m.kind = "naive".to_string();
        assert_eq!(m.build().unwrap().name(), "naive");
        m.kind = "constant".to_string();
        assert_eq!(m.build().unwrap().predict(&[]), Ok(10.0));
        m.kind = "xgboost".to_string();
        let err = m.build().err().unwrap();
        assert_eq!(err.field, "model.kind");
    }
}
