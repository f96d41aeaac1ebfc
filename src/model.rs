//! Demand models consumed by the forecaster.

use std::collections::BTreeMap;

/// A trained regression model the forecaster can query.
///
/// The forecaster never inspects or mutates the model: it projects each
/// record onto [`feature_names`](DemandModel::feature_names), in that order,
/// and calls [`predict`](DemandModel::predict) once per day. Output may be
/// negative; the caller clamps it.
pub trait DemandModel: Send + Sync {
    /// Ordered names of the inputs the model requires.
    fn feature_names(&self) -> &[String];

    /// Predicts demand for one feature vector laid out as [`feature_names`](DemandModel::feature_names).
    fn predict(&self, features: &[f64]) -> Result<f64, String>;

    /// Short human-readable model name.
    fn name(&self) -> &str;
}

/// Returns the same value for every input.
#[derive(Debug, Clone)]
pub struct ConstantModel {
    value: f64,
    features: Vec<String>,
}

impl ConstantModel {
    /// Constant model requiring no features.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            features: Vec::new(),
        }
    }

    /// Constant model that still demands the given inputs (useful to exercise projection).
    pub fn with_features<I, S>(value: f64, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value,
            features: features.into_iter().map(Into::into).collect(),
        }
    }
}

impl DemandModel for ConstantModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, _features: &[f64]) -> Result<f64, String> {
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// "Tomorrow is today" model: predicts yesterday's demand (`lag_1`).
#[derive(Debug, Clone)]
pub struct NaiveLagModel {
    features: Vec<String>,
}

impl Default for NaiveLagModel {
    fn default() -> Self {
        Self {
            features: vec!["lag_1".to_string()],
        }
    }
}

impl DemandModel for NaiveLagModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, String> {
        features
            .first()
            .copied()
            .ok_or_else(|| "naive model expects lag_1".to_string())
    }

    fn name(&self) -> &str {
        "naive"
    }
}

/// Linear regression: `intercept + sum(coef_f * x_f)`.
///
/// Features are ordered by name, so two models built from the same
/// coefficient table always project records identically.
#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    features: Vec<String>,
    weights: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: &BTreeMap<String, f64>) -> Self {
        Self {
            intercept,
            features: coefficients.keys().cloned().collect(),
            weights: coefficients.values().copied().collect(),
        }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl DemandModel for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.weights.len() {
            return Err(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.len()
            ));
        }
        Ok(self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }

    fn name(&self) -> &str {
        "linear"
    }
}
