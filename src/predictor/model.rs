use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ModelError;
use super::features::FEATURE_COUNT;

/// A trained regressor mapping a feature vector to a final-score estimate.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait ScoreModel: Send + Sync {
    /// Raw model output for one feature vector.
    fn score(&self, features: &[f64]) -> f64;

    /// Number of input columns the model was trained on.
    fn feature_count(&self) -> usize;

    /// Human-readable name for logging and the form footer.
    fn name(&self) -> &str;

    /// Root-mean-square error on the held-out set, when the artifact records it.
    fn rmse(&self) -> Option<f64> {
        None
    }
}

/// Ordinary least-squares model exported from training as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub intercept: f64,
    /// One weight per feature column, in feature-vector order
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub rmse: Option<f64>,
}

fn default_name() -> String {
    "linear_regression".to_string()
}

impl LinearRegressionModel {
    /// Read and check a model artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ModelError> {
        let model: LinearRegressionModel = serde_json::from_str(raw)?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: self.coefficients.len(),
            });
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFinite("intercept".into()));
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ModelError::NonFinite(format!("coefficients[{}]", i)));
        }
        Ok(())
    }
}

impl ScoreModel for LinearRegressionModel {
    fn score(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.coefficients.len());
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rmse(&self) -> Option<f64> {
        self.rmse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BUNDLED: &str = include_str!("../../models/linear_regression_model.json");

    fn coefficients_json(n: usize) -> String {
        let coefs: Vec<String> = (0..n).map(|_| "0.5".to_string()).collect();
        format!(r#"{{"intercept": 10.0, "coefficients": [{}]}}"#, coefs.join(","))
    }

    #[test]
    fn bundled_artifact_loads() {
        let model = LinearRegressionModel::from_json_str(BUNDLED).unwrap();
        assert_eq!(model.feature_count(), FEATURE_COUNT);
        assert!(model.rmse().is_some());
    }

    #[test]
    fn load_from_disk() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/linear_regression_model.json");
        let model = LinearRegressionModel::load(path).unwrap();
        assert_eq!(model.name(), "linear_regression");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LinearRegressionModel::load("no/such/model.json").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn name_defaults_when_absent() {
        let model = LinearRegressionModel::from_json_str(&coefficients_json(21)).unwrap();
        assert_eq!(model.name(), "linear_regression");
        assert_eq!(model.rmse(), None);
    }

    #[test]
    fn score_is_intercept_plus_dot_product() {
        let model = LinearRegressionModel::from_json_str(&coefficients_json(21)).unwrap();
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 80.0;
        x[3] = 40.0;
        // 10 + 0.5*80 + 0.5*40
        assert_relative_eq!(model.score(&x), 70.0, epsilon = 1e-9);
    }

    #[test]
    fn wrong_coefficient_count_is_rejected() {
        let err = LinearRegressionModel::from_json_str(&coefficients_json(20)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCount {
                expected: 21,
                actual: 20
            }
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = LinearRegressionModel::from_json_str("{\"intercept\": 1.0").unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
