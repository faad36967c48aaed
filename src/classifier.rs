use crate::signal::FEATURE_COUNT;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pre-trained binary classifier over the feature vector.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Probability of the phishing class, nominally in `0.0..=1.0`
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64>;
}

/// Logistic regression exported from an offline training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

fn default_model_name() -> String {
    "logistic-regression".to_string()
}

impl LogisticModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid model file: {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let model: LogisticModel = serde_json::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            bail!(
                "Model expects {} features, feature vector has {}",
                self.weights.len(),
                FEATURE_COUNT
            );
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            bail!("Model parameters must be finite");
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(anyhow!("Model has {} weights", self.weights.len()));
        }
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(features.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_json(weights: usize) -> String {
        let weights: Vec<String> = (0..weights).map(|_| "0.5".to_string()).collect();
        format!(
            r#"{{"name": "test-model", "weights": [{}], "intercept": -1.0}}"#,
            weights.join(", ")
        )
    }

    #[test]
    fn test_load_valid_model() {
        let model = LogisticModel::from_json(&model_json(FEATURE_COUNT)).unwrap();
        assert_eq!(model.name(), "test-model");
        assert_eq!(model.weights.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_rejects_wrong_weight_count() {
        assert!(LogisticModel::from_json(&model_json(25)).is_err());
        assert!(LogisticModel::from_json(&model_json(30)).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(LogisticModel::from_json("{\"weights\": ").is_err());
        assert!(LogisticModel::from_json("{}").is_err());
    }

    #[test]
    fn test_missing_name_uses_default() {
        let json = format!(
            r#"{{"weights": [{}], "intercept": 0.0}}"#,
            vec!["0"; FEATURE_COUNT].join(",")
        );
        let model = LogisticModel::from_json(&json).unwrap();
        assert_eq!(model.name(), "logistic-regression");
    }

    #[test]
    fn test_predict_proba() {
        let model = LogisticModel {
            name: "zero".to_string(),
            weights: vec![0.0; FEATURE_COUNT],
            intercept: 0.0,
        };
        let p = model.predict_proba(&[1.0; FEATURE_COUNT]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);

        let model = LogisticModel {
            name: "negative".to_string(),
            weights: vec![-1.0; FEATURE_COUNT],
            intercept: 0.0,
        };
        assert!(model.predict_proba(&[1.0; FEATURE_COUNT]).unwrap() < 0.01);
        assert!(model.predict_proba(&[-1.0; FEATURE_COUNT]).unwrap() > 0.99);
    }

    #[test]
    fn test_from_file_missing() {
        let err = LogisticModel::from_file("/nonexistent/model.json").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/model.json"));
    }
}
