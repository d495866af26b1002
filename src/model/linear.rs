//! Logistic regression serialised as JSON: p = sigmoid(w·x + b).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{read_artifact, ModelInfo, RiskModel};
use crate::error::{LoadError, ModelError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearArtifact {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

pub struct LinearRiskModel {
    info: ModelInfo,
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRiskModel {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let (bytes, sha256) = read_artifact(path)?;
        let corrupt = |cause: String| LoadError::Corrupt {
            path: path.to_path_buf(),
            cause,
        };
        let artifact: LinearArtifact =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
        if artifact.features.is_empty() {
            return Err(corrupt("no features".to_string()));
        }
        if artifact.features.len() != artifact.coefficients.len() {
            return Err(corrupt(format!(
                "{} features but {} coefficients",
                artifact.features.len(),
                artifact.coefficients.len()
            )));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(corrupt("non-finite parameter".to_string()));
        }
        Ok(Self {
            info: ModelInfo {
                backend: "linear".to_string(),
                location: path.display().to_string(),
                sha256,
            },
            features: artifact.features,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }

    /// In-memory model; the digest is left empty.
    pub fn new(features: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            info: ModelInfo {
                backend: "linear".to_string(),
                location: "<memory>".to_string(),
                sha256: String::new(),
            },
            features,
            coefficients,
            intercept,
        }
    }
}

impl RiskModel for LinearRiskModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn expected_features(&self) -> &[String] {
        &self.features
    }

    fn predict_proba(&self, input: &[f32]) -> Result<f64, ModelError> {
        if input.len() != self.coefficients.len() {
            return Err(ModelError::Input(format!(
                "input length {} != coefficient count {}",
                input.len(),
                self.coefficients.len()
            )));
        }
        let z: f64 = input
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| f64::from(*x) * w)
            .sum::<f64>()
            + self.intercept;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_logit_is_half() {
        let m = LinearRiskModel::new(vec!["a".into(), "b".into()], vec![1.0, -1.0], 0.0);
        let p = m.predict_proba(&[2.0, 2.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn wrong_input_length() {
        let m = LinearRiskModel::new(vec!["a".into()], vec![1.0], 0.0);
        assert!(matches!(m.predict_proba(&[1.0, 2.0]), Err(ModelError::Input(_))));
    }

    #[test]
    fn loads_artifact_and_records_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pain_predictor.json");
        std::fs::write(
            &path,
            r#"{"features": ["Age", "BMI"], "coefficients": [0.1, 0.2], "intercept": -1.0}"#,
        )
        .unwrap();
        let m = LinearRiskModel::load(&path).unwrap();
        assert_eq!(m.expected_features(), &["Age".to_string(), "BMI".to_string()]);
        assert_eq!(m.info().backend, "linear");
        assert_eq!(m.info().sha256.len(), 64);
    }

    #[test]
    fn mismatched_lengths_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"features": ["Age"], "coefficients": [], "intercept": 0}"#)
            .unwrap();
        assert!(matches!(
            LinearRiskModel::load(&path),
            Err(LoadError::Corrupt { .. })
        ));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"\x80\x04\x95pickle").unwrap();
        assert!(matches!(
            LinearRiskModel::load(&path),
            Err(LoadError::Corrupt { .. })
        ));
    }
}
