//! ONNX Runtime classifier. Input: [1, n] f32 encoded features.
//! Output: the `probabilities` tensor if present, else the last output; column 1
//! is the positive class when two columns come back.
//!
//! Training-time column names come from a `<model>.features.json` sidecar
//! (`{"features": [...]}`); without one the clinical encoding is assumed.
//!
//! Classifiers must be exported with a plain f32 `probabilities` tensor
//! (for skl2onnx, `options={"zipmap": False}`). A ZipMap output is a sequence
//! of maps and every prediction against it fails with `InferenceFailure`.

use ndarray::Array2;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use super::{read_artifact, ModelInfo, RiskModel};
use crate::error::{LoadError, ModelError};
use crate::schema::FeatureSchema;

#[derive(Debug, Deserialize)]
struct FeatureManifest {
    features: Vec<String>,
}

pub struct OnnxRiskModel {
    info: ModelInfo,
    features: Vec<String>,
    output_name: String,
    // `Session::run` takes `&mut self`
    session: Mutex<Session>,
}

impl OnnxRiskModel {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let (bytes, sha256) = read_artifact(path)?;
        let corrupt = |cause: String| LoadError::Corrupt {
            path: path.to_path_buf(),
            cause,
        };

        let session = Session::builder()
            .map_err(|e| corrupt(format!("session builder: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| corrupt(e.to_string()))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == "probabilities")
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| corrupt("model declares no outputs".to_string()))?;

        let features = Self::load_manifest(path)?;

        Ok(Self {
            info: ModelInfo {
                backend: "onnx".to_string(),
                location: path.display().to_string(),
                sha256,
            },
            features,
            output_name,
            session: Mutex::new(session),
        })
    }

    fn load_manifest(path: &Path) -> Result<Vec<String>, LoadError> {
        let manifest_path = path.with_extension("features.json");
        if !manifest_path.exists() {
            info!(
                manifest = %manifest_path.display(),
                "no feature manifest; assuming clinical encoding"
            );
            return Ok(FeatureSchema::clinical().encoded_names());
        }
        let corrupt = |cause: String| LoadError::Corrupt {
            path: manifest_path.clone(),
            cause,
        };
        let data = std::fs::read_to_string(&manifest_path).map_err(|e| corrupt(e.to_string()))?;
        let manifest: FeatureManifest =
            serde_json::from_str(&data).map_err(|e| corrupt(e.to_string()))?;
        Ok(manifest.features)
    }
}

impl RiskModel for OnnxRiskModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn expected_features(&self) -> &[String] {
        &self.features
    }

    fn predict_proba(&self, input: &[f32]) -> Result<f64, ModelError> {
        let arr = Array2::from_shape_vec((1, input.len()), input.to_vec())
            .map_err(|e| ModelError::Input(e.to_string()))?;
        let tensor = Value::from_array(arr).map_err(|e| ModelError::Input(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Backend("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ModelError::Backend(e.to_string()))?;
        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ModelError::Output(format!("missing output '{}'", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Output(e.to_string()))?;
        positive_class(data)
    }
}

/// Column 1 of a `[1, 2]` class-probability row, or the single value of a `[1, 1]` output.
fn positive_class(data: &[f32]) -> Result<f64, ModelError> {
    match data {
        [_, positive] => Ok(f64::from(*positive)),
        [single] => Ok(f64::from(*single)),
        [] => Err(ModelError::Output("empty output tensor".to_string())),
        more => Err(ModelError::Output(format!(
            "expected 1 or 2 probability columns, got {}",
            more.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_class_from_two_columns() {
        let p = positive_class(&[0.25, 0.75]).unwrap();
        assert!((p - 0.75).abs() < 1e-6);
    }

    #[test]
    fn positive_class_from_single_column() {
        let p = positive_class(&[0.4]).unwrap();
        assert!((p - 0.4).abs() < 1e-6);
    }

    #[test]
    fn positive_class_rejects_empty_and_wide_outputs() {
        assert!(matches!(positive_class(&[]), Err(ModelError::Output(_))));
        assert!(matches!(
            positive_class(&[0.1, 0.2, 0.7]),
            Err(ModelError::Output(_))
        ));
    }

    #[test]
    fn corrupt_artifact_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pain_predictor.onnx");
        std::fs::write(&path, b"not a protobuf graph").unwrap();
        assert!(matches!(
            OnnxRiskModel::load(&path),
            Err(LoadError::Corrupt { .. })
        ));
    }
}
