//! Risk model adapter: schema-conformant feature vector → raw positive-class probability.
//! Makes no labelling decision.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::RiskScore;
use crate::error::PredictionError;
use crate::features::{EncodedFeatures, FeatureVector};
use crate::model::{FileModelProvider, LazyModel, ModelProvider, ModelState};
use crate::schema::FeatureSchema;

pub struct RiskEngine {
    model: LazyModel,
    schema: &'static FeatureSchema,
}

impl RiskEngine {
    /// The provider is consulted on first prediction, once.
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self::with_schema(provider, FeatureSchema::clinical())
    }

    pub fn with_schema(provider: Arc<dyn ModelProvider>, schema: &'static FeatureSchema) -> Self {
        Self {
            model: LazyModel::new(provider),
            schema,
        }
    }

    /// Engine backed by an artifact on disk.
    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileModelProvider::new(path)))
    }

    pub fn model_state(&self) -> ModelState {
        self.model.state()
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<RiskScore, PredictionError> {
        let model = self
            .model
            .get()
            .map_err(|e| PredictionError::ModelUnavailable {
                reason: e.to_string(),
            })?;

        let vector_fields = vector.names();
        if vector_fields != self.schema.names() {
            return Err(PredictionError::SchemaMismatch {
                expected: self.schema.names().iter().map(|s| s.to_string()).collect(),
                actual: vector_fields.iter().map(|s| s.to_string()).collect(),
            });
        }

        let encoded = EncodedFeatures::encode(vector, self.schema)
            .map_err(PredictionError::InferenceFailure)?;
        if encoded.names.as_slice() != model.expected_features() {
            return Err(PredictionError::SchemaMismatch {
                expected: model.expected_features().to_vec(),
                actual: encoded.names,
            });
        }

        let probability = model
            .predict_proba(&encoded.values)
            .map_err(|e| PredictionError::InferenceFailure(e.to_string()))?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InferenceFailure(format!(
                "model returned {} which is not a probability",
                probability
            )));
        }

        let score = RiskScore {
            request_id: Uuid::new_v4().to_string(),
            probability,
            features: vector.clone(),
            model: model.info().clone(),
            scored_at: Utc::now(),
        };
        info!(
            request_id = %score.request_id,
            probability = score.probability,
            model_sha256 = %score.model.sha256,
            "risk scored"
        );
        Ok(score)
    }
}
