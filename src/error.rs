//! Error taxonomy. Each component has its own enum; [`AppError`] joins them for the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Source reader failures. Terminal for the current request.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unsupported file format for '{filename}': expected .csv or .xlsx")]
    UnsupportedFormat { filename: String },

    #[error("could not read {source_name}: {cause}")]
    Io { source_name: String, cause: String },
}

impl ReadError {
    pub(crate) fn io(source_name: impl Into<String>, cause: impl ToString) -> Self {
        ReadError::Io {
            source_name: source_name.into(),
            cause: cause.to_string(),
        }
    }
}

/// Model artifact loading failures. Remembered by the lazy model slot.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("no trained model found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("model artifact {} is unreadable or corrupt: {cause}", .path.display())]
    Corrupt { path: PathBuf, cause: String },

    #[error("model artifact {} has an unsupported type: expected .onnx or .json", .path.display())]
    UnsupportedArtifact { path: PathBuf },
}

/// Failures raised by a loaded model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model input: {0}")]
    Input(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Risk model adapter failures. Terminal for the current request.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("risk model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("feature vector does not match the loaded model: model expects {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("prediction failed: {0}")]
    InferenceFailure(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for a single CLI request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("invalid record: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
