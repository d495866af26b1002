//! Post-caesarean pain risk: clinical record ingestion, validation, inference and cohort analytics.
//!
//! Modular structure:
//! - [`schema`] - Fixed feature schema (Age, BMI, Surgery_Duration, Anaesthesia)
//! - [`source`] - CSV/XLSX uploads and CSV-export links into raw tables
//! - [`validate`] - Per-row and batch validation into feature vectors
//! - [`features`] - Feature vectors and model-input encoding
//! - [`model`] - ONNX and linear classifiers, load-once model slot
//! - [`risk`] - Risk model adapter and score presentation
//! - [`analytics`] - Pain score histogram and grouped quartiles
//! - [`logging`] - Structured logging and prediction audit lines

pub mod analytics;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod schema;
pub mod source;
pub mod validate;

pub use analytics::{summarize, AggregateStats, OutcomeRecord};
pub use config::AppConfig;
pub use error::{AppError, LoadError, ModelError, PredictionError, ReadError};
pub use features::{FeatureValue, FeatureVector};
pub use logging::StructuredLogger;
pub use model::{FileModelProvider, LazyModel, ModelProvider, RiskModel};
pub use risk::{RiskEngine, RiskLevel, RiskScore};
pub use schema::FeatureSchema;
pub use source::{RawTable, ReadOutcome, Source, SourceReader};
pub use validate::{validate_row, validate_table, BatchValidation, ClinicalRecord, Violation};
