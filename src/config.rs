//! Application configuration. Every section has defaults so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::{FeatureSchema, FieldDomain};

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "POSTOP_PAIN_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pre-trained classifier artifact (`.onnx` or `.json`)
    pub model_path: PathBuf,
    /// Source reader behaviour
    pub source: SourceConfig,
    /// Cohort analytics
    pub analytics: AnalyticsConfig,
    /// Presentation thresholds for risk labels
    pub risk: RiskConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Substring a remote link must contain to be treated as a CSV export
    pub csv_export_marker: String,
    /// Whole-request timeout for link fetches (seconds)
    pub timeout_secs: u64,
    /// Connect timeout for link fetches (seconds)
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Dataset summarised when no explicit source is given
    pub dataset_path: PathBuf,
    /// Numeric outcome column
    pub outcome_field: String,
    /// Histogram bin count
    pub histogram_bins: usize,
    /// Categorical fields the quartile groups are keyed on
    pub group_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Probability at or above this is labelled high (0.0–1.0)
    pub high_threshold: f64,
    /// Probability at or above this is labelled medium
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/pain_predictor.onnx"),
            source: SourceConfig::default(),
            analytics: AnalyticsConfig::default(),
            risk: RiskConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_export_marker: "export?format=csv".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("demo_pain_data.csv"),
            outcome_field: "Pain_Score".to_string(),
            histogram_bins: 10,
            group_by: vec!["Surgery_Duration".to_string(), "Anaesthesia".to_string()],
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. A missing file yields the defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Resolve the config path from `POSTOP_PAIN_CONFIG`, falling back to `config.json`.
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.analytics.histogram_bins == 0 {
            return Err(ConfigError::Invalid(
                "analytics.histogram_bins must be at least 1".to_string(),
            ));
        }
        let clinical = FeatureSchema::clinical();
        for field in &self.analytics.group_by {
            match clinical.field(field).map(|f| &f.domain) {
                Some(FieldDomain::Categorical { .. }) => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "analytics.group_by: '{}' is not a categorical clinical field",
                        field
                    )))
                }
            }
        }
        let outcome = self.analytics.outcome_field.trim();
        if outcome.is_empty() || clinical.field(outcome).is_some() {
            return Err(ConfigError::Invalid(format!(
                "analytics.outcome_field '{}' must name a column outside the clinical fields",
                self.analytics.outcome_field
            )));
        }
        if self.source.csv_export_marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "source.csv_export_marker must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk.medium_threshold)
            || !(0.0..=1.0).contains(&self.risk.high_threshold)
            || self.risk.medium_threshold > self.risk.high_threshold
        {
            return Err(ConfigError::Invalid(format!(
                "risk thresholds must satisfy 0 <= medium ({}) <= high ({}) <= 1",
                self.risk.medium_threshold, self.risk.high_threshold
            )));
        }
        Ok(())
    }
}
