//! Risk scoring: the model adapter plus the presentation helpers callers label scores with.

mod engine;

pub use engine::RiskEngine;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::features::FeatureVector;
use crate::model::ModelInfo;

/// Probability of severe pain for one feature vector.
#[derive(Debug, Clone, Serialize)]
pub struct RiskScore {
    pub request_id: String,
    /// In [0, 1]
    pub probability: f64,
    pub features: FeatureVector,
    pub model: ModelInfo,
    pub scored_at: DateTime<Utc>,
}

impl RiskScore {
    /// Two-decimal percentage, e.g. 0.73 → `73.00%`.
    pub fn percent(&self) -> String {
        format_percent(self.probability)
    }
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64, config: &RiskConfig) -> Self {
        if probability >= config.high_threshold {
            RiskLevel::High
        } else if probability >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(0.73), "73.00%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_percent(0.4567), "45.67%");
    }

    #[test]
    fn level_thresholds() {
        let c = RiskConfig::default();
        assert_eq!(RiskLevel::from_probability(0.2, &c), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4, &c), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.7, &c), RiskLevel::High);
        assert_eq!(RiskLevel::High.as_str(), "high");
    }
}
