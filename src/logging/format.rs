//! Log setup plus one-line JSON audit records for scored predictions.

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::features::FeatureVector;
use crate::risk::{RiskLevel, RiskScore};

/// Audit line for one prediction. Nothing here is persisted by the crate.
#[derive(Serialize)]
pub struct PredictionAudit<'a> {
    pub ts: String,
    pub request_id: &'a str,
    pub probability: f64,
    pub percent: String,
    pub level: &'a str,
    pub model_backend: &'a str,
    pub model_sha256: &'a str,
    pub features: &'a FeatureVector,
}

impl<'a> PredictionAudit<'a> {
    pub fn new(score: &'a RiskScore, level: RiskLevel) -> Self {
        Self {
            ts: score.scored_at.to_rfc3339(),
            request_id: &score.request_id,
            probability: score.probability,
            percent: score.percent(),
            level: level.as_str(),
            model_backend: &score.model.backend,
            model_sha256: &score.model.sha256,
            features: &score.features,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr; level from RUST_LOG or `default_level`.
    /// Safe to call more than once: later calls are ignored.
    pub fn init(json: bool, default_level: &str) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let result = if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if result.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }

    /// Write one JSON object and a newline.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
