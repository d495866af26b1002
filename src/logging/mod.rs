//! Structured logging.

mod format;

pub use format::{PredictionAudit, StructuredLogger};
