//! Record validator: raw rows → typed [`FeatureVector`]s, or the full list of
//! per-field violations. Batches never stop at the first bad row.

mod record;

pub use record::ClinicalRecord;

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::features::{FeatureValue, FeatureVector};
use crate::schema::{FeatureSchema, FieldDomain};
use crate::source::{RawRow, RawTable, RawValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    MissingField,
    OutOfRange { value: f64, min: f64, max: f64 },
    InvalidCategory { value: String, allowed: Vec<String> },
    TypeMismatch { value: String, expected: String },
}

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: &str, kind: ViolationKind) -> Self {
        Self {
            field: field.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::MissingField => write!(f, "missing {}", self.field),
            ViolationKind::OutOfRange { value, min, max } => {
                write!(f, "{} {} out of range [{}, {}]", self.field, value, min, max)
            }
            ViolationKind::InvalidCategory { value, allowed } => write!(
                f,
                "{} \"{}\" is not one of {}",
                self.field,
                value,
                allowed.join(", ")
            ),
            ViolationKind::TypeMismatch { value, expected } => {
                write!(f, "{} {} is not a valid {}", self.field, value, expected)
            }
        }
    }
}

/// Validate one row against `schema`. Columns the schema does not name are ignored.
pub fn validate_row(row: &RawRow, schema: &FeatureSchema) -> Result<FeatureVector, Vec<Violation>> {
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut violations = Vec::new();

    for spec in schema.fields() {
        let raw = row.get(&spec.name).filter(|v| !v.is_missing());
        let Some(raw) = raw else {
            if spec.required {
                violations.push(Violation::new(&spec.name, ViolationKind::MissingField));
            } else if let Some(default) = &spec.default {
                fields.push((spec.name.clone(), default.clone()));
            }
            continue;
        };
        match coerce(raw, &spec.domain) {
            Ok(value) => fields.push((spec.name.clone(), value)),
            Err(kind) => violations.push(Violation::new(&spec.name, kind)),
        }
    }

    if violations.is_empty() {
        Ok(FeatureVector::from_fields(fields))
    } else {
        Err(violations)
    }
}

fn coerce(raw: &RawValue, domain: &FieldDomain) -> Result<FeatureValue, ViolationKind> {
    match domain {
        FieldDomain::Numeric { min, max, integer } => {
            let expected = if *integer { "whole number" } else { "number" };
            let mismatch = || ViolationKind::TypeMismatch {
                value: raw.to_string(),
                expected: expected.to_string(),
            };
            let value = match raw {
                RawValue::Number(v) => *v,
                RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| mismatch())?,
                RawValue::Missing => return Err(ViolationKind::MissingField),
            };
            if !value.is_finite() || (*integer && value.fract() != 0.0) {
                return Err(mismatch());
            }
            if value < *min || value > *max {
                return Err(ViolationKind::OutOfRange {
                    value,
                    min: *min,
                    max: *max,
                });
            }
            Ok(FeatureValue::Numeric(value))
        }
        FieldDomain::Categorical { allowed } => {
            let text = match raw {
                RawValue::Text(s) => s.clone(),
                RawValue::Number(v) => v.to_string(),
                RawValue::Missing => return Err(ViolationKind::MissingField),
            };
            if allowed.iter().any(|a| *a == text) {
                Ok(FeatureValue::Category(text))
            } else {
                Err(ViolationKind::InvalidCategory {
                    value: text,
                    allowed: allowed.clone(),
                })
            }
        }
    }
}

/// A row that failed validation, with its 1-based data row number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub record: RawRow,
    pub violations: Vec<Violation>,
}

impl fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "row {} {}", self.row, reasons.join(", "))
    }
}

/// Partitioned batch result: every accepted vector and every rejected row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchValidation {
    pub accepted: Vec<FeatureVector>,
    pub rejected: Vec<RejectedRow>,
}

impl BatchValidation {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// e.g. `12 of 15 rows accepted, 3 rejected: row 4 missing BMI; …`
    pub fn summary(&self) -> String {
        let mut s = format!("{} of {} rows accepted", self.accepted.len(), self.total());
        if !self.rejected.is_empty() {
            let rows: Vec<String> = self.rejected.iter().map(ToString::to_string).collect();
            s.push_str(&format!(", {} rejected: {}", self.rejected.len(), rows.join("; ")));
        }
        s
    }
}

pub fn validate_table(table: &RawTable, schema: &FeatureSchema) -> BatchValidation {
    let mut batch = BatchValidation::default();
    for (i, row) in table.rows().iter().enumerate() {
        match validate_row(row, schema) {
            Ok(v) => batch.accepted.push(v),
            Err(violations) => {
                debug!(row = i + 1, violations = violations.len(), "row rejected");
                batch.rejected.push(RejectedRow {
                    row: i + 1,
                    record: row.clone(),
                    violations,
                });
            }
        }
    }
    if !batch.rejected.is_empty() {
        warn!(
            accepted = batch.accepted.len(),
            rejected = batch.rejected.len(),
            "batch validation rejected rows"
        );
    }
    batch
}
