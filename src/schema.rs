//! Feature schema: the fixed set of fields a clinical record must carry and their domains.
//! Built once per process and shared read-only.

use serde::Serialize;
use std::sync::OnceLock;

use crate::features::FeatureValue;

pub const AGE: &str = "Age";
pub const BMI: &str = "BMI";
pub const SURGERY_DURATION: &str = "Surgery_Duration";
pub const ANAESTHESIA: &str = "Anaesthesia";
pub const PAIN_SCORE: &str = "Pain_Score";

pub const SURGERY_DURATIONS: [&str; 3] = ["<30min", "30-60min", ">60min"];
pub const ANAESTHESIA_TYPES: [&str; 2] = ["Spinal", "General"];

static CLINICAL: OnceLock<FeatureSchema> = OnceLock::new();
static ANALYTICS: OnceLock<FeatureSchema> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldDomain {
    /// Inclusive numeric range; `integer` fields reject fractional values
    Numeric { min: f64, max: f64, integer: bool },
    /// Exact, case-sensitive set of allowed values
    Categorical { allowed: Vec<String> },
}

impl FieldDomain {
    pub fn numeric(min: f64, max: f64) -> Self {
        FieldDomain::Numeric {
            min,
            max,
            integer: false,
        }
    }

    pub fn integer(min: f64, max: f64) -> Self {
        FieldDomain::Numeric {
            min,
            max,
            integer: true,
        }
    }

    pub fn categorical(allowed: &[&str]) -> Self {
        FieldDomain::Categorical {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub domain: FieldDomain,
    pub required: bool,
    /// Used when an optional field is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<FeatureValue>,
}

impl FieldSpec {
    pub fn required(name: &str, domain: FieldDomain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, domain: FieldDomain, default: FeatureValue) -> Self {
        Self {
            name: name.to_string(),
            domain,
            required: false,
            default: Some(default),
        }
    }
}

/// Ordered set of fields. Field order is the order of every [`crate::FeatureVector`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    fields: Vec<FieldSpec>,
}

impl FeatureSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Prediction inputs: Age, BMI, Surgery_Duration, Anaesthesia.
    pub fn clinical() -> &'static FeatureSchema {
        CLINICAL.get_or_init(|| {
            FeatureSchema::new(vec![
                FieldSpec::required(AGE, FieldDomain::integer(15.0, 50.0)),
                FieldSpec::required(BMI, FieldDomain::numeric(15.0, 45.0)),
                FieldSpec::required(SURGERY_DURATION, FieldDomain::categorical(&SURGERY_DURATIONS)),
                FieldSpec::required(ANAESTHESIA, FieldDomain::categorical(&ANAESTHESIA_TYPES)),
            ])
        })
    }

    /// Clinical fields plus the Pain_Score outcome (0–10 numeric rating scale).
    pub fn analytics() -> &'static FeatureSchema {
        ANALYTICS.get_or_init(|| {
            FeatureSchema::clinical()
                .with_field(FieldSpec::required(PAIN_SCORE, FieldDomain::numeric(0.0, 10.0)))
        })
    }

    pub fn with_field(&self, field: FieldSpec) -> FeatureSchema {
        let mut fields = self.fields.clone();
        fields.push(field);
        FeatureSchema { fields }
    }

    /// Same fields with `name` removed; used to split an outcome column off a record.
    pub fn without(&self, name: &str) -> FeatureSchema {
        FeatureSchema {
            fields: self.fields.iter().filter(|f| f.name != name).cloned().collect(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Column names of the model input: numeric fields as-is, categorical
    /// fields one-hot as `Field=Value` in enum order.
    pub fn encoded_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        for f in &self.fields {
            match &f.domain {
                FieldDomain::Numeric { .. } => out.push(f.name.clone()),
                FieldDomain::Categorical { allowed } => {
                    out.extend(allowed.iter().map(|v| format!("{}={}", f.name, v)))
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinical_schema_is_shared() {
        let a = FeatureSchema::clinical() as *const _;
        let b = FeatureSchema::clinical() as *const _;
        assert_eq!(a, b);
        assert_eq!(
            FeatureSchema::clinical().names(),
            vec![AGE, BMI, SURGERY_DURATION, ANAESTHESIA]
        );
    }

    #[test]
    fn analytics_schema_adds_outcome() {
        let s = FeatureSchema::analytics();
        assert_eq!(s.fields().len(), 5);
        assert!(s.field(PAIN_SCORE).unwrap().required);
        assert_eq!(s.without(PAIN_SCORE), *FeatureSchema::clinical());
    }

    #[test]
    fn encoded_names_one_hot_in_enum_order() {
        assert_eq!(
            FeatureSchema::clinical().encoded_names(),
            vec![
                "Age",
                "BMI",
                "Surgery_Duration=<30min",
                "Surgery_Duration=30-60min",
                "Surgery_Duration=>60min",
                "Anaesthesia=Spinal",
                "Anaesthesia=General",
            ]
        );
    }
}
