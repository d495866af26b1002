//! Typed, schema-ordered feature vectors and their model-input encoding.

mod encode;

pub use encode::EncodedFeatures;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::source::{RawRow, RawValue};

/// A validated field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s),
            FeatureValue::Numeric(_) => None,
        }
    }

    fn to_raw(&self) -> RawValue {
        match self {
            FeatureValue::Numeric(v) => RawValue::Number(*v),
            FeatureValue::Category(s) => RawValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{}", v),
            FeatureValue::Category(s) => f.write_str(s),
        }
    }
}

/// One schema-conformant record. Only the validator constructs these, and
/// nothing mutates one afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    fields: Vec<(String, FeatureValue)>,
}

impl FeatureVector {
    pub(crate) fn from_fields(fields: Vec<(String, FeatureValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FeatureValue::as_f64)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FeatureValue::as_str)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical raw form; validating it again yields an equal vector.
    pub fn to_raw_row(&self) -> RawRow {
        RawRow::new(
            self.fields
                .iter()
                .map(|(n, v)| (n.clone(), v.to_raw()))
                .collect(),
        )
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
