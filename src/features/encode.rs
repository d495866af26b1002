//! Feature vector → model input: numeric fields as-is, categorical fields one-hot.

use super::{FeatureValue, FeatureVector};
use crate::schema::{FeatureSchema, FieldDomain};

/// Flat f32 model input with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    pub names: Vec<String>,
    pub values: Vec<f32>,
}

impl EncodedFeatures {
    /// Encode `vector` in the column layout of `schema`. A category outside the
    /// enum encodes as all zeros, as an ignoring one-hot encoder would.
    pub fn encode(vector: &FeatureVector, schema: &FeatureSchema) -> Result<Self, String> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        for field in schema.fields() {
            let value = vector
                .get(&field.name)
                .ok_or_else(|| format!("feature vector has no '{}' field", field.name))?;
            match (&field.domain, value) {
                (FieldDomain::Numeric { .. }, FeatureValue::Numeric(v)) => {
                    names.push(field.name.clone());
                    values.push(*v as f32);
                }
                (FieldDomain::Categorical { allowed }, FeatureValue::Category(c)) => {
                    for option in allowed {
                        names.push(format!("{}={}", field.name, option));
                        values.push(if option == c { 1.0 } else { 0.0 });
                    }
                }
                _ => {
                    return Err(format!(
                        "field '{}' holds {} which does not fit its declared type",
                        field.name, value
                    ))
                }
            }
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(duration: &str, anaesthesia: &str) -> FeatureVector {
        FeatureVector::from_fields(vec![
            ("Age".into(), FeatureValue::Numeric(30.0)),
            ("BMI".into(), FeatureValue::Numeric(28.5)),
            ("Surgery_Duration".into(), FeatureValue::Category(duration.into())),
            ("Anaesthesia".into(), FeatureValue::Category(anaesthesia.into())),
        ])
    }

    #[test]
    fn one_hot_layout() {
        let enc = EncodedFeatures::encode(&vector("30-60min", "General"), FeatureSchema::clinical())
            .unwrap();
        assert_eq!(enc.names, FeatureSchema::clinical().encoded_names());
        assert_eq!(enc.values, vec![30.0, 28.5, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_category_is_all_zero() {
        let enc = EncodedFeatures::encode(&vector("2h", "Spinal"), FeatureSchema::clinical())
            .unwrap();
        assert_eq!(&enc.values[2..5], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_field_is_an_error() {
        let v = FeatureVector::from_fields(vec![("Age".into(), FeatureValue::Numeric(30.0))]);
        assert!(EncodedFeatures::encode(&v, FeatureSchema::clinical()).is_err());
    }
}
