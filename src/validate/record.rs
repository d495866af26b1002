//! Manually entered record: the prediction form's fields, bypassing the source reader.

use serde::{Deserialize, Serialize};

use super::{validate_row, Violation};
use crate::features::FeatureVector;
use crate::schema::{FeatureSchema, AGE, ANAESTHESIA, BMI, SURGERY_DURATION};
use crate::source::{RawRow, RawValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub age: f64,
    pub bmi: f64,
    pub surgery_duration: String,
    pub anaesthesia: String,
}

impl Default for ClinicalRecord {
    /// The entry form's initial values.
    fn default() -> Self {
        Self {
            age: 30.0,
            bmi: 28.0,
            surgery_duration: "<30min".to_string(),
            anaesthesia: "Spinal".to_string(),
        }
    }
}

impl ClinicalRecord {
    pub fn to_raw_row(&self) -> RawRow {
        RawRow::new(vec![
            (AGE.to_string(), RawValue::Number(self.age)),
            (BMI.to_string(), RawValue::Number(self.bmi)),
            (SURGERY_DURATION.to_string(), RawValue::Text(self.surgery_duration.clone())),
            (ANAESTHESIA.to_string(), RawValue::Text(self.anaesthesia.clone())),
        ])
    }

    /// Validate against the clinical schema.
    pub fn validate(&self) -> Result<FeatureVector, Vec<Violation>> {
        validate_row(&self.to_raw_row(), FeatureSchema::clinical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ViolationKind;

    #[test]
    fn default_record_is_valid() {
        let v = ClinicalRecord::default().validate().unwrap();
        assert_eq!(v.numeric(AGE), Some(30.0));
        assert_eq!(v.numeric(BMI), Some(28.0));
        assert_eq!(v.category(SURGERY_DURATION), Some("<30min"));
    }

    #[test]
    fn out_of_range_manual_entry() {
        let r = ClinicalRecord {
            age: 60.0,
            ..ClinicalRecord::default()
        };
        let errs = r.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, AGE);
        assert!(matches!(errs[0].kind, ViolationKind::OutOfRange { .. }));
    }
}
