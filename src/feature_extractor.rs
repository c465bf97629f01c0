//! Feature extraction for insurance charges model inference.
//!
//! Exposes a customer record two ways: as named columns (looked up by name
//! by the native pipeline artifacts, so column order never matters) and as a
//! dense ordinal-coded vector for ONNX models.

use crate::types::record::CustomerRecord;

/// A single named cell of the input frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Numeric(f64),
    Categorical(&'static str),
}

/// Feature extractor that exposes a customer record as model input.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Column names in training order.
    pub const COLUMNS: [&'static str; 6] = ["age", "sex", "bmi", "children", "smoker", "region"];

    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Look up one column of the record by name.
    pub fn column(&self, record: &CustomerRecord, name: &str) -> Option<ColumnValue> {
        match name {
            "age" => Some(ColumnValue::Numeric(record.age() as f64)),
            "sex" => Some(ColumnValue::Categorical(record.sex().as_str())),
            "bmi" => Some(ColumnValue::Numeric(record.bmi())),
            "children" => Some(ColumnValue::Numeric(record.children() as f64)),
            "smoker" => Some(ColumnValue::Categorical(record.smoker().as_str())),
            "region" => Some(ColumnValue::Categorical(record.region().as_str())),
            _ => None,
        }
    }

    /// Extract the dense feature vector.
    ///
    /// Order matches [`Self::COLUMNS`]; categoricals use their ordinal codes.
    pub fn extract(&self, record: &CustomerRecord) -> Vec<f32> {
        vec![
            record.age() as f32,
            record.sex().code(),
            record.bmi() as f32,
            record.children() as f32,
            record.smoker().code(),
            record.region().code(),
        ]
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        Self::COLUMNS.len()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{Region, Sex, Smoker};

    fn record() -> CustomerRecord {
        CustomerRecord::new(42, Sex::Female, 31.5, 2, Smoker::Yes, Region::Northwest).unwrap()
    }

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&record());

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features, vec![42.0, 0.0, 31.5, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_column_lookup_by_name() {
        let extractor = FeatureExtractor::new();
        let record = record();

        assert_eq!(extractor.column(&record, "bmi"), Some(ColumnValue::Numeric(31.5)));
        assert_eq!(
            extractor.column(&record, "region"),
            Some(ColumnValue::Categorical("northwest"))
        );
        assert_eq!(extractor.column(&record, "income"), None);
    }
}
