//! Per-request prediction results

use crate::error::PredictError;
use crate::models::kind::ModelKind;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Round half away from zero to two decimal places
pub fn round_charges(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of one model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub model: ModelKind,
    pub outcome: Result<f64, PredictError>,
}

impl ModelPrediction {
    pub fn success(model: ModelKind, raw: f64) -> Self {
        Self {
            model,
            outcome: Ok(round_charges(raw)),
        }
    }

    pub fn failure(model: ModelKind, error: PredictError) -> Self {
        Self {
            model,
            outcome: Err(error),
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&PredictError> {
        self.outcome.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Serialize for ModelPrediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelPrediction", 2)?;
        state.serialize_field("model", self.model.display_name())?;
        match &self.outcome {
            Ok(value) => state.serialize_field("prediction", value)?,
            Err(e) => state.serialize_field("error", &e.to_string())?,
        }
        state.end()
    }
}

/// Result set for one request, in registration order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PredictionResult {
    entries: Vec<ModelPrediction>,
}

impl PredictionResult {
    pub fn new(entries: Vec<ModelPrediction>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ModelPrediction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, model: ModelKind) -> Option<&ModelPrediction> {
        self.entries.iter().find(|e| e.model == model)
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_charges() {
        assert_eq!(round_charges(12345.6789), 12345.68);
        assert_eq!(round_charges(0.004), 0.0);
        assert_eq!(round_charges(-1.005_1), -1.01);
    }

    #[test]
    fn test_prediction_serialization() {
        let result = PredictionResult::new(vec![
            ModelPrediction::success(ModelKind::Linear, 1000.456),
            ModelPrediction::failure(ModelKind::Svr, PredictError::NonFinite(f64::INFINITY)),
        ]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json[0]["model"], "Linear Regression");
        assert_eq!(json[0]["prediction"], 1000.46);
        assert_eq!(json[1]["model"], "SVR");
        assert!(json[1]["error"].as_str().unwrap().contains("non-finite"));
        assert!(json[1].get("prediction").is_none());
    }

    #[test]
    fn test_counts() {
        let result = PredictionResult::new(vec![
            ModelPrediction::success(ModelKind::Linear, 1.0),
            ModelPrediction::failure(ModelKind::Ridge, PredictError::MissingColumn("age".into())),
        ]);
        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.get(ModelKind::Ridge).unwrap().value(), None);
    }
}
