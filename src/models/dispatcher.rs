//! Prediction dispatch over the model registry

use crate::error::PredictError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::kind::{ModelKind, Selection};
use crate::models::predictor::{Predictor, Regressor};
use crate::models::registry::ModelRegistry;
use crate::types::prediction::{ModelPrediction, PredictionResult};
use crate::types::record::CustomerRecord;
use std::time::Instant;
use tracing::{debug, warn};

/// Routes a record to one or all registered models.
///
/// Holds no state across calls: the result is a function of the registry,
/// the record and the selection only.
pub struct PredictionDispatcher<'a> {
    registry: &'a ModelRegistry,
    extractor: FeatureExtractor,
}

impl<'a> PredictionDispatcher<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Run the selected model(s) on the record.
    ///
    /// Every selected model yields exactly one entry, success or failure.
    pub fn predict(&self, record: &CustomerRecord, selection: Selection) -> PredictionResult {
        match selection {
            Selection::Model(kind) => self.predict_single(record, kind),
            Selection::All => self.predict_all(record),
        }
    }

    fn predict_single(&self, record: &CustomerRecord, kind: ModelKind) -> PredictionResult {
        let entry = match self.registry.get(kind) {
            Some(predictor) => self.run_single_model(kind, predictor, record),
            None => {
                warn!(model = %kind, "Selected model is not registered");
                ModelPrediction::failure(
                    kind,
                    PredictError::Runtime(format!("model '{}' is not registered", kind)),
                )
            }
        };
        PredictionResult::new(vec![entry])
    }

    /// Sequential, in registration order; failures stay local to their model
    fn predict_all(&self, record: &CustomerRecord) -> PredictionResult {
        let entries: Vec<ModelPrediction> = self
            .registry
            .get_models()
            .map(|(kind, predictor)| self.run_single_model(kind, predictor, record))
            .collect();

        let result = PredictionResult::new(entries);
        debug!(
            models = result.len(),
            failed = result.failure_count(),
            "All-models prediction complete"
        );
        result
    }

    fn run_single_model(
        &self,
        kind: ModelKind,
        predictor: &Predictor,
        record: &CustomerRecord,
    ) -> ModelPrediction {
        let start = Instant::now();
        match predictor.predict(&self.extractor, record) {
            Ok(raw) => {
                debug!(
                    model = %kind,
                    prediction = raw,
                    latency_us = start.elapsed().as_micros() as u64,
                    "Model inference complete"
                );
                ModelPrediction::success(kind, raw)
            }
            Err(e) => {
                warn!(model = %kind, error = %e, "Model inference failed");
                ModelPrediction::failure(kind, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pipeline::Pipeline;
    use crate::types::record::{Region, Sex, Smoker};

    fn linear(intercept: f64, age_coef: f64) -> Predictor {
        let json = format!(
            r#"{{
                "preprocessor": {{"numeric": [{{"name": "age"}}]}},
                "estimator": {{"type": "linear", "intercept": {}, "coefficients": [{}]}}
            }}"#,
            intercept, age_coef
        );
        Predictor::try_from(Pipeline::from_json(json.as_bytes()).unwrap()).unwrap()
    }

    fn broken() -> Predictor {
        let json = r#"{
            "preprocessor": {"categorical": [{"name": "region", "categories": ["northeast"]}]},
            "estimator": {"type": "linear", "intercept": 0.0, "coefficients": [1.0]}
        }"#;
        Predictor::try_from(Pipeline::from_json(json.as_bytes()).unwrap()).unwrap()
    }

    // Skips load-time validation, the way a hand-assembled registry could.
    fn unchecked_tree() -> Predictor {
        let json = r#"{
            "preprocessor": {"numeric": [{"name": "age"}]},
            "estimator": {"type": "tree_ensemble", "aggregation": "mean", "trees": [
                {"nodes": [
                    {"feature": 5, "threshold": 1.0, "left": 1, "right": 2},
                    {"value": 1.0},
                    {"value": 2.0}
                ]}
            ]}
        }"#;
        Predictor::Pipeline(serde_json::from_str(json).unwrap())
    }

    fn record() -> CustomerRecord {
        CustomerRecord::new(30, Sex::Male, 25.0, 0, Smoker::No, Region::Southeast).unwrap()
    }

    #[test]
    fn test_single_model_success() {
        let registry = ModelRegistry::from_models(vec![
            (ModelKind::Linear, linear(1000.0, 100.123_45)),
            (ModelKind::Ridge, broken()),
        ]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let result = dispatcher.predict(&record(), Selection::Model(ModelKind::Linear));
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries()[0].value(), Some(4003.7));
    }

    #[test]
    fn test_single_model_failure_is_tagged() {
        let registry = ModelRegistry::from_models(vec![(ModelKind::Ridge, broken())]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let result = dispatcher.predict(&record(), Selection::Model(ModelKind::Ridge));
        assert_eq!(result.len(), 1);
        let entry = &result.entries()[0];
        assert_eq!(entry.model, ModelKind::Ridge);
        assert!(matches!(entry.error(), Some(PredictError::UnknownCategory { .. })));
    }

    #[test]
    fn test_unregistered_selection_yields_one_error() {
        let registry = ModelRegistry::from_models(vec![(ModelKind::Linear, linear(0.0, 1.0))]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let result = dispatcher.predict(&record(), Selection::Model(ModelKind::Svr));
        assert_eq!(result.len(), 1);
        assert!(result.entries()[0].error().is_some());
    }

    #[test]
    fn test_all_models_partial_failure() {
        let registry = ModelRegistry::from_models(vec![
            (ModelKind::Linear, linear(0.0, 1.0)),
            (ModelKind::Ridge, broken()),
            (ModelKind::Lasso, linear(5.0, 2.0)),
        ]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let result = dispatcher.predict(&record(), Selection::All);
        let models: Vec<ModelKind> = result.entries().iter().map(|e| e.model).collect();
        assert_eq!(models, vec![ModelKind::Linear, ModelKind::Ridge, ModelKind::Lasso]);
        assert_eq!(result.get(ModelKind::Linear).unwrap().value(), Some(30.0));
        assert!(result.get(ModelKind::Ridge).unwrap().error().is_some());
        assert_eq!(result.get(ModelKind::Lasso).unwrap().value(), Some(65.0));
    }

    #[test]
    fn test_all_models_survives_malformed_tree() {
        let registry = ModelRegistry::from_models(vec![
            (ModelKind::Linear, linear(0.0, 1.0)),
            (ModelKind::RandomForest, unchecked_tree()),
            (ModelKind::Svr, linear(1.0, 0.0)),
        ]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let result = dispatcher.predict(&record(), Selection::All);
        assert_eq!(result.len(), 3);
        assert_eq!(result.get(ModelKind::Linear).unwrap().value(), Some(30.0));
        assert_eq!(
            result.get(ModelKind::RandomForest).unwrap().error(),
            Some(&PredictError::ShapeMismatch { expected: 6, got: 1 })
        );
        assert_eq!(result.get(ModelKind::Svr).unwrap().value(), Some(1.0));
    }

    #[test]
    fn test_predict_is_idempotent() {
        let registry = ModelRegistry::from_models(vec![
            (ModelKind::Linear, linear(12.5, 3.3)),
            (ModelKind::Svr, broken()),
        ]);
        let dispatcher = PredictionDispatcher::new(&registry);

        let first = dispatcher.predict(&record(), Selection::All);
        let second = dispatcher.predict(&record(), Selection::All);
        assert_eq!(first, second);
    }
}
