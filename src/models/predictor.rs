//! Predictor handles: the closed set of artifact kinds a model can be

use crate::error::{ArtifactError, PredictError};
use crate::feature_extractor::FeatureExtractor;
use crate::models::pipeline::Pipeline;
use crate::types::record::CustomerRecord;

#[cfg(feature = "onnx")]
use crate::models::onnx::OnnxModel;

/// Accepts a record, returns a numeric prediction or a typed error
pub trait Regressor {
    fn predict(
        &self,
        extractor: &FeatureExtractor,
        record: &CustomerRecord,
    ) -> Result<f64, PredictError>;
}

/// A loaded, read-only model artifact
#[derive(Debug)]
pub enum Predictor {
    Pipeline(Pipeline),
    #[cfg(feature = "onnx")]
    Onnx(OnnxModel),
}

impl Predictor {
    /// Short label of the artifact format, for logs
    pub fn format(&self) -> &'static str {
        match self {
            Predictor::Pipeline(_) => "pipeline",
            #[cfg(feature = "onnx")]
            Predictor::Onnx(_) => "onnx",
        }
    }
}

impl Regressor for Predictor {
    fn predict(
        &self,
        extractor: &FeatureExtractor,
        record: &CustomerRecord,
    ) -> Result<f64, PredictError> {
        match self {
            Predictor::Pipeline(pipeline) => pipeline.predict(extractor, record),
            #[cfg(feature = "onnx")]
            Predictor::Onnx(model) => model.predict(extractor, record),
        }
    }
}

/// Checks the pipeline's structure before wrapping it
impl TryFrom<Pipeline> for Predictor {
    type Error = ArtifactError;

    fn try_from(pipeline: Pipeline) -> Result<Self, Self::Error> {
        pipeline.validate().map_err(ArtifactError::Invalid)?;
        Ok(Predictor::Pipeline(pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pipeline_is_rejected() {
        let pipeline: Pipeline = serde_json::from_str(
            r#"{
                "preprocessor": {"numeric": [{"name": "age"}, {"name": "bmi"}]},
                "estimator": {"type": "linear", "intercept": 0.0, "coefficients": [1.0]}
            }"#,
        )
        .unwrap();

        let err = Predictor::try_from(pipeline).unwrap_err();
        assert!(err.to_string().contains("1 coefficients"));
    }
}
