//! ONNX regression models run through ONNX Runtime

use crate::error::{LoadError, PredictError};
use crate::feature_extractor::FeatureExtractor;
use crate::types::record::CustomerRecord;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info};

static ORT_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the ONNX Runtime environment once per process.
///
/// A failed initialization is remembered and reported for every artifact.
fn init_runtime(path: &Path) -> Result<(), LoadError> {
    ORT_INIT
        .get_or_init(|| {
            ort::init()
                .with_name("insurance-predictor")
                .commit()
                .map(|_| info!("ONNX Runtime initialized"))
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(|message| LoadError::Onnx {
            path: path.to_path_buf(),
            message,
        })
}

fn onnx_error(path: &Path, e: impl std::fmt::Display) -> LoadError {
    LoadError::Onnx {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Loaded ONNX regressor with metadata
pub struct OnnxModel {
    /// Runs need exclusive access to the session
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load an ONNX model from file
    pub fn load(path: &Path, threads: usize) -> Result<Self, LoadError> {
        init_runtime(path)?;

        let session = Session::builder()
            .map_err(|e| onnx_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| onnx_error(path, e))?
            .with_intra_threads(threads)
            .map_err(|e| onnx_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| onnx_error(path, e))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| {
                o.name.contains("variable") || o.name.contains("output") || o.name.contains("prediction")
            })
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| LoadError::Corrupt {
                path: path.to_path_buf(),
                reason: "model declares no outputs".to_string(),
            })?;

        info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            threads,
            "ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Run the model on one record; input shape is `[1, 6]`
    pub fn predict(
        &self,
        extractor: &FeatureExtractor,
        record: &CustomerRecord,
    ) -> Result<f64, PredictError> {
        let features = extractor.extract(record);
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features))
            .map_err(|e| PredictError::Runtime(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| PredictError::Runtime(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| PredictError::Runtime(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| PredictError::Runtime(format!("missing output '{}'", self.output_name)))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictError::Runtime(e.to_string()))?;

        let value = data
            .first()
            .map(|&v| v as f64)
            .ok_or_else(|| PredictError::Runtime("empty output tensor".to_string()))?;

        debug!(output = %self.output_name, value, "Extracted from tensor");
        Ok(value)
    }
}
