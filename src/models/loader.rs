//! Model artifact loader

use crate::error::{ArtifactError, LoadError};
use crate::models::kind::ModelKind;
use crate::models::pipeline::Pipeline;
use crate::models::predictor::Predictor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loaded model with metadata
#[derive(Debug)]
pub struct LoadedModel {
    pub kind: ModelKind,
    pub path: PathBuf,
    pub predictor: Predictor,
}

/// Loader for model artifacts
pub struct ModelLoader {
    /// Extensions tried, in order, when resolving an artifact
    extensions: Vec<String>,
    /// Number of threads for ONNX inference
    #[cfg_attr(not(feature = "onnx"), allow(dead_code))]
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (json then onnx, 1 thread)
    pub fn new() -> Self {
        Self::with_options(vec!["json".to_string(), "onnx".to_string()], 1)
    }

    pub fn with_options(extensions: Vec<String>, onnx_threads: usize) -> Self {
        Self {
            extensions,
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Find the artifact file for a model in a directory
    pub fn resolve(&self, models_dir: &Path, kind: ModelKind) -> Result<PathBuf, LoadError> {
        self.extensions
            .iter()
            .map(|ext| models_dir.join(format!("{}.{}", kind.artifact_stem(), ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| LoadError::NotFound {
                model: kind.display_name().to_string(),
                dir: models_dir.to_path_buf(),
                tried: self
                    .extensions
                    .iter()
                    .map(|ext| format!("{}.{}", kind.artifact_stem(), ext))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Load a single artifact, dispatching on its file extension
    pub fn load_model(&self, path: &Path, kind: ModelKind) -> Result<LoadedModel, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        info!(model = %kind, path = %path.display(), "Loading model artifact");

        let predictor = match extension.as_str() {
            "json" => Predictor::Pipeline(load_pipeline(path)?),
            #[cfg(feature = "onnx")]
            "onnx" => Predictor::Onnx(crate::models::onnx::OnnxModel::load(
                path,
                self.onnx_threads,
            )?),
            _ => {
                return Err(LoadError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                })
            }
        };

        info!(model = %kind, format = predictor.format(), "Model loaded successfully");

        Ok(LoadedModel {
            kind,
            path: path.to_path_buf(),
            predictor,
        })
    }

    /// Load every registered model from a directory, in registration order.
    ///
    /// Any missing or corrupt artifact fails the whole load.
    pub fn load_all_models<P: AsRef<Path>>(&self, models_dir: P) -> Result<Vec<LoadedModel>, LoadError> {
        let models_dir = models_dir.as_ref();
        let mut models = Vec::with_capacity(ModelKind::ALL.len());

        for kind in ModelKind::ALL {
            let path = self.resolve(models_dir, kind).inspect_err(|e| {
                warn!(model = %kind, error = %e, "Model artifact not found");
            })?;
            models.push(self.load_model(&path, kind)?);
        }

        info!(
            count = models.len(),
            "Loaded {} models from {}",
            models.len(),
            models_dir.display()
        );

        Ok(models)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_pipeline(path: &Path) -> Result<Pipeline, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Pipeline::from_json(&bytes).map_err(|e| match e {
        ArtifactError::Parse(source) => LoadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ArtifactError::Invalid(reason) => LoadError::Corrupt {
            path: path.to_path_buf(),
            reason,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: &str = r#"{
        "preprocessor": {"numeric": [{"name": "age"}]},
        "estimator": {"type": "linear", "intercept": 1.0, "coefficients": [2.0]}
    }"#;

    #[test]
    fn test_resolve_prefers_first_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best_model_Ridge.onnx"), b"").unwrap();
        std::fs::write(dir.path().join("best_model_Ridge.json"), LINEAR).unwrap();

        let loader = ModelLoader::new();
        let path = loader.resolve(dir.path(), ModelKind::Ridge).unwrap();
        assert_eq!(path, dir.path().join("best_model_Ridge.json"));
    }

    #[test]
    fn test_missing_artifact_names_model() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModelLoader::new();

        let err = loader.load_all_models(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { ref model, .. } if model == "Linear Regression"));
        assert!(err.to_string().contains("best_model_Linear.json"));
    }

    #[test]
    fn test_corrupt_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_Lasso.json");
        std::fs::write(&path, b"{not json").unwrap();

        let loader = ModelLoader::new();
        let err = loader.load_model(&path, ModelKind::Lasso).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_structurally_invalid_artifact_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_RandomForest.json");
        std::fs::write(
            &path,
            r#"{
                "preprocessor": {"numeric": [{"name": "age"}]},
                "estimator": {"type": "tree_ensemble", "aggregation": "mean", "trees": [
                    {"nodes": [
                        {"feature": 5, "threshold": 1.0, "left": 1, "right": 2},
                        {"value": 1.0},
                        {"value": 2.0}
                    ]}
                ]}
            }"#,
        )
        .unwrap();

        let err = ModelLoader::new()
            .load_model(&path, ModelKind::RandomForest)
            .unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { ref reason, .. } if reason.contains("feature 5")));
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn test_garbage_onnx_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_XGBoost.onnx");
        std::fs::write(&path, b"this is not an onnx graph").unwrap();

        let loader = ModelLoader::with_options(vec!["onnx".to_string()], 1);
        assert_eq!(loader.resolve(dir.path(), ModelKind::XgBoost).unwrap(), path);

        let err = loader.load_model(&path, ModelKind::XgBoost).unwrap_err();
        assert!(matches!(err, LoadError::Onnx { path: ref p, .. } if *p == path));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_unsupported_without_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_XGBoost.onnx");
        std::fs::write(&path, b"").unwrap();

        let err = ModelLoader::new().load_model(&path, ModelKind::XgBoost).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref extension, .. } if extension == "onnx"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_SVR.joblib");
        std::fs::write(&path, b"").unwrap();

        let loader = ModelLoader::with_options(vec!["joblib".to_string()], 1);
        let err = loader.load_model(&path, ModelKind::Svr).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref extension, .. } if extension == "joblib"));
    }

    #[test]
    fn test_load_pipeline_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_Linear.json");
        std::fs::write(&path, LINEAR).unwrap();

        let model = ModelLoader::new().load_model(&path, ModelKind::Linear).unwrap();
        assert_eq!(model.kind, ModelKind::Linear);
        assert_eq!(model.predictor.format(), "pipeline");
    }
}
