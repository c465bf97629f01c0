//! Model registry: the set of loaded models, built once at startup

use crate::config::ModelsConfig;
use crate::error::LoadError;
use crate::models::kind::ModelKind;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::models::predictor::Predictor;
use std::path::PathBuf;
use tracing::info;

/// Read-only mapping of model → predictor, in registration order.
///
/// Built explicitly and passed by reference to the dispatcher; nothing
/// mutates it after construction.
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<LoadedModel>,
}

impl ModelRegistry {
    /// Load every registered artifact from the configured directory
    pub fn load(config: &ModelsConfig) -> Result<Self, LoadError> {
        let loader = ModelLoader::with_options(config.extensions.clone(), config.onnx_threads);
        let models = loader.load_all_models(&config.models_dir)?;
        let registry = Self::from_loaded(models);

        info!(
            models = ?registry.model_names(),
            "Model registry initialized"
        );
        Ok(registry)
    }

    /// Build a registry from already-loaded models, ordered by registration order
    pub fn from_loaded(mut models: Vec<LoadedModel>) -> Self {
        models.sort_by_key(|m| m.kind);
        models.dedup_by_key(|m| m.kind);
        Self { models }
    }

    /// Build a registry from in-memory predictors
    pub fn from_models<I>(models: I) -> Self
    where
        I: IntoIterator<Item = (ModelKind, Predictor)>,
    {
        Self::from_loaded(
            models
                .into_iter()
                .map(|(kind, predictor)| LoadedModel {
                    kind,
                    path: PathBuf::new(),
                    predictor,
                })
                .collect(),
        )
    }

    /// The full mapping, in registration order
    pub fn get_models(&self) -> impl Iterator<Item = (ModelKind, &Predictor)> {
        self.models.iter().map(|m| (m.kind, &m.predictor))
    }

    pub fn get(&self, kind: ModelKind) -> Option<&Predictor> {
        self.models.iter().find(|m| m.kind == kind).map(|m| &m.predictor)
    }

    pub fn contains(&self, kind: ModelKind) -> bool {
        self.get(kind).is_some()
    }

    /// Get the number of loaded models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.kind.display_name()).collect()
    }
}
