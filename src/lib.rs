//! Insurance Charges Predictor Library
//!
//! Loads a fixed set of pre-trained regression models once and predicts
//! insurance charges for a customer record from one or all of them.
//! Per-model failures are reported alongside successful predictions.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod logging;
pub mod models;
pub mod render;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, LoadError, PredictError, RecordError, SelectionError};
pub use feature_extractor::FeatureExtractor;
pub use models::{ModelKind, ModelRegistry, PredictionDispatcher, Selection};
pub use render::ResultRenderer;
pub use types::{CustomerRecord, ModelPrediction, PredictionResult, Region, Sex, Smoker};
