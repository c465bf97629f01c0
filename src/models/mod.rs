//! Regression model loading, registry and dispatch

pub mod dispatcher;
pub mod kind;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod pipeline;
pub mod predictor;
pub mod registry;

pub use dispatcher::PredictionDispatcher;
pub use kind::{ModelKind, Selection};
pub use loader::ModelLoader;
pub use predictor::{Predictor, Regressor};
pub use registry::ModelRegistry;
