//! Error types for record validation, artifact loading and prediction

use std::path::PathBuf;
use thiserror::Error;

/// A customer record field outside its allowed domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("unknown {field} value '{value}' (expected one of: {expected})")]
    UnknownVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Model selection that does not name a registered model
#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown model '{0}'")]
pub struct SelectionError(pub String);

/// Native pipeline artifact that cannot be used
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Fatal failure while building the model registry
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("artifact for {model} not found in {} (tried: {tried})", .dir.display())]
    NotFound {
        model: String,
        dir: PathBuf,
        tried: String,
    },

    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt artifact {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("unsupported artifact format '{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error for {}: {message}", .path.display())]
    Onnx { path: PathBuf, message: String },
}

/// Failure of a single model invocation. Local to that model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("Found unknown categories ['{value}'] in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("columns are missing: {{'{0}'}}")]
    MissingColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("column '{0}' is not categorical")]
    NotCategorical(String),

    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),

    #[error("feature vector has {got} values, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("model runtime failure: {0}")]
    Runtime(String),
}
