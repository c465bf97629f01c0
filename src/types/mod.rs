//! Type definitions for the insurance charges predictor

pub mod prediction;
pub mod record;

pub use prediction::{round_charges, ModelPrediction, PredictionResult};
pub use record::{CustomerRecord, Region, Sex, Smoker};
