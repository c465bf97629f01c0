//! Configuration management for the insurance charges predictor

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelsConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Model artifacts configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory containing the model artifacts
    pub models_dir: String,
    /// Artifact extensions tried in order ("json", "onnx")
    pub extensions: Vec<String>,
    /// Number of threads for ONNX inference per model
    pub onnx_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: "models".to_string(),
            extensions: vec!["json".to_string(), "onnx".to_string()],
            onnx_threads: 1,
        }
    }
}

/// Result display configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol prefixed to predicted charges
    pub currency_symbol: String,
    /// Group thousands in single-model output
    pub thousands_separator: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            thousands_separator: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, with `PREDICTOR__*` overrides.
    ///
    /// A missing file leaves the defaults in place; the environment still
    /// applies on top of them.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("PREDICTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.models.models_dir, "models");
        assert_eq!(config.models.extensions, vec!["json", "onnx"]);
        assert_eq!(config.models.onnx_threads, 1);
        assert_eq!(config.display.currency_symbol, "₹");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[models]\nmodels_dir = \"artifacts\"\n\n[display]\ncurrency_symbol = \"$\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.models.models_dir, "artifacts");
        assert_eq!(config.models.extensions, vec!["json", "onnx"]);
        assert_eq!(config.display.currency_symbol, "$");
        assert!(config.display.thousands_separator);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_uses_defaults_and_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("PREDICTOR__MODELS__ONNX_THREADS", "4");
        let loaded = AppConfig::load_from_path(dir.path().join("absent.toml"));
        std::env::remove_var("PREDICTOR__MODELS__ONNX_THREADS");

        let config = loaded.unwrap();
        assert_eq!(config.models.onnx_threads, 4);
        assert_eq!(config.models.models_dir, "models");
        assert_eq!(config.display.currency_symbol, "₹");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[models
models_dir = ").unwrap();
        assert!(AppConfig::load_from_path(&path).is_err());
    }
}
