//! The fixed set of registered models and the request-time model selection

use crate::error::SelectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight registered regression models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Ridge,
    Lasso,
    RandomForest,
    GradientBoosting,
    XgBoost,
    Svr,
    LightGbm,
}

impl ModelKind {
    /// Registration order
    pub const ALL: [ModelKind; 8] = [
        ModelKind::Linear,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::XgBoost,
        ModelKind::Svr,
        ModelKind::LightGbm,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear Regression",
            ModelKind::Ridge => "Ridge Regression",
            ModelKind::Lasso => "Lasso Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
            ModelKind::XgBoost => "XGBoost",
            ModelKind::Svr => "SVR",
            ModelKind::LightGbm => "LightGBM",
        }
    }

    /// File name of the artifact without extension
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            ModelKind::Linear => "best_model_Linear",
            ModelKind::Ridge => "best_model_Ridge",
            ModelKind::Lasso => "best_model_Lasso",
            ModelKind::RandomForest => "best_model_RandomForest",
            ModelKind::GradientBoosting => "best_model_GradientBoosting",
            ModelKind::XgBoost => "best_model_XGBoost",
            ModelKind::Svr => "best_model_SVR",
            ModelKind::LightGbm => "best_model_LightGBM",
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let normalized: String = needle
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let aliases: &[&str] = match self {
            ModelKind::Linear => &["linear", "linearregression"],
            ModelKind::Ridge => &["ridge", "ridgeregression"],
            ModelKind::Lasso => &["lasso", "lassoregression"],
            ModelKind::RandomForest => &["randomforest", "rf"],
            ModelKind::GradientBoosting => &["gradientboosting", "gbr"],
            ModelKind::XgBoost => &["xgboost", "xgb"],
            ModelKind::Svr => &["svr"],
            ModelKind::LightGbm => &["lightgbm", "lgbm"],
        };
        aliases.contains(&normalized.as_str())
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.matches(s))
            .ok_or_else(|| SelectionError(s.to_string()))
    }
}

/// Which model(s) a request runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Model(ModelKind),
}

impl Selection {
    pub const ALL_LABEL: &'static str = "All Models";
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(Self::ALL_LABEL),
            Selection::Model(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case(Self::ALL_LABEL) {
            return Ok(Selection::All);
        }
        trimmed.parse().map(Selection::Model)
    }
}

impl From<ModelKind> for Selection {
    fn from(kind: ModelKind) -> Self {
        Selection::Model(kind)
    }
}
