//! Native regression pipeline artifacts.
//!
//! A pipeline is a JSON document with a column preprocessor (numeric
//! standardization plus one-hot encoding of categoricals) followed by one
//! fitted estimator. Structural problems are rejected by [`Pipeline::validate`]
//! when the artifact is parsed. Evaluation still checks shapes and node
//! indices, so a pipeline built by hand fails one prediction instead of
//! panicking.

use crate::error::{ArtifactError, PredictError};
use crate::feature_extractor::{ColumnValue, FeatureExtractor};
use crate::types::record::CustomerRecord;
use serde::{Deserialize, Serialize};

/// Numeric column, optionally standardized as `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub scale: Option<f64>,
}

/// One-hot encoded categorical column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
    /// Drop the indicator of the first category
    #[serde(default)]
    pub drop_first: bool,
}

impl CategoricalColumn {
    fn width(&self) -> usize {
        if self.drop_first {
            self.categories.len().saturating_sub(1)
        } else {
            self.categories.len()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preprocessor {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
}

impl Preprocessor {
    /// Number of encoded features
    pub fn width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.width()).sum::<usize>()
    }

    /// Encode a record into the estimator's feature space
    pub fn transform(
        &self,
        extractor: &FeatureExtractor,
        record: &CustomerRecord,
    ) -> Result<Vec<f64>, PredictError> {
        let mut features = Vec::with_capacity(self.width());

        for col in &self.numeric {
            let value = match extractor.column(record, &col.name) {
                Some(ColumnValue::Numeric(v)) => v,
                Some(ColumnValue::Categorical(_)) => {
                    return Err(PredictError::NotNumeric(col.name.clone()))
                }
                None => return Err(PredictError::MissingColumn(col.name.clone())),
            };
            let centered = value - col.mean.unwrap_or(0.0);
            features.push(centered / col.scale.unwrap_or(1.0));
        }

        for col in &self.categorical {
            let label = match extractor.column(record, &col.name) {
                Some(ColumnValue::Categorical(label)) => label,
                Some(ColumnValue::Numeric(_)) => {
                    return Err(PredictError::NotCategorical(col.name.clone()))
                }
                None => return Err(PredictError::MissingColumn(col.name.clone())),
            };
            let index = col
                .categories
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| PredictError::UnknownCategory {
                    column: col.name.clone(),
                    value: label.to_string(),
                })?;
            let skip = usize::from(col.drop_first);
            for i in skip..col.categories.len() {
                features.push(if i == index { 1.0 } else { 0.0 });
            }
        }

        Ok(features)
    }

    fn validate(&self) -> Result<(), String> {
        for col in &self.numeric {
            if let Some(scale) = col.scale {
                if scale == 0.0 || !scale.is_finite() {
                    return Err(format!("numeric column '{}' has invalid scale {}", col.name, scale));
                }
            }
            if col.mean.is_some_and(|m| !m.is_finite()) {
                return Err(format!("numeric column '{}' has a non-finite mean", col.name));
            }
        }
        for col in &self.categorical {
            if col.categories.is_empty() {
                return Err(format!("categorical column '{}' has no categories", col.name));
            }
        }
        if self.width() == 0 {
            return Err("preprocessor produces no features".to_string());
        }
        Ok(())
    }
}

/// Comparison used at a split node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Left when `x <= threshold`
    #[default]
    Le,
    /// Left when `x < threshold`
    Lt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn evaluate(&self, features: &[f64], decision: Decision) -> Result<f64, PredictError> {
        let mut index = 0;
        // A walk longer than the node count has looped.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = *features.get(*feature).ok_or(PredictError::ShapeMismatch {
                        expected: feature + 1,
                        got: features.len(),
                    })?;
                    let go_left = match decision {
                        Decision::Le => x <= *threshold,
                        Decision::Lt => x < *threshold,
                    };
                    index = if go_left { *left } else { *right };
                }
                None => {
                    return Err(PredictError::Malformed(format!(
                        "tree node {} does not exist",
                        index
                    )))
                }
            }
        }
        Err(PredictError::Malformed("tree walk never reached a leaf".to_string()))
    }

    // Children must point forward so evaluation always terminates.
    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!("node {} splits on feature {} of {}", i, feature, width));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", i));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", i));
                    }
                }
            }
        }
        Ok(())
    }
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Bagging: average of tree outputs
    Mean,
    /// Boosting: `base_score + learning_rate * sum`
    Sum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf {
        gamma: f64,
    },
    Poly {
        gamma: f64,
        #[serde(default)]
        coef0: f64,
        degree: i32,
    },
}

impl Kernel {
    fn is_finite(&self) -> bool {
        match self {
            Kernel::Linear => true,
            Kernel::Rbf { gamma } => gamma.is_finite(),
            Kernel::Poly { gamma, coef0, .. } => gamma.is_finite() && coef0.is_finite(),
        }
    }

    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Kernel::Linear => dot(a, b),
            Kernel::Rbf { gamma } => {
                let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * dist).exp()
            }
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => (gamma * dot(a, b) + coef0).powi(*degree),
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), PredictError> {
    if features.len() != expected {
        return Err(PredictError::ShapeMismatch {
            expected,
            got: features.len(),
        });
    }
    Ok(())
}

/// Fitted estimator applied to the encoded features
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        #[serde(default)]
        decision: Decision,
        trees: Vec<Tree>,
    },
    Svr {
        kernel: Kernel,
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
    },
}

fn default_learning_rate() -> f64 {
    1.0
}

impl Estimator {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        match self {
            Estimator::Linear {
                intercept,
                coefficients,
            } => {
                check_width(coefficients.len(), features)?;
                Ok(intercept + dot(coefficients, features))
            }
            Estimator::TreeEnsemble {
                aggregation,
                base_score,
                learning_rate,
                decision,
                trees,
            } => {
                let total = trees
                    .iter()
                    .map(|t| t.evaluate(features, *decision))
                    .sum::<Result<f64, _>>()?;
                Ok(match aggregation {
                    Aggregation::Mean => total / trees.len() as f64,
                    Aggregation::Sum => base_score + learning_rate * total,
                })
            }
            Estimator::Svr {
                kernel,
                support_vectors,
                dual_coef,
                intercept,
            } => {
                if support_vectors.len() != dual_coef.len() {
                    return Err(PredictError::Malformed(format!(
                        "{} support vectors but {} dual coefficients",
                        support_vectors.len(),
                        dual_coef.len()
                    )));
                }
                let mut sum = 0.0;
                for (sv, alpha) in support_vectors.iter().zip(dual_coef) {
                    check_width(sv.len(), features)?;
                    sum += alpha * kernel.apply(sv, features);
                }
                Ok(sum + intercept)
            }
        }
    }

    fn validate(&self, width: usize) -> Result<(), String> {
        match self {
            Estimator::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != width {
                    return Err(format!(
                        "linear model has {} coefficients, preprocessor produces {} features",
                        coefficients.len(),
                        width
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("linear model has non-finite parameters".to_string());
                }
            }
            Estimator::TreeEnsemble {
                base_score,
                learning_rate,
                trees,
                ..
            } => {
                if trees.is_empty() {
                    return Err("tree ensemble has no trees".to_string());
                }
                if !base_score.is_finite() || !learning_rate.is_finite() {
                    return Err("tree ensemble has non-finite parameters".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(width).map_err(|e| format!("tree {}: {}", i, e))?;
                }
            }
            Estimator::Svr {
                kernel,
                support_vectors,
                dual_coef,
                intercept,
            } => {
                if support_vectors.is_empty() {
                    return Err("SVR has no support vectors".to_string());
                }
                if support_vectors.len() != dual_coef.len() {
                    return Err(format!(
                        "SVR has {} support vectors but {} dual coefficients",
                        support_vectors.len(),
                        dual_coef.len()
                    ));
                }
                if let Some(sv) = support_vectors.iter().find(|sv| sv.len() != width) {
                    return Err(format!(
                        "support vector of width {}, preprocessor produces {} features",
                        sv.len(),
                        width
                    ));
                }
                if !intercept.is_finite()
                    || !kernel.is_finite()
                    || dual_coef.iter().any(|a| !a.is_finite())
                    || support_vectors.iter().flatten().any(|x| !x.is_finite())
                {
                    return Err("SVR has non-finite parameters".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Transform applied to the training target; its inverse maps raw estimator
/// output back to charges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTransform {
    #[default]
    Identity,
    Log,
    Log1p,
}

impl TargetTransform {
    fn inverse(&self, value: f64) -> f64 {
        match self {
            TargetTransform::Identity => value,
            TargetTransform::Log => value.exp(),
            TargetTransform::Log1p => value.exp_m1(),
        }
    }
}

/// A fitted regression pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub preprocessor: Preprocessor,
    pub estimator: Estimator,
    #[serde(default)]
    pub target_transform: TargetTransform,
}

impl Pipeline {
    /// Parse a pipeline from its JSON artifact and check its structure
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let pipeline: Pipeline = serde_json::from_slice(bytes)?;
        pipeline.validate().map_err(ArtifactError::Invalid)?;
        Ok(pipeline)
    }

    /// Structural checks; a failure here means the artifact is corrupt
    pub fn validate(&self) -> Result<(), String> {
        self.preprocessor.validate()?;
        self.estimator.validate(self.preprocessor.width())
    }

    /// Run the pipeline on one record
    pub fn predict(
        &self,
        extractor: &FeatureExtractor,
        record: &CustomerRecord,
    ) -> Result<f64, PredictError> {
        let features = self.preprocessor.transform(extractor, record)?;
        let value = self.target_transform.inverse(self.estimator.predict(&features)?);
        if !value.is_finite() {
            return Err(PredictError::NonFinite(value));
        }
        Ok(value)
    }
}
