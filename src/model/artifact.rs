//! JSON regression artifacts: tree ensembles and linear models.
//!
//! Tree nodes are stored flat, in the order a fitted tree exports them:
//! node 0 is the root and every child index is greater than its parent's.
//! A split node sends `row[feature] <= threshold` to `left`.

use std::{fs, path::Path};

use serde::Deserialize;

use super::{check_importances, HasFeatureImportance, Regressor};
use crate::{
    error::ModelError,
    types::{FeatureRow, N_FEATURES},
};

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Artifact {
    Forest {
        trees: Vec<Tree>,
        #[serde(default)]
        aggregate: Aggregate,
        #[serde(default)]
        base_score: f64,
        #[serde(default)]
        feature_importances: Option<Vec<f64>>,
    },
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
        #[serde(default)]
        feature_importances: Option<Vec<f64>>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Average of tree outputs (random forest).
    #[default]
    Mean,
    /// `base_score` plus the sum of tree outputs (boosted trees).
    Sum,
}

#[derive(Debug, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Node {
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

#[derive(Debug)]
enum Estimator {
    Forest {
        trees: Vec<Tree>,
        aggregate: Aggregate,
        base_score: f64,
    },
    Linear {
        intercept: f64,
        coefficients: FeatureRow,
    },
}

#[derive(Debug)]
pub struct JsonModel {
    estimator: Estimator,
    importances: Option<Vec<f64>>,
}

impl JsonModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let txt = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: Artifact = serde_json::from_str(&txt).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: Artifact) -> Result<Self, ModelError> {
        let (estimator, importances) = match artifact {
            Artifact::Forest {
                trees,
                aggregate,
                base_score,
                feature_importances,
            } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("forest has no trees".into()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate()
                        .map_err(|msg| ModelError::Invalid(format!("tree {i}: {msg}")))?;
                }
                (
                    Estimator::Forest {
                        trees,
                        aggregate,
                        base_score,
                    },
                    feature_importances,
                )
            }
            Artifact::Linear {
                intercept,
                coefficients,
                feature_importances,
            } => {
                let coefficients: FeatureRow =
                    coefficients.as_slice().try_into().map_err(|_| {
                        ModelError::Invalid(format!(
                            "linear model has {} coefficients, expected {}",
                            coefficients.len(),
                            N_FEATURES
                        ))
                    })?;
                (
                    Estimator::Linear {
                        intercept,
                        coefficients,
                    },
                    feature_importances,
                )
            }
        };

        if let Some(weights) = &importances {
            check_importances(weights)?;
        }

        Ok(Self {
            estimator,
            importances,
        })
    }

    fn predict_row(&self, row: &FeatureRow) -> f64 {
        match &self.estimator {
            Estimator::Forest {
                trees,
                aggregate,
                base_score,
            } => {
                let total: f64 = trees.iter().map(|t| t.eval(row)).sum();
                match aggregate {
                    Aggregate::Mean => total / trees.len() as f64,
                    Aggregate::Sum => base_score + total,
                }
            }
            Estimator::Linear {
                intercept,
                coefficients,
            } => intercept + coefficients.iter().zip(row).map(|(w, x)| w * x).sum::<f64>(),
        }
    }
}

impl Tree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".into());
        }
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= N_FEATURES {
                        return Err(format!("node {idx} splits on feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {idx} has a NaN threshold"));
                    }
                    // children after their parent keeps traversal acyclic
                    for child in [left, right] {
                        if child <= idx || child >= n {
                            return Err(format!("node {idx} has child {child} out of order"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {idx} is not finite"));
                    }
                }
            }
        }
        Ok(())
    }

    fn eval(&self, row: &FeatureRow) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Regressor for JsonModel {
    fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::Forest { .. } => "forest",
            Estimator::Linear { .. } => "linear",
        }
    }

    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }
}

impl HasFeatureImportance for JsonModel {
    fn feature_importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }
}
