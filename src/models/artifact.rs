//! Serialized estimators and their validated, ready-to-evaluate form.

use serde::{Deserialize, Serialize};

use crate::models::parameter::Feature;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    Forest(ForestModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// Ensemble of regression trees; the prediction is the mean of all trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub features: Vec<String>,
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    /// Node 0 is the root.
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise to `right`.
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

impl RegressionTree {
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but the model has {} features",
                            idx, feature, n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    // Children must come after their parent so evaluation always terminates
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!(
                                "node {} points to invalid child {}",
                                idx, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Map artifact feature names onto positions in [`Feature::MODEL_FEATURES`].
fn resolve_features(names: &[String]) -> Result<Vec<usize>, String> {
    let expected = Feature::MODEL_FEATURES;
    if names.len() != expected.len() {
        return Err(format!(
            "expected {} features, artifact declares {}",
            expected.len(),
            names.len()
        ));
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let feature =
            Feature::from_column(name).ok_or_else(|| format!("unknown feature '{}'", name))?;
        let position = expected
            .iter()
            .position(|f| *f == feature)
            .ok_or_else(|| format!("unsupported feature '{}'", name))?;
        if columns.contains(&position) {
            return Err(format!("duplicate feature '{}'", name));
        }
        columns.push(position);
    }

    Ok(columns)
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear(_) => "linear",
            ModelArtifact::Forest(_) => "forest",
        }
    }

    /// Validate the artifact and bind its features to the canonical order.
    pub fn into_trained(self) -> Result<TrainedModel, String> {
        let columns = match &self {
            ModelArtifact::Linear(model) => {
                let columns = resolve_features(&model.features)?;
                if model.coefficients.len() != columns.len() {
                    return Err(format!(
                        "{} coefficients for {} features",
                        model.coefficients.len(),
                        columns.len()
                    ));
                }
                if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("linear model has non-finite parameters".to_string());
                }
                columns
            }
            ModelArtifact::Forest(model) => {
                let columns = resolve_features(&model.features)?;
                if model.trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                for (i, tree) in model.trees.iter().enumerate() {
                    tree.check(columns.len())
                        .map_err(|e| format!("tree {}: {}", i, e))?;
                }
                columns
            }
        };

        Ok(TrainedModel {
            columns,
            artifact: self,
        })
    }
}

/// A validated artifact that evaluates rows given in
/// [`Feature::MODEL_FEATURES`] order.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// `columns[i]` is the canonical position of the artifact's i-th feature.
    columns: Vec<usize>,
    artifact: ModelArtifact,
}

impl TrainedModel {
    pub fn kind(&self) -> &'static str {
        self.artifact.kind()
    }

    pub fn predict_one(&self, x: &[f64; 5]) -> f64 {
        let ordered: Vec<f64> = self.columns.iter().map(|&c| x[c]).collect();

        match &self.artifact {
            ModelArtifact::Linear(model) => {
                model.intercept
                    + model
                        .coefficients
                        .iter()
                        .zip(&ordered)
                        .map(|(c, v)| c * v)
                        .sum::<f64>()
            }
            ModelArtifact::Forest(model) => {
                let total: f64 = model.trees.iter().map(|t| t.evaluate(&ordered)).sum();
                total / model.trees.len() as f64
            }
        }
    }

    pub fn predict_batch(&self, rows: &[[f64; 5]]) -> Vec<f64> {
        rows.iter().map(|x| self.predict_one(x)).collect()
    }
}
