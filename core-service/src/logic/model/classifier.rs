//! Binary classifiers that can appear in a model bundle.
//!
//! Every kind maps a scaled feature row to P(waterlogging) in [0, 1].

use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Boosted trees: sigmoid(base_margin + Σ leaf)
    GradientBoosted {
        #[serde(default)]
        base_margin: f64,
        trees: Vec<DecisionTree>,
    },
    /// Bagged trees whose leaves hold class-1 probabilities: mean over trees
    RandomForest { trees: Vec<DecisionTree> },
    /// sigmoid(w·x + b)
    Logistic { weights: Vec<f64>, intercept: f64 },
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::GradientBoosted { .. } => "gradient_boosted",
            Classifier::RandomForest { .. } => "random_forest",
            Classifier::Logistic { .. } => "logistic",
        }
    }

    pub fn tree_count(&self) -> usize {
        match self {
            Classifier::GradientBoosted { trees, .. } | Classifier::RandomForest { trees } => trees.len(),
            Classifier::Logistic { .. } => 0,
        }
    }

    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        match self {
            Classifier::GradientBoosted { base_margin, trees } => {
                if !base_margin.is_finite() {
                    return Err("base_margin is not finite".to_string());
                }
                validate_trees(trees, feature_count)
            }
            Classifier::RandomForest { trees } => validate_trees(trees, feature_count),
            Classifier::Logistic { weights, intercept } => {
                if weights.len() != feature_count {
                    return Err(format!(
                        "{} weights for {} features",
                        weights.len(),
                        feature_count
                    ));
                }
                if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                    return Err("non-finite coefficient".to_string());
                }
                Ok(())
            }
        }
    }

    /// Probability of the positive class for one scaled row
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Classifier::GradientBoosted { base_margin, trees } => {
                let margin: f64 = trees.iter().map(|t| t.predict(row)).sum();
                sigmoid(base_margin + margin)
            }
            Classifier::RandomForest { trees } => {
                let total: f64 = trees.iter().map(|t| t.predict(row)).sum();
                (total / trees.len() as f64).clamp(0.0, 1.0)
            }
            Classifier::Logistic { weights, intercept } => {
                let z: f64 = weights.iter().zip(row).map(|(w, x)| w * x).sum();
                sigmoid(z + intercept)
            }
        }
    }
}

fn validate_trees(trees: &[DecisionTree], feature_count: usize) -> Result<(), String> {
    if trees.is_empty() {
        return Err("no trees".to_string());
    }
    for (i, tree) in trees.iter().enumerate() {
        tree.validate(feature_count)
            .map_err(|e| format!("tree {}: {}", i, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn test_gradient_boosted() {
        let c = Classifier::GradientBoosted {
            base_margin: -1.0,
            trees: vec![DecisionTree::stump(0, 0.0, 0.0, 2.0), DecisionTree::constant(1.0)],
        };
        assert!(c.validate(1).is_ok());
        assert_eq!(c.predict_proba(&[-1.0]), 0.5);
        assert!((c.predict_proba(&[1.0]) - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_random_forest_averages() {
        let c = Classifier::RandomForest {
            trees: vec![DecisionTree::constant(0.2), DecisionTree::stump(0, 0.0, 0.0, 1.0)],
        };
        assert!((c.predict_proba(&[1.0]) - 0.6).abs() < 1e-12);
        assert!((c.predict_proba(&[-1.0]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_logistic() {
        let c = Classifier::Logistic { weights: vec![1.0, -1.0], intercept: 0.0 };
        assert_eq!(c.predict_proba(&[2.0, 2.0]), 0.5);
        assert!(c.validate(3).is_err());
    }

    #[test]
    fn test_empty_forest_rejected() {
        let c = Classifier::RandomForest { trees: vec![] };
        assert!(c.validate(15).is_err());
    }

    #[test]
    fn test_tagged_json() {
        let json = r#"{"kind":"random_forest","trees":[{"nodes":[{"leaf":0.7}]}]}"#;
        let c: Classifier = serde_json::from_str(json).unwrap();
        assert_eq!(c.kind(), "random_forest");
        assert_eq!(c.tree_count(), 1);
    }
}
