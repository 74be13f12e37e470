//! Decision trees as exported by the training job.
//!
//! Nodes are stored flat with node 0 as the root. A split sends a sample
//! left when `x[feature] <= threshold`. Children always sit after their
//! parent, which `validate` enforces, so evaluation cannot loop.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Single-leaf tree
    pub fn constant(value: f64) -> Self {
        Self::new(vec![TreeNode::Leaf(value)])
    }

    /// Depth-one tree on one feature
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        Self::new(vec![
            TreeNode::Split { feature, threshold, left: 1, right: 2 },
            TreeNode::Leaf(left),
            TreeNode::Leaf(right),
        ])
    }

    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= feature_count {
                        return Err(format!(
                            "node {} splits on feature {} (only {} features)",
                            idx, feature, feature_count
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has non-finite threshold", idx));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf(value) => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} is not finite", idx));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `features`. Assumes a validated tree.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf(value) => return *value,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if features[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stump() {
        let t = DecisionTree::stump(0, 1.0, -2.0, 3.0);
        assert!(t.validate(1).is_ok());
        assert_eq!(t.predict(&[0.5]), -2.0);
        assert_eq!(t.predict(&[1.0]), -2.0);
        assert_eq!(t.predict(&[1.5]), 3.0);
    }

    #[test]
    fn test_nested() {
        let t = DecisionTree::new(vec![
            TreeNode::Split { feature: 0, threshold: 0.0, left: 1, right: 2 },
            TreeNode::Leaf(0.1),
            TreeNode::Split { feature: 1, threshold: 5.0, left: 3, right: 4 },
            TreeNode::Leaf(0.5),
            TreeNode::Leaf(0.9),
        ]);
        assert!(t.validate(2).is_ok());
        assert_eq!(t.predict(&[-1.0, 100.0]), 0.1);
        assert_eq!(t.predict(&[1.0, 4.0]), 0.5);
        assert_eq!(t.predict(&[1.0, 6.0]), 0.9);
    }

    #[test]
    fn test_reject_cycle() {
        let t = DecisionTree::new(vec![
            TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 1 },
            TreeNode::Leaf(0.0),
        ]);
        assert!(t.validate(1).is_err());
    }

    #[test]
    fn test_reject_out_of_range_feature() {
        assert!(DecisionTree::stump(3, 0.0, 0.0, 1.0).validate(3).is_err());
        assert!(DecisionTree::new(vec![]).validate(3).is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"nodes":[{"split":{"feature":0,"threshold":1.5,"left":1,"right":2}},{"leaf":0.2},{"leaf":0.8}]}"#;
        let t: DecisionTree = serde_json::from_str(json).unwrap();
        assert_eq!(t, DecisionTree::stump(0, 1.5, 0.2, 0.8));
    }
}
