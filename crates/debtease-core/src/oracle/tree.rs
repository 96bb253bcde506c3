//! Gradient-boosted tree ensemble
//!
//! Artifacts use the XGBoost JSON tree dump layout, wrapped with the model's
//! base score:
//!
//! ```json
//! {
//!   "base_score": 0.5,
//!   "feature_names": ["Desired_Savings", "...", "Occupation"],
//!   "trees": [
//!     { "nodeid": 0, "split": "Eating_Out", "split_condition": 3000.0,
//!       "yes": 1, "no": 2, "missing": 1,
//!       "children": [ { "nodeid": 1, "leaf": 120.0 }, { "nodeid": 2, "leaf": 640.0 } ] }
//!   ]
//! }
//! ```
//!
//! A row goes to `yes` when its value is below `split_condition`, to `no`
//! otherwise, and to `missing` when the value is not finite.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::features::{feature_index, FeatureRow, FEATURE_NAMES};

use super::RegressionOracle;

fn default_base_score() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct RawEnsemble {
    #[serde(default = "default_base_score")]
    base_score: f64,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Split {
        nodeid: u32,
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        missing: Option<u32>,
        children: Vec<RawNode>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

impl RawNode {
    fn nodeid(&self) -> u32 {
        match self {
            RawNode::Split { nodeid, .. } | RawNode::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// One regression tree stored as a flat node arena; index 0 is the root
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_raw(root: &RawNode) -> Result<Self> {
        let mut nodes = Vec::new();
        flatten(root, &mut nodes)?;
        Ok(Self { nodes })
    }

    fn evaluate(&self, values: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = values[*feature];
                    index = if !value.is_finite() {
                        *missing
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Append `raw` and its subtree to the arena, returning the index of `raw`.
///
/// Branch targets must name direct children, so every path ends at a leaf.
fn flatten(raw: &RawNode, nodes: &mut Vec<Node>) -> Result<usize> {
    let index = nodes.len();
    match raw {
        RawNode::Leaf { leaf, .. } => {
            nodes.push(Node::Leaf(*leaf));
        }
        RawNode::Split {
            nodeid,
            split,
            split_condition,
            yes,
            no,
            missing,
            children,
        } => {
            let feature = feature_index(split).ok_or_else(|| {
                Error::ModelLoad(format!("node {} splits on unknown feature '{}'", nodeid, split))
            })?;

            // Placeholder until children have arena indices
            nodes.push(Node::Leaf(0.0));

            let mut child_index = HashMap::with_capacity(children.len());
            for child in children {
                let child_at = flatten(child, nodes)?;
                child_index.insert(child.nodeid(), child_at);
            }

            let resolve = |target: u32| {
                child_index.get(&target).copied().ok_or_else(|| {
                    Error::ModelLoad(format!(
                        "node {} branches to {} which is not one of its children",
                        nodeid, target
                    ))
                })
            };
            let yes_at = resolve(*yes)?;
            let no_at = resolve(*no)?;
            let missing_at = resolve(missing.unwrap_or(*yes))?;

            nodes[index] = Node::Split {
                feature,
                threshold: *split_condition,
                yes: yes_at,
                no: no_at,
                missing: missing_at,
            };
        }
    }
    Ok(index)
}

/// Additive ensemble of regression trees
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Parse an ensemble artifact
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawEnsemble = serde_json::from_slice(bytes)
            .map_err(|e| Error::ModelLoad(format!("invalid tree ensemble: {}", e)))?;

        if let Some(names) = &raw.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(Error::ModelLoad(
                    "feature_names do not match the expected feature schema".into(),
                ));
            }
        }

        let trees = raw
            .trees
            .iter()
            .map(Tree::from_raw)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            base_score: raw.base_score,
            trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl RegressionOracle for TreeEnsemble {
    fn predict(&self, row: &FeatureRow) -> f64 {
        let values = row.values();
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(values))
    }
}
