//! Isolation Forest
//!
//! Ensemble of random partitioning trees. A point that is separated from
//! the rest after few splits is more anomalous. All randomness comes from
//! one `StdRng` seeded by the caller, so a fit is fully reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ForestParams;
use crate::error::{AnalysisError, Result};
use crate::logic::features::FeatureMatrix;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// One isolation tree; nodes[0] is the root, children always follow parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow<M: FeatureMatrix>(data: &M, sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow_node(data, sample, 0, max_depth, rng);
        tree
    }

    fn grow_node<M: FeatureMatrix>(
        &mut self,
        data: &M,
        indices: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: indices.len() });

        if depth >= max_depth || indices.len() <= 1 {
            return id;
        }

        // Features that still vary inside this node, with their range
        let mut candidates = data.varying_features(&indices);
        // gen_range panics on an overflowing span
        candidates.retain(|&(_, min, max)| (max - min).is_finite());

        if candidates.is_empty() {
            return id;
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(min..max);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.value(i, feature) <= threshold);

        let left = self.grow_node(data, left, depth + 1, max_depth, rng);
        let right = self.grow_node(data, right, depth + 1, max_depth, rng);

        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Depth at which `row` lands, plus the expected remaining depth of its leaf
    pub fn path_length<M: FeatureMatrix>(&self, data: &M, row: usize) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;

        while let Some(node) = self.nodes.get(id) {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if data.value(row, *feature) <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }

        depth
    }

    fn is_well_formed(&self, n_features: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(id, node)| match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    *feature < n_features
                        && threshold.is_finite()
                        && *left > id
                        && *right > id
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
                Node::Leaf { .. } => true,
            })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    n_features: usize,
}

impl IsolationForest {
    /// Fit on an (n_records, n_features) matrix
    pub fn fit<M: FeatureMatrix>(data: &M, params: &ForestParams) -> Result<Self> {
        let (n, n_features) = (data.nrows(), data.ncols());
        if n == 0 {
            return Err(AnalysisError::Model("cannot fit on zero records".to_string()));
        }
        if params.n_estimators == 0 {
            return Err(AnalysisError::Config("n_estimators must be at least 1".to_string()));
        }

        let sample_size = params.sample_size(n);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let sample = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
                IsolationTree::grow(data, sample, max_depth, &mut rng)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Isolation forest fitted: {} trees, {} samples/tree, depth <= {}, {} features",
            trees.len(),
            sample_size,
            max_depth,
            n_features
        );

        Ok(Self {
            trees,
            sample_size,
            n_features,
        })
    }

    /// Mean path length of `row` across all trees
    pub fn mean_path_length<M: FeatureMatrix>(&self, data: &M, row: usize) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(data, row)).sum();
        total / self.trees.len().max(1) as f64
    }

    /// Normality signal per row: `-(2^(-E[h(x)] / c(sample_size)))`
    ///
    /// Lies in [-1, 0); lower means more anomalous.
    pub fn score_samples<M: FeatureMatrix>(&self, data: &M) -> Result<Vec<f64>> {
        if data.ncols() != self.n_features {
            return Err(AnalysisError::Model(format!(
                "encoded width mismatch: model expects {} features, got {}",
                self.n_features,
                data.ncols()
            )));
        }

        let normalizer = match average_path_length(self.sample_size) {
            c if c > 0.0 => c,
            _ => 1.0,
        };

        Ok((0..data.nrows())
            .map(|row| -(2f64.powf(-self.mean_path_length(data, row) / normalizer)))
            .collect())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Structural integrity check for restored models
    pub fn is_well_formed(&self) -> bool {
        !self.trees.is_empty()
            && self.sample_size > 0
            && self.trees.iter().all(|t| t.is_well_formed(self.n_features))
    }
}
