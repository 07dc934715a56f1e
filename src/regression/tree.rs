use super::{check_training_set, Regressor};
use crate::error::{CropCastError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// CART regression tree minimising squared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    params: TreeParams,
    nodes: Vec<Node>,
}

impl DecisionTreeRegressor {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on the rows selected by `indices`, which may repeat (bootstrap).
    pub(crate) fn fit_indices(&mut self, x: &[Vec<f64>], y: &[f64], indices: &mut [usize]) {
        self.nodes.clear();
        self.build(x, y, indices, 0);
    }

    fn build(&mut self, x: &[Vec<f64>], y: &[f64], indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let (sum, sum_sq) = indices
            .iter()
            .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));
        let mean = sum / n as f64;
        let sse = sum_sq - sum * sum / n as f64;

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.params.min_samples_split.max(2) || sse <= 1e-12 {
            return node_id;
        }

        let Some(split) = self.best_split(x, y, indices) else {
            return node_id;
        };

        let mid = partition(indices, |i| x[i][split.feature] <= split.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = self.build(x, y, left_idx, depth + 1);
        let right = self.build(x, y, right_idx, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&self, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let (total_sum, total_sq) = indices
            .iter()
            .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..x[indices[0]].len() {
            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let i = sorted[pos];
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let here = x[i][feature];
                let next = x[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new(TreeParams::default())
    }
}

impl Regressor for DecisionTreeRegressor {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        check_training_set(x, y)?;
        let mut indices: Vec<usize> = (0..x.len()).collect();
        self.fit_indices(x, y, &mut indices);
        Ok(())
    }

    fn validate(&self, width: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CropCastError::ModelUnavailable(
                "decision tree has no nodes".into(),
            ));
        }
        // Children always follow their parent, so traversal terminates
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= width {
                    return Err(CropCastError::ModelUnavailable(format!(
                        "tree node {} splits on feature {} of {}",
                        id, feature, width
                    )));
                }
                for child in [*left, *right] {
                    if child <= id || child >= self.nodes.len() {
                        return Err(CropCastError::ModelUnavailable(format!(
                            "tree node {} has invalid child {}",
                            id, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                None => return f64::NAN,
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// In-place partition; returns the number of elements satisfying `pred`.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for pos in 0..indices.len() {
        if pred(indices[pos]) {
            indices.swap(mid, pos);
            mid += 1;
        }
    }
    mid
}
