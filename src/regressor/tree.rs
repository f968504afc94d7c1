use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{check_fit_shapes, Regressor};
use crate::error::{VolError, VolResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` uses all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
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

#[derive(Debug, Clone, Copy)]
struct SplitChoice {
    feature: usize,
    threshold: f64,
}

/// CART regression tree minimizing squared error. Nodes live in a flat arena with the
/// root at index 0.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    cfg: TreeConfig,
    nodes: Vec<Node>,
    n_features: usize,
}

impl RegressionTree {
    pub fn new(cfg: TreeConfig) -> Self {
        Self {
            cfg,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on the given row indices; repeated indices act as bootstrap weights.
    pub fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: Vec<usize>) -> VolResult<()> {
        check_fit_shapes(x, y)?;
        if rows.is_empty() {
            return Err(VolError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        self.nodes.clear();
        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.cfg.seed);
        self.grow(x, y, rows, 0, &mut rng);
        Ok(())
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let n = rows.len();
        let mean = rows.iter().map(|&r| y[r]).sum::<f64>() / n as f64;
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        let depth_ok = self.cfg.max_depth.map_or(true, |d| depth < d);
        let first = y[rows[0]];
        let pure = rows.iter().all(|&r| y[r] == first);
        if !depth_ok || pure || n < self.cfg.min_samples_split.max(2) {
            return idx;
        }

        let Some(split) = self.best_split(x, y, &rows, rng) else {
            return idx;
        };
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| x[[r, split.feature]] <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return idx;
        }

        let left = self.grow(x, y, left_rows, depth + 1, rng);
        let right = self.grow(x, y, right_rows, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    /// Best squared-error split, found by sweeping each candidate feature in sorted order.
    /// Maximizing `sum_l^2 / n_l + sum_r^2 / n_r` is the same as minimizing child SSE.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitChoice> {
        let n = rows.len();
        let mut features: Vec<usize> = (0..self.n_features).collect();
        let k = self
            .cfg
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features.max(1));
        if k < self.n_features {
            features.shuffle(rng);
            features.truncate(k);
        }

        let min_leaf = self.cfg.min_samples_leaf.max(1);
        let total: f64 = rows.iter().map(|&r| y[r]).sum();
        let mut best_score = total * total / n as f64 + 1e-12;
        let mut best = None;
        let mut order = rows.to_vec();

        for &f in &features {
            order.sort_by(|a, b| x[[*a, f]].total_cmp(&x[[*b, f]]));
            let mut left_sum = 0.0;
            for i in 0..n - 1 {
                left_sum += y[order[i]];
                let n_left = i + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let lo = x[[order[i], f]];
                let hi = x[[order[i + 1], f]];
                if lo >= hi {
                    continue;
                }
                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
                if score > best_score {
                    best_score = score;
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(SplitChoice {
                        feature: f,
                        threshold,
                    });
                }
            }
        }
        best
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()> {
        self.fit_rows(x, y, (0..x.nrows()).collect())
    }

    fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(VolError::model("regression tree has not been fitted"));
        }
        if x.ncols() != self.n_features {
            return Err(VolError::model(format!(
                "tree fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(s) => self.predict_one(s),
                None => self.predict_one(&row.to_vec()),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "regression_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| if *x < 10.0 { 0.1 } else { 0.5 }).collect();
        (
            Array2::from_shape_vec((20, 1), xs).unwrap(),
            Array1::from_vec(ys),
        )
    }

    #[test]
    fn learns_a_step_with_one_split() {
        let (x, y) = step_data();
        let mut t = RegressionTree::new(TreeConfig::default());
        t.fit(&x, &y).unwrap();
        assert_eq!(t.depth(), 1);
        assert_eq!(t.node_count(), 3);
        assert!((t.predict_one(&[3.0]) - 0.1).abs() < 1e-12);
        assert!((t.predict_one(&[9.6]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn depth_limit_is_respected() {
        let x = Array2::from_shape_vec((8, 1), (0..8).map(|i| i as f64).collect()).unwrap();
        let y = Array1::from_vec((0..8).map(|i| (i * i) as f64).collect());
        let mut t = RegressionTree::new(TreeConfig {
            max_depth: Some(2),
            ..TreeConfig::default()
        });
        t.fit(&x, &y).unwrap();
        assert!(t.depth() <= 2);
    }

    #[test]
    fn duplicate_feature_values_end_in_a_leaf() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        let y = Array1::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let mut t = RegressionTree::new(TreeConfig::default());
        t.fit(&x, &y).unwrap();
        assert_eq!(t.node_count(), 1);
        assert!((t.predict(&x).unwrap()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let (x, y) = step_data();
        let mut t = RegressionTree::new(TreeConfig {
            min_samples_leaf: 11,
            ..TreeConfig::default()
        });
        t.fit(&x, &y).unwrap();
        assert_eq!(t.node_count(), 1);
    }
}
