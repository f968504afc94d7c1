use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeConfig};
use super::{check_fit_shapes, Regressor};
use crate::error::{VolError, VolResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> VolResult<()> {
        if self.n_estimators == 0 {
            return Err(VolError::invalid_config("forest needs at least one tree"));
        }
        if self.max_depth == Some(0) {
            return Err(VolError::invalid_config("forest max_depth must be > 0"));
        }
        if self.max_features == Some(0) {
            return Err(VolError::invalid_config("forest max_features must be > 0"));
        }
        Ok(())
    }

    fn tree_config(&self, seed: u64) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            seed,
        }
    }
}

/// Bagged ensemble of regression trees. Tree `i` is seeded with `seed + i`, so a fit is
/// reproducible regardless of how rayon schedules the trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    cfg: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(cfg: ForestConfig) -> Self {
        Self {
            cfg,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()> {
        check_fit_shapes(x, y)?;
        self.cfg.validate()?;
        let n = x.nrows();
        let cfg = &self.cfg;

        let trees = (0..cfg.n_estimators)
            .into_par_iter()
            .map(|i| -> VolResult<RegressionTree> {
                let seed = cfg.seed.wrapping_add(i as u64);
                let rows: Vec<usize> = if cfg.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut tree = RegressionTree::new(cfg.tree_config(seed));
                tree.fit_rows(x, y, rows)?;
                Ok(tree)
            })
            .collect::<VolResult<Vec<_>>>()?;

        tracing::debug!(trees = trees.len(), rows = n, "Fitted random forest");
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(VolError::model("random forest has not been fitted"));
        }
        let mut total = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            total += &tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_step() -> (Array2<f64>, Array1<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let xs: Vec<f64> = (0..80).map(|i| i as f64 / 80.0).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|x| (if *x < 0.5 { 0.2 } else { 0.6 }) + rng.gen_range(-0.01..0.01))
            .collect();
        (
            Array2::from_shape_vec((80, 1), xs).unwrap(),
            Array1::from_vec(ys),
        )
    }

    fn small() -> ForestConfig {
        ForestConfig {
            n_estimators: 15,
            max_depth: Some(4),
            ..ForestConfig::default()
        }
    }

    #[test]
    fn averages_trees_to_fit_step() {
        let (x, y) = noisy_step();
        let mut f = RandomForest::new(small());
        f.fit(&x, &y).unwrap();
        assert_eq!(f.n_trees(), 15);
        let queries = Array2::from_shape_vec((2, 1), vec![0.1, 0.9]).unwrap();
        let p = f.predict(&queries).unwrap();
        assert!((p[0] - 0.2).abs() < 0.05);
        assert!((p[1] - 0.6).abs() < 0.05);
    }

    #[test]
    fn same_seed_gives_identical_predictions() {
        let (x, y) = noisy_step();
        let mut a = RandomForest::new(small());
        let mut b = RandomForest::new(small());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn rejects_empty_forest() {
        let (x, y) = noisy_step();
        let mut f = RandomForest::new(ForestConfig {
            n_estimators: 0,
            ..ForestConfig::default()
        });
        assert!(matches!(f.fit(&x, &y), Err(VolError::InvalidConfig(_))));
    }
}
