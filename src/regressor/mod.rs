//! Pluggable regression models.
//!
//! Anything implementing [`Regressor`] can be trained and used for prediction; the
//! trainer asks a [`ModelSpec`] for a fresh unfitted instance per fold.

pub mod forest;
pub mod ridge;
pub mod scaler;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};

pub use forest::{ForestConfig, RandomForest};
pub use ridge::{RidgeConfig, RidgeRegression};
pub use scaler::{Scaled, StandardScaler};
pub use tree::{RegressionTree, TreeConfig};

pub trait Regressor: fmt::Debug + Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()>;

    fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Ridge,
    RandomForest,
}

impl FromStr for ModelKind {
    type Err = VolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.starts_with("ridge") {
            return Ok(Self::Ridge);
        }
        match s.as_str() {
            "forest" | "rf" | "random_forest" | "random-forest" => Ok(Self::RandomForest),
            _ => Err(VolError::invalid_config(format!(
                "unknown model '{}', expected ridge or forest",
                s
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ridge => write!(f, "ridge"),
            Self::RandomForest => write!(f, "random_forest"),
        }
    }
}

/// Recipe for unfitted regressors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub ridge: RidgeConfig,
    pub forest: ForestConfig,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            kind: ModelKind::Ridge,
            ridge: RidgeConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

impl ModelSpec {
    pub fn ridge(alpha: f64) -> Self {
        Self {
            kind: ModelKind::Ridge,
            ridge: RidgeConfig {
                alpha,
                ..RidgeConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn random_forest(forest: ForestConfig) -> Self {
        Self {
            kind: ModelKind::RandomForest,
            forest,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> VolResult<()> {
        match self.kind {
            ModelKind::Ridge => self.ridge.validate(),
            ModelKind::RandomForest => self.forest.validate(),
        }
    }

    /// A fresh, unfitted regressor. Standardization is part of the returned unit so a
    /// refit always refits the scaler on the same rows.
    pub fn build(&self) -> Box<dyn Regressor> {
        match self.kind {
            ModelKind::Ridge if self.ridge.standardize => {
                Box::new(Scaled::new(RidgeRegression::new(self.ridge.clone())))
            }
            ModelKind::Ridge => Box::new(RidgeRegression::new(self.ridge.clone())),
            ModelKind::RandomForest => Box::new(RandomForest::new(self.forest.clone())),
        }
    }
}

/// A fitted regressor bound to the feature ordering it was trained on.
#[derive(Debug)]
pub struct Model {
    feature_names: Vec<String>,
    regressor: Box<dyn Regressor>,
}

impl Model {
    /// Wrap an already fitted regressor.
    pub fn from_fitted(feature_names: Vec<String>, regressor: Box<dyn Regressor>) -> Self {
        Self {
            feature_names,
            regressor,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn name(&self) -> &'static str {
        self.regressor.name()
    }

    pub fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>> {
        if x.ncols() != self.feature_names.len() {
            return Err(VolError::model(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                x.ncols()
            )));
        }
        self.regressor.predict(x)
    }

    pub fn predict_one(&self, values: &[f64]) -> VolResult<f64> {
        let x = Array2::from_shape_vec((1, values.len()), values.to_vec())
            .map_err(|e| VolError::model(e.to_string()))?;
        self.predict(&x)?
            .get(0)
            .copied()
            .ok_or_else(|| VolError::model("empty prediction"))
    }
}

pub(crate) fn check_fit_shapes(x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()> {
    if x.nrows() == 0 {
        return Err(VolError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    if x.nrows() != y.len() {
        return Err(VolError::model(format!(
            "{} feature rows but {} targets",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

pub(crate) fn mean_absolute_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}
