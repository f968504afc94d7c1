use ndarray::{Array1, Array2, Axis};

use super::{check_fit_shapes, Regressor};
use crate::error::{VolError, VolResult};

/// Column-wise z-scoring with population standard deviation.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> VolResult<()> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| VolError::model("cannot scale an empty matrix"))?;
        // Constant columns keep unit scale.
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < 1e-12 { 1.0 } else { s });
        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> VolResult<Array2<f64>> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Err(VolError::model("scaler has not been fitted"));
        };
        if x.ncols() != mean.len() {
            return Err(VolError::model(format!(
                "scaler fitted on {} features, got {}",
                mean.len(),
                x.ncols()
            )));
        }
        Ok((x - mean) / scale)
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }
}

/// A scaler and a regressor fitted together as one unit.
#[derive(Debug, Clone)]
pub struct Scaled<R> {
    scaler: StandardScaler,
    inner: R,
}

impl<R: Regressor> Scaled<R> {
    pub fn new(inner: R) -> Self {
        Self {
            scaler: StandardScaler::new(),
            inner,
        }
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Regressor> Regressor for Scaled<R> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()> {
        check_fit_shapes(x, y)?;
        self.scaler.fit(x)?;
        let xs = self.scaler.transform(x)?;
        self.inner.fit(&xs, y)
    }

    fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>> {
        let xs = self.scaler.transform(x)?;
        self.inner.predict(&xs)
    }

    fn name(&self) -> &'static str {
        match self.inner.name() {
            "ridge" => "scaled_ridge",
            "random_forest" => "scaled_random_forest",
            "regression_tree" => "scaled_regression_tree",
            _ => "scaled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressor::{RidgeConfig, RidgeRegression};

    #[test]
    fn transform_centers_and_scales() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 10.0, 2.0, 10.0, 3.0, 10.0]).unwrap();
        let mut s = StandardScaler::new();
        s.fit(&x).unwrap();
        let t = s.transform(&x).unwrap();
        let std = (2.0f64 / 3.0).sqrt();
        assert!((t[[0, 0]] + 1.0 / std).abs() < 1e-12);
        assert!(t[[1, 0]].abs() < 1e-12);
        // constant column is centered, not divided by zero
        assert_eq!(t[[2, 1]], 0.0);
    }

    #[test]
    fn refit_replaces_scaling_statistics() {
        let mut m = Scaled::new(RidgeRegression::new(RidgeConfig::default()));
        let a = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let b = Array2::from_shape_vec((3, 1), vec![100.0, 200.0, 300.0]).unwrap();
        let y = Array1::from_vec(vec![0.1, 0.2, 0.3]);
        m.fit(&a, &y).unwrap();
        assert!((m.scaler().mean().unwrap()[0] - 2.0).abs() < 1e-12);
        m.fit(&b, &y).unwrap();
        assert!((m.scaler().mean().unwrap()[0] - 200.0).abs() < 1e-12);
    }

    #[test]
    fn transform_before_fit_fails() {
        let s = StandardScaler::new();
        assert!(s.transform(&Array2::zeros((1, 1))).is_err());
    }
}
