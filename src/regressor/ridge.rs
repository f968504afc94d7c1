use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_fit_shapes, Regressor};
use crate::error::{VolError, VolResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    /// L2 penalty on the coefficients (not on the intercept).
    pub alpha: f64,
    /// Wrap the regression in a standard scaler fitted on the same rows.
    pub standardize: bool,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            alpha: 10.0,
            standardize: true,
        }
    }
}

impl RidgeConfig {
    pub fn validate(&self) -> VolResult<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(VolError::invalid_config(format!(
                "ridge alpha must be > 0, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Ridge regression with an unpenalized intercept.
///
/// Solves `(Xc'Xc + alpha I) beta = Xc'yc` on centered data with a Cholesky factorization,
/// then recovers `intercept = mean(y) - mean(X) . beta`.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    cfg: RidgeConfig,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegression {
    pub fn new(cfg: RidgeConfig) -> Self {
        Self {
            cfg,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> VolResult<()> {
        check_fit_shapes(x, y)?;
        self.cfg.validate()?;

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| VolError::model("cannot center an empty matrix"))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let xc = x - &x_mean;
        let yc = y - y_mean;

        let mut gram = xc.t().dot(&xc);
        for i in 0..gram.nrows() {
            gram[[i, i]] += self.cfg.alpha;
        }
        let rhs = xc.t().dot(&yc);
        let beta = cholesky_solve(&gram, &rhs)?;

        self.intercept = y_mean - x_mean.dot(&beta);
        self.coefficients = Some(beta);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> VolResult<Array1<f64>> {
        let beta = self
            .coefficients
            .as_ref()
            .ok_or_else(|| VolError::model("ridge regression has not been fitted"))?;
        if x.ncols() != beta.len() {
            return Err(VolError::model(format!(
                "ridge fitted on {} features, got {}",
                beta.len(),
                x.ncols()
            )));
        }
        Ok(x.dot(beta) + self.intercept)
    }

    fn name(&self) -> &'static str {
        "ridge"
    }
}

fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> VolResult<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag.is_nan() || diag <= 0.0 {
                    return Err(VolError::model("ridge system is not positive definite"));
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L' x = z
    let mut out = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * out[j];
        }
        out[i] = (z[i] - sum) / l[[i, i]];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_line_with_small_penalty() {
        let x = Array2::from_shape_vec((5, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = x.column(0).mapv(|v| 2.0 * v + 1.0);
        let mut r = RidgeRegression::new(RidgeConfig {
            alpha: 1e-8,
            standardize: false,
        });
        r.fit(&x, &y).unwrap();
        assert!((r.coefficients().unwrap()[0] - 2.0).abs() < 1e-6);
        assert!((r.intercept() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn penalty_shrinks_slope_but_keeps_mean() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let mut r = RidgeRegression::new(RidgeConfig {
            alpha: 5.0,
            standardize: false,
        });
        r.fit(&x, &y).unwrap();
        // sum of squared centered x = 5, so beta = 5 / (5 + 5)
        assert!((r.coefficients().unwrap()[0] - 0.5).abs() < 1e-12);
        let at_mean = r
            .predict(&Array2::from_shape_vec((1, 1), vec![2.5]).unwrap())
            .unwrap();
        assert!((at_mean[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn constant_target_predicts_constant() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 2.0, 3.0, 7.0, 1.0]).unwrap();
        let y = Array1::from_elem(3, -0.5);
        let mut r = RidgeRegression::new(RidgeConfig::default());
        r.fit(&x, &y).unwrap();
        let p = r.predict(&x).unwrap();
        assert!(p.iter().all(|v| (v + 0.5).abs() < 1e-12));
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let r = RidgeRegression::new(RidgeConfig::default());
        assert!(r.predict(&Array2::zeros((1, 1))).is_err());
    }
}
