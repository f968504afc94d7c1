use super::rolling::{rolling, RollingWindow};

/// RiskMetrics weights over a finite window, oldest first, summing to 1.
///
/// The observation `i` periods back gets weight proportional to `(1 - lambda) * lambda^i`.
pub fn riskmetrics_weights(lambda: f64, window: usize) -> Vec<f64> {
    let mut w: Vec<f64> = (0..window)
        .map(|i| (1.0 - lambda) * lambda.powi(i as i32))
        .collect();
    let total: f64 = w.iter().sum();
    w.reverse();
    if total > 0.0 {
        for x in &mut w {
            *x /= total;
        }
    }
    w
}

/// Finite-window EWMA volatility of `returns`, scaled by `sqrt(annualization)`.
///
/// A missing return (the first one of a series) counts as a zero squared return.
pub fn ewma_volatility(
    returns: &[Option<f64>],
    lambda: f64,
    window: usize,
    annualization: f64,
) -> Vec<Option<f64>> {
    let weights = riskmetrics_weights(lambda, window);
    let squared: Vec<Option<f64>> = returns
        .iter()
        .map(|r| Some(r.map_or(0.0, |x| x * x)))
        .collect();
    rolling(&squared, window, |w: &RollingWindow| w.dot(&weights))
        .into_iter()
        .map(|v| v.map(|var| (var.max(0.0) * annualization).sqrt()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_and_favor_recent() {
        let w = riskmetrics_weights(0.94, 60);
        assert_eq!(w.len(), 60);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w[59] > w[0]);
        assert!((w[58] / w[59] - 0.94).abs() < 1e-12);
    }

    #[test]
    fn constant_returns_recover_their_magnitude() {
        let r = vec![Some(0.01); 10];
        let out = ewma_volatility(&r, 0.9, 5, 1.0);
        assert_eq!(out[3], None);
        assert!((out[4].unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn leading_gap_counts_as_zero() {
        let r = vec![None, Some(0.02), Some(0.02)];
        let out = ewma_volatility(&r, 0.5, 3, 1.0);
        // weights oldest->newest: 1/7, 2/7, 4/7
        let expected = ((6.0 / 7.0) * 0.0004f64).sqrt();
        assert!((out[2].unwrap() - expected).abs() < 1e-12);
    }
}
