//! Strictly causal feature columns. Every value at row `t` reads rows `<= t` only.

use crate::indicator::{rolling, RollingWindow};

/// Annualized sample stdev of the trailing `window` returns.
pub fn realized_vol(returns: &[Option<f64>], window: usize, annualization: f64) -> Vec<Option<f64>> {
    let scale = annualization.sqrt();
    rolling(returns, window, RollingWindow::std)
        .into_iter()
        .map(|v| v.map(|s| s * scale))
        .collect()
}

/// Annualized mean absolute return over the trailing `window` returns.
pub fn mean_abs_return(
    returns: &[Option<f64>],
    window: usize,
    annualization: f64,
) -> Vec<Option<f64>> {
    let scale = annualization.sqrt();
    let abs: Vec<Option<f64>> = returns.iter().map(|r| r.map(f64::abs)).collect();
    rolling(&abs, window, RollingWindow::mean)
        .into_iter()
        .map(|v| v.map(|m| m * scale))
        .collect()
}

/// Percent change of the close over `window` periods: `p[t] / p[t-window] - 1`.
pub fn momentum(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|t| {
            t.checked_sub(window)
                .map(|back| closes[t] / closes[back] - 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_warms_up_for_window_rows() {
        let m = momentum(&[100.0, 110.0, 121.0], 2);
        assert_eq!(m[0], None);
        assert_eq!(m[1], None);
        assert!((m[2].unwrap() - 0.21).abs() < 1e-12);
    }

    #[test]
    fn realized_vol_needs_full_window_of_returns() {
        let r = vec![None, Some(0.01), Some(-0.01), Some(0.01)];
        let v = realized_vol(&r, 2, 252.0);
        assert_eq!(v[1], None);
        assert!(v[2].is_some());
        let expected = (0.0002f64).sqrt() * 252f64.sqrt();
        assert!((v[2].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn mean_abs_return_ignores_sign() {
        let r = vec![None, Some(0.02), Some(-0.04)];
        let v = mean_abs_return(&r, 2, 1.0);
        assert!((v[2].unwrap() - 0.03).abs() < 1e-12);
    }
}
