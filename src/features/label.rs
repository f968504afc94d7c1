//! Forward-looking target construction.
//!
//! This is the only place in the crate that reads returns after the row date.
//! Feature columns live in `columns` and never look past `t`.

use crate::indicator::{rolling, RollingWindow};

/// Annualized sample stdev of the returns at positions `t+1..=t+horizon`, stored at row `t`.
///
/// Computed by rolling a `horizon`-long window (which ends at `t+horizon`) and shifting it
/// back by `horizon` rows. The last `horizon` rows have no label.
pub fn forward_realized_vol(
    returns: &[Option<f64>],
    horizon: usize,
    annualization: f64,
) -> Vec<Option<f64>> {
    let trailing = rolling(returns, horizon, RollingWindow::std);
    let scale = annualization.sqrt();
    (0..returns.len())
        .map(|t| {
            trailing
                .get(t + horizon)
                .copied()
                .flatten()
                .map(|s| s * scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_std(xs: &[f64]) -> f64 {
        let m = xs.iter().sum::<f64>() / xs.len() as f64;
        (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64).sqrt()
    }

    #[test]
    fn label_uses_next_horizon_returns() {
        let r = vec![None, Some(0.01), Some(-0.02), Some(0.03), Some(0.00), Some(0.01)];
        let y = forward_realized_vol(&r, 2, 1.0);
        assert_eq!(y.len(), r.len());
        // row 1 -> returns at 2 and 3
        assert!((y[1].unwrap() - sample_std(&[-0.02, 0.03])).abs() < 1e-12);
        // row 0 -> returns at 1 and 2; the missing r[0] is never read
        assert!((y[0].unwrap() - sample_std(&[0.01, -0.02])).abs() < 1e-12);
        assert_eq!(y[4], None);
        assert_eq!(y[5], None);
    }

    #[test]
    fn annualization_scales_by_sqrt() {
        let r = vec![None, Some(0.01), Some(-0.01), Some(0.02)];
        let raw = forward_realized_vol(&r, 2, 1.0);
        let ann = forward_realized_vol(&r, 2, 252.0);
        assert!((ann[0].unwrap() - raw[0].unwrap() * 252f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn flat_future_gives_zero_label() {
        let r = vec![None, Some(0.0), Some(0.0), Some(0.0)];
        let y = forward_realized_vol(&r, 3, 252.0);
        assert_eq!(y[0], Some(0.0));
    }
}
