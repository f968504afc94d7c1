use super::rolling::{rolling, RollingWindow};

const RSI_EPSILON: f64 = 1e-12;

/// Relative strength index over trailing `period` price changes.
///
/// `RS = mean(gains) / (mean(losses) + 1e-12)`, `RSI = 100 - 100 / (1 + RS)`.
/// The first `period` rows are `None` since the first change needs a prior close.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
            continue;
        }
        let delta = closes[i] - closes[i - 1];
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let avg_gain = rolling(&gains, period, RollingWindow::mean);
    let avg_loss = rolling(&losses, period, RollingWindow::mean);
    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| {
            let rs = g? / (l? + RSI_EPSILON);
            Some(100.0 - 100.0 / (1.0 + rs))
        })
        .collect()
}
