/// Fixed-length trailing window backed by a ring buffer.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "rolling window period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.count >= self.period {
            self.sum -= self.buffer[self.head];
        }
        self.buffer[self.head] = value;
        self.sum += value;
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
    }

    /// Drop everything seen so far; the window has to refill before it is ready.
    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
        self.sum = 0.0;
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Values from oldest to newest.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.count >= self.period { self.head } else { 0 };
        (0..self.count).map(move |i| self.buffer[(start + i) % self.period])
    }

    /// Running-sum mean. A window of identical values returns that value exactly, so
    /// a flat stretch after moving inputs carries no leftover rounding from the sum.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        let first = self.buffer[0];
        if self.buffer.iter().all(|v| *v == first) {
            return Some(first);
        }
        Some(self.sum / self.period as f64)
    }

    /// Sample standard deviation (n - 1 denominator). Identical values give exactly 0.
    pub fn std(&self) -> Option<f64> {
        if !self.is_ready() || self.period < 2 {
            return None;
        }
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        let mut total = 0.0;
        for v in self.values() {
            lo = lo.min(v);
            hi = hi.max(v);
            total += v;
        }
        if hi - lo == 0.0 {
            return Some(0.0);
        }
        let mean = total / self.period as f64;
        let ss: f64 = self.values().map(|v| (v - mean) * (v - mean)).sum();
        Some((ss / (self.period - 1) as f64).sqrt())
    }

    /// Weighted sum with `weights` ordered oldest to newest.
    pub fn dot(&self, weights: &[f64]) -> Option<f64> {
        if !self.is_ready() || weights.len() != self.period {
            return None;
        }
        Some(self.values().zip(weights).map(|(v, w)| v * w).sum())
    }
}

/// Apply `stat` to a trailing window over `values`. A gap (`None`) empties the window,
/// so an output is only produced once `period` consecutive inputs are present.
pub fn rolling<F>(values: &[Option<f64>], period: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&RollingWindow) -> Option<f64>,
{
    let mut window = RollingWindow::new(period);
    values
        .iter()
        .map(|v| match v {
            Some(x) => {
                window.push(*x);
                stat(&window)
            }
            None => {
                window.reset();
                None
            }
        })
        .collect()
}
