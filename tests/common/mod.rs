#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sigma_quant::PriceSeries;

/// Daily closes whose volatility switches between calm and stressed regimes every
/// 60 days. Deterministic for a given seed.
pub fn regime_prices(n: usize, seed: u64) -> PriceSeries {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    let mut price = 100.0;
    let pairs: Vec<(NaiveDate, f64)> = (0..n)
        .map(|i| {
            if i > 0 {
                let daily_vol = if (i / 60) % 2 == 0 { 0.008 } else { 0.025 };
                price *= (daily_vol * gaussian(&mut rng)).exp();
            }
            (start + Duration::days(i as i64), price)
        })
        .collect();
    PriceSeries::from_pairs(pairs).unwrap()
}

/// Box-Muller standard normal draw.
pub fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Same dates as `prices`, with every close from `index` on multiplied by `factor`.
pub fn with_jump(prices: &PriceSeries, index: usize, factor: f64) -> PriceSeries {
    let pairs: Vec<(NaiveDate, f64)> = prices
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| (p.date, if i >= index { p.close * factor } else { p.close }))
        .collect();
    PriceSeries::from_pairs(pairs).unwrap()
}
