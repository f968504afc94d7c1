use serde::Serialize;

use super::black_scholes::BlackScholesEngine;
use crate::error::VolResult;
use crate::model::{OptionParameters, OptionQuote};

/// Quotes over a (volatility, spot) grid with the other inputs held fixed.
/// `quotes[i][j]` is priced at `vols[i]` and `spots[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceGrid {
    pub spots: Vec<f64>,
    pub vols: Vec<f64>,
    pub quotes: Vec<Vec<OptionQuote>>,
}

impl PriceGrid {
    pub fn call_prices(&self) -> Vec<Vec<f64>> {
        self.quotes
            .iter()
            .map(|row| row.iter().map(|q| q.call_price).collect())
            .collect()
    }

    pub fn put_prices(&self) -> Vec<Vec<f64>> {
        self.quotes
            .iter()
            .map(|row| row.iter().map(|q| q.put_price).collect())
            .collect()
    }
}

pub fn price_grid(base: &OptionParameters, spots: &[f64], vols: &[f64]) -> VolResult<PriceGrid> {
    let engine = BlackScholesEngine;
    let quotes = vols
        .iter()
        .map(|vol| {
            spots
                .iter()
                .map(|spot| engine.price(&base.with_spot(*spot).with_volatility(*vol)))
                .collect::<VolResult<Vec<_>>>()
        })
        .collect::<VolResult<Vec<_>>>()?;
    Ok(PriceGrid {
        spots: spots.to_vec(),
        vols: vols.to_vec(),
        quotes,
    })
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + step * i as f64).collect()
        }
    }
}
