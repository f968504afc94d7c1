//! Feature engineering for forward volatility regression.
//!
//! A [`FeatureBuilder`] turns a [`PriceSeries`] into a [`FeatureTable`] of causal
//! predictors and, together with the forward label, a [`Dataset`] ready for training.
//! Nothing here mutates its inputs; every call returns fresh values.

pub mod columns;
pub mod dataset;
pub mod label;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};
use crate::indicator::{ewma_volatility, rsi};
use crate::model::PriceSeries;

pub use dataset::{Dataset, FeatureRow, FeatureTable};

pub const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EwmaConfig {
    pub enabled: bool,
    pub lambda: f64,
    pub window: usize,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lambda: 0.94,
            window: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub enabled: bool,
    pub period: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Windows for realized volatility and momentum columns.
    pub lookbacks: Vec<usize>,
    pub ewma: EwmaConfig,
    /// Windows for mean absolute return columns; empty disables them.
    pub abs_return_windows: Vec<usize>,
    pub rsi: RsiConfig,
    /// Periods per year used to annualize volatilities.
    pub annualization: f64,
    /// Minimum number of prices before any row is dropped.
    pub min_history_days: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lookbacks: vec![5, 10, 20, 60],
            ewma: EwmaConfig::default(),
            abs_return_windows: vec![5, 10, 20],
            rsi: RsiConfig::default(),
            annualization: TRADING_DAYS,
            min_history_days: 750,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> VolResult<()> {
        if self.lookbacks.is_empty() {
            return Err(VolError::invalid_config("at least one lookback is required"));
        }
        if let Some(w) = self.lookbacks.iter().find(|w| **w < 2) {
            return Err(VolError::invalid_config(format!(
                "lookback {} too short for a sample stdev (need >= 2)",
                w
            )));
        }
        if self.abs_return_windows.contains(&0) {
            return Err(VolError::invalid_config("abs return windows must be > 0"));
        }
        if self.ewma.enabled {
            if !(self.ewma.lambda > 0.0 && self.ewma.lambda < 1.0) {
                return Err(VolError::invalid_config(format!(
                    "ewma lambda must be in (0, 1), got {}",
                    self.ewma.lambda
                )));
            }
            if self.ewma.window == 0 {
                return Err(VolError::invalid_config("ewma window must be > 0"));
            }
        }
        if self.rsi.enabled && self.rsi.period == 0 {
            return Err(VolError::invalid_config("rsi period must be > 0"));
        }
        if !(self.annualization.is_finite() && self.annualization > 0.0) {
            return Err(VolError::invalid_config("annualization must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    cfg: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(mut cfg: FeatureConfig) -> VolResult<Self> {
        cfg.validate()?;
        cfg.lookbacks = sorted_unique(&cfg.lookbacks);
        cfg.abs_return_windows = sorted_unique(&cfg.abs_return_windows);
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// Column order of every [`FeatureRow`] and [`Dataset`] this builder produces.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cfg.lookbacks.iter().map(|w| format!("rv_{}", w)).collect();
        if self.cfg.ewma.enabled {
            names.push(format!("ewma_{}", self.cfg.ewma.window));
        }
        names.extend(
            self.cfg
                .abs_return_windows
                .iter()
                .map(|w| format!("mean_abs_ret_{}", w)),
        );
        names.extend(self.cfg.lookbacks.iter().map(|w| format!("mom_{}", w)));
        if self.cfg.rsi.enabled {
            names.push(format!("rsi_{}", self.cfg.rsi.period));
        }
        names
    }

    /// Index of the first row at which every feature column is defined.
    pub fn warmup(&self) -> usize {
        let mut w = self.cfg.lookbacks.iter().copied().max().unwrap_or(0);
        if self.cfg.ewma.enabled {
            w = w.max(self.cfg.ewma.window.saturating_sub(1));
        }
        if let Some(m) = self.cfg.abs_return_windows.iter().copied().max() {
            w = w.max(m);
        }
        if self.cfg.rsi.enabled {
            w = w.max(self.cfg.rsi.period);
        }
        w
    }

    /// Causal feature table for every date of `prices`.
    pub fn features(&self, prices: &PriceSeries) -> FeatureTable {
        let closes = prices.closes();
        let returns = prices.log_returns();
        let ann = self.cfg.annualization;

        let mut cols: Vec<Vec<Option<f64>>> = Vec::new();
        for w in &self.cfg.lookbacks {
            cols.push(columns::realized_vol(&returns, *w, ann));
        }
        if self.cfg.ewma.enabled {
            cols.push(ewma_volatility(
                &returns,
                self.cfg.ewma.lambda,
                self.cfg.ewma.window,
                ann,
            ));
        }
        for w in &self.cfg.abs_return_windows {
            cols.push(columns::mean_abs_return(&returns, *w, ann));
        }
        for w in &self.cfg.lookbacks {
            cols.push(columns::momentum(&closes, *w));
        }
        if self.cfg.rsi.enabled {
            cols.push(rsi(&closes, self.cfg.rsi.period));
        }

        let rows = prices
            .points()
            .iter()
            .enumerate()
            .map(|(t, p)| FeatureRow {
                date: p.date,
                values: cols.iter().map(|c| c[t]).collect(),
            })
            .collect();

        FeatureTable {
            feature_names: self.feature_names(),
            rows,
        }
    }

    /// Forward realized volatility label for every date of `prices`.
    pub fn labels(&self, prices: &PriceSeries, horizon_days: usize) -> VolResult<Vec<Option<f64>>> {
        validate_horizon(horizon_days)?;
        Ok(label::forward_realized_vol(
            &prices.log_returns(),
            horizon_days,
            self.cfg.annualization,
        ))
    }

    pub fn build(&self, prices: &PriceSeries, horizon_days: usize) -> VolResult<Dataset> {
        validate_horizon(horizon_days)?;
        if prices.len() < self.cfg.min_history_days {
            return Err(VolError::InsufficientHistory {
                required: self.cfg.min_history_days,
                available: prices.len(),
            });
        }

        let table = self.features(prices);
        let labels = self.labels(prices, horizon_days)?;
        let dataset = Dataset::from_rows(&table, &labels)?;
        if dataset.is_empty() {
            return Err(VolError::InsufficientHistory {
                required: self.warmup() + horizon_days + 1,
                available: prices.len(),
            });
        }

        tracing::debug!(
            prices = prices.len(),
            rows = dataset.len(),
            features = dataset.n_features(),
            horizon_days,
            "Built feature dataset"
        );
        Ok(dataset)
    }
}

/// Build a dataset with the default feature set restricted to `lookbacks`.
pub fn build(
    prices: &PriceSeries,
    horizon_days: usize,
    lookbacks: &BTreeSet<usize>,
) -> VolResult<Dataset> {
    let cfg = FeatureConfig {
        lookbacks: lookbacks.iter().copied().collect(),
        ..FeatureConfig::default()
    };
    FeatureBuilder::new(cfg)?.build(prices, horizon_days)
}

fn validate_horizon(horizon_days: usize) -> VolResult<()> {
    if horizon_days < 2 {
        return Err(VolError::invalid_config(format!(
            "horizon_days must be >= 2 for a sample stdev, got {}",
            horizon_days
        )));
    }
    Ok(())
}

fn sorted_unique(values: &[usize]) -> Vec<usize> {
    values
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        PriceSeries::from_pairs(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| (start + Duration::days(i as i64), *c)),
        )
        .unwrap()
    }

    fn small_cfg() -> FeatureConfig {
        FeatureConfig {
            lookbacks: vec![3, 2, 3],
            ewma: EwmaConfig {
                enabled: true,
                lambda: 0.9,
                window: 4,
            },
            abs_return_windows: vec![2],
            rsi: RsiConfig {
                enabled: true,
                period: 3,
            },
            annualization: TRADING_DAYS,
            min_history_days: 0,
        }
    }

    #[test]
    fn feature_names_follow_sorted_unique_lookbacks() {
        let b = FeatureBuilder::new(small_cfg()).unwrap();
        assert_eq!(
            b.feature_names(),
            vec!["rv_2", "rv_3", "ewma_4", "mean_abs_ret_2", "mom_2", "mom_3", "rsi_3"]
        );
        assert_eq!(b.warmup(), 3);
    }

    #[test]
    fn dataset_row_count_is_len_minus_warmup_minus_horizon() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let b = FeatureBuilder::new(small_cfg()).unwrap();
        let ds = b.build(&series(&closes), 2).unwrap();
        assert_eq!(ds.len(), 20 - 3 - 2);
        assert_eq!(ds.n_features(), 7);
    }

    #[test]
    fn flat_prices_give_zero_volatility_features_and_labels() {
        let b = FeatureBuilder::new(small_cfg()).unwrap();
        let ds = b.build(&series(&[50.0; 12]), 3).unwrap();
        for v in ds.target().iter() {
            assert_eq!(*v, 0.0);
        }
        assert_eq!(ds.features()[[0, 0]], 0.0);
    }

    #[test]
    fn flat_run_after_moving_prices_zeroes_the_features() {
        let mut closes: Vec<f64> = (0..30)
            .map(|i| 100.0 * (1.0 + 0.03 * ((i * 5 % 7) as f64 - 3.0) / 3.0))
            .collect();
        closes.extend([97.3; 15]);
        let table = FeatureBuilder::new(small_cfg())
            .unwrap()
            .features(&series(&closes));
        let last = |name: &str| table.column(name).unwrap().last().copied().flatten().unwrap();

        assert_eq!(last("mean_abs_ret_2"), 0.0);
        assert_eq!(last("rv_2"), 0.0);
        assert_eq!(last("rv_3"), 0.0);
        let rsi = last("rsi_3");
        assert!((0.0..=100.0).contains(&rsi));
        for v in table.column("mean_abs_ret_2").unwrap().into_iter().flatten() {
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn short_series_fails_with_required_counts() {
        let cfg = FeatureConfig {
            min_history_days: 30,
            ..small_cfg()
        };
        let b = FeatureBuilder::new(cfg).unwrap();
        let err = b.build(&series(&[100.0; 10]), 2).unwrap_err();
        assert_eq!(
            err,
            VolError::InsufficientHistory {
                required: 30,
                available: 10
            }
        );
    }

    #[test]
    fn no_surviving_rows_reports_warmup_requirement() {
        let b = FeatureBuilder::new(small_cfg()).unwrap();
        let err = b.build(&series(&[100.0, 101.0, 102.0, 101.0, 100.0]), 2).unwrap_err();
        assert_eq!(
            err,
            VolError::InsufficientHistory {
                required: 6,
                available: 5
            }
        );
    }

    #[test]
    fn rejects_degenerate_windows_and_horizon() {
        let cfg = FeatureConfig {
            lookbacks: vec![1],
            ..small_cfg()
        };
        assert!(matches!(
            FeatureBuilder::new(cfg),
            Err(VolError::InvalidConfig(_))
        ));
        let b = FeatureBuilder::new(small_cfg()).unwrap();
        assert!(matches!(
            b.build(&series(&[100.0; 20]), 1),
            Err(VolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn free_build_uses_default_minimum_history() {
        let lookbacks: BTreeSet<usize> = [5, 10].into_iter().collect();
        let err = build(&series(&[100.0; 100]), 5, &lookbacks).unwrap_err();
        assert!(matches!(
            err,
            VolError::InsufficientHistory { required: 750, .. }
        ));
    }
}
