//! End-to-end volatility forecast: features, cross-validated training, prediction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};
use crate::features::{Dataset, FeatureBuilder, FeatureConfig};
use crate::model::{OptionParameters, OptionQuote, PriceSeries};
use crate::predictor::{Predictor, SigmaBounds};
use crate::pricing::BlackScholesEngine;
use crate::regressor::Model;
use crate::trainer::{FoldReport, Trainer, TrainingConfig};

/// Rows of the training set kept in a [`Forecast`] for inspection.
pub const TAIL_ROWS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub horizon_days: usize,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub bounds: SigmaBounds,
    pub tail_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon_days: 21,
            features: FeatureConfig::default(),
            training: TrainingConfig::default(),
            bounds: SigmaBounds::default(),
            tail_rows: TAIL_ROWS,
        }
    }
}

/// One training row as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailRow {
    pub date: NaiveDate,
    pub features: Vec<f64>,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Date of the feature row the forecast was made from.
    pub as_of: NaiveDate,
    pub horizon_days: usize,
    /// Annualized volatility over the next `horizon_days`, clipped to bounds.
    pub sigma: f64,
    pub raw_sigma: f64,
    pub mae_cv: Option<f64>,
    pub model: String,
    pub training_rows: usize,
    pub feature_names: Vec<String>,
    pub folds: Vec<FoldReport>,
    pub tail: Vec<TailRow>,
}

/// Forecast together with the fitted model, for callers that keep predicting.
#[derive(Debug)]
pub struct ForecastRun {
    pub forecast: Forecast,
    pub model: Model,
}

pub fn forecast(prices: &PriceSeries, cfg: &PipelineConfig) -> VolResult<Forecast> {
    run(prices, cfg).map(|r| r.forecast)
}

pub fn run(prices: &PriceSeries, cfg: &PipelineConfig) -> VolResult<ForecastRun> {
    let builder = FeatureBuilder::new(cfg.features.clone())?;
    let predictor = Predictor::new(cfg.bounds)?;
    let trainer = Trainer::from_config(&cfg.training)?;

    let dataset = builder.build(prices, cfg.horizon_days)?;
    let report = trainer.train(&dataset, cfg.training.n_splits)?;

    // The newest rows have no label yet but still carry complete features.
    let table = builder.features(prices);
    let latest = table
        .latest()
        .ok_or_else(|| VolError::invalid_series("price series is empty"))?;
    let raw_sigma = predictor.predict_raw(&report.model, latest)?;
    let sigma = predictor.bounds().clip(raw_sigma);

    tracing::info!(
        as_of = %latest.date,
        horizon_days = cfg.horizon_days,
        sigma,
        raw_sigma,
        model = report.model.name(),
        "Forecast volatility"
    );

    let forecast = Forecast {
        as_of: latest.date,
        horizon_days: cfg.horizon_days,
        sigma,
        raw_sigma,
        mae_cv: report.mae_cv,
        model: report.model.name().to_string(),
        training_rows: dataset.len(),
        feature_names: dataset.feature_names().to_vec(),
        folds: report.folds,
        tail: tail_rows(&dataset, cfg.tail_rows),
    };
    Ok(ForecastRun {
        forecast,
        model: report.model,
    })
}

/// Quote an option with the forecast volatility in place of `base.volatility`.
pub fn price_with_forecast(forecast: &Forecast, base: &OptionParameters) -> VolResult<OptionQuote> {
    BlackScholesEngine.price(&base.with_volatility(forecast.sigma))
}

fn tail_rows(dataset: &Dataset, n: usize) -> Vec<TailRow> {
    let tail = dataset.tail(n);
    tail.dates()
        .iter()
        .zip(tail.features().rows())
        .zip(tail.target().iter())
        .map(|((date, row), target)| TailRow {
            date: *date,
            features: row.to_vec(),
            target: *target,
        })
        .collect()
}
