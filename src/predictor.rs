use serde::{Deserialize, Serialize};

use crate::error::{VolError, VolResult};
use crate::features::FeatureRow;
use crate::regressor::Model;

pub const MIN_SIGMA: f64 = 0.01;
pub const MAX_SIGMA: f64 = 3.0;

/// Plausible range for an annualized volatility forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for SigmaBounds {
    fn default() -> Self {
        Self {
            min: MIN_SIGMA,
            max: MAX_SIGMA,
        }
    }
}

impl SigmaBounds {
    pub fn validate(&self) -> VolResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && 0.0 < self.min && self.min < self.max)
        {
            return Err(VolError::invalid_config(format!(
                "sigma bounds must satisfy 0 < min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn clip(&self, sigma: f64) -> f64 {
        sigma.clamp(self.min, self.max)
    }
}

/// Applies a fitted model to the latest feature row.
#[derive(Debug, Clone, Copy, Default)]
pub struct Predictor {
    bounds: SigmaBounds,
}

impl Predictor {
    pub fn new(bounds: SigmaBounds) -> VolResult<Self> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> SigmaBounds {
        self.bounds
    }

    /// Unclipped model output for `row`.
    pub fn predict_raw(&self, model: &Model, row: &FeatureRow) -> VolResult<f64> {
        let names = model.feature_names();
        if row.values.len() != names.len() {
            return Err(VolError::model(format!(
                "row has {} values but model expects {} features",
                row.values.len(),
                names.len()
            )));
        }
        let missing: Vec<String> = names
            .iter()
            .zip(&row.values)
            .filter(|(_, v)| !v.is_some_and(f64::is_finite))
            .map(|(n, _)| n.clone())
            .collect();
        if !missing.is_empty() {
            return Err(VolError::IncompleteFeatures { missing });
        }

        let values: Vec<f64> = row.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        let raw = model.predict_one(&values)?;
        if raw.is_nan() {
            return Err(VolError::model("model produced NaN"));
        }
        Ok(raw)
    }

    /// Forecast clipped into the configured bounds. Clipping is not an error.
    pub fn predict(&self, model: &Model, row: &FeatureRow) -> VolResult<f64> {
        let raw = self.predict_raw(model, row)?;
        let sigma = self.bounds.clip(raw);
        if sigma != raw {
            tracing::debug!(date = %row.date, raw, sigma, "Clipped volatility forecast");
        }
        Ok(sigma)
    }
}
