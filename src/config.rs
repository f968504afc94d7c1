use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::features::{FeatureBuilder, FeatureConfig};
use crate::model::OptionParameters;
use crate::pipeline::{PipelineConfig, TAIL_ROWS};
use crate::predictor::SigmaBounds;
use crate::trainer::{Trainer, TrainingConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_ENV_VAR: &str = "SIGMA_QUANT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub prediction: PredictionConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub horizon_days: usize,
    pub min_sigma: f64,
    pub max_sigma: f64,
    pub tail_rows: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        let bounds = SigmaBounds::default();
        Self {
            horizon_days: 21,
            min_sigma: bounds.min,
            max_sigma: bounds.max,
            tail_rows: TAIL_ROWS,
        }
    }
}

impl PredictionConfig {
    pub fn bounds(&self) -> SigmaBounds {
        SigmaBounds {
            min: self.min_sigma,
            max: self.max_sigma,
        }
    }
}

/// Option inputs used when the command line leaves them out, plus the heatmap ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub spot: f64,
    pub strike: f64,
    pub time_to_maturity: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub spot_min: f64,
    pub spot_max: f64,
    pub vol_min: f64,
    pub vol_max: f64,
    pub grid_points: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            time_to_maturity: 1.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
            spot_min: 80.0,
            spot_max: 120.0,
            vol_min: 0.1,
            vol_max: 0.5,
            grid_points: 10,
        }
    }
}

impl PricingConfig {
    pub fn base_parameters(&self) -> Result<OptionParameters> {
        Ok(OptionParameters::new(
            self.time_to_maturity,
            self.strike,
            self.spot,
            self.volatility,
            self.risk_free_rate,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `path`, else `$SIGMA_QUANT_CONFIG`, else `config/default.toml`.
    ///
    /// A missing default file yields the built-in defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let explicit: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
        let config_path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if explicit.is_none() && !config_path.exists() {
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config = Self::from_toml(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        FeatureBuilder::new(self.features.clone()).context("features section is invalid")?;
        Trainer::from_config(&self.training).context("training section is invalid")?;
        if self.training.n_splits < 2 {
            bail!(
                "training.n_splits must be >= 2, got {}",
                self.training.n_splits
            );
        }
        if self.training.min_fold_rows == 0 {
            bail!("training.min_fold_rows must be >= 1");
        }
        if self.prediction.horizon_days < 2 {
            bail!(
                "prediction.horizon_days must be >= 2, got {}",
                self.prediction.horizon_days
            );
        }
        self.prediction
            .bounds()
            .validate()
            .context("prediction sigma bounds are invalid")?;
        self.pricing
            .base_parameters()
            .context("pricing defaults are invalid")?;
        let p = &self.pricing;
        if !(0.0 < p.spot_min && p.spot_min < p.spot_max) {
            bail!(
                "pricing spot range must satisfy 0 < spot_min < spot_max, got [{}, {}]",
                p.spot_min,
                p.spot_max
            );
        }
        if !(0.0 < p.vol_min && p.vol_min < p.vol_max) {
            bail!(
                "pricing vol range must satisfy 0 < vol_min < vol_max, got [{}, {}]",
                p.vol_min,
                p.vol_max
            );
        }
        if p.grid_points < 2 {
            bail!("pricing.grid_points must be >= 2, got {}", p.grid_points);
        }
        Ok(())
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            horizon_days: self.prediction.horizon_days,
            features: self.features.clone(),
            training: self.training.clone(),
            bounds: self.prediction.bounds(),
            tail_rows: self.prediction.tail_rows,
        }
    }
}
