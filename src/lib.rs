//! Forward volatility forecasting and Black-Scholes option pricing.
//!
//! Daily closes go through [`features::FeatureBuilder`] into a [`features::Dataset`],
//! [`trainer::Trainer`] cross-validates and fits a [`regressor::Model`], and
//! [`predictor::Predictor`] turns the newest feature row into an annualized sigma that
//! [`pricing::BlackScholesEngine`] can price with.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod indicator;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod pricing;
pub mod regressor;
pub mod trainer;
pub mod validation;

pub use error::{VolError, VolResult};
pub use features::{Dataset, FeatureBuilder, FeatureConfig, FeatureRow, FeatureTable};
pub use model::{OptionParameters, OptionQuote, PricePoint, PriceSeries};
pub use pipeline::{forecast, Forecast, PipelineConfig};
pub use predictor::{Predictor, SigmaBounds};
pub use pricing::{price_grid, BlackScholesEngine, PriceGrid};
pub use regressor::{Model, ModelKind, ModelSpec, Regressor};
pub use trainer::{Trainer, TrainingConfig, TrainingReport};
